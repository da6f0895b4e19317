use thiserror::Error;

/// Construction-time failures. Runtime situations (unknown focus, empty
/// visible set, coincident nodes) are handled in place and never surface here.
#[derive(Debug, Error)]
pub enum LayoutError {
	#[error("node at position {index} has an empty id")]
	EmptyNodeId { index: usize },

	#[error("duplicate node id `{0}`")]
	DuplicateNodeId(String),

	#[error("node `{0}` has an empty label")]
	EmptyLabel(String),

	#[error("node `{id}` has invalid base radius {radius}")]
	InvalidRadius { id: String, radius: f64 },

	#[error("malformed graph data: {0}")]
	Malformed(#[from] serde_json::Error),

	#[error("silhouette needs at least 3 vertices, got {0}")]
	TooFewVertices(usize),

	#[error("silhouette vertex {0} is not finite")]
	NonFiniteVertex(usize),

	#[error("silhouette interior reference ({x}, {y}) lies outside the polygon")]
	InteriorOutside { x: f64, y: f64 },

	#[error("region for {node_type} is centered outside the silhouette")]
	RegionOutside { node_type: String },

	#[error("hop depth must be 1 or 2, got {0}")]
	InvalidDepth(u8),
}
