use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::LayoutError;

/// Kind of entity a node stands for. Fixed for the node's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
	Project,
	Species,
	Investigator,
	MetaTag,
	Publication,
	Resource,
}

impl NodeType {
	pub const ALL: [NodeType; 6] = [
		NodeType::Project,
		NodeType::Species,
		NodeType::Investigator,
		NodeType::MetaTag,
		NodeType::Publication,
		NodeType::Resource,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			NodeType::Project => "project",
			NodeType::Species => "species",
			NodeType::Investigator => "investigator",
			NodeType::MetaTag => "meta_tag",
			NodeType::Publication => "publication",
			NodeType::Resource => "resource",
		}
	}
}

impl fmt::Display for NodeType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	pub id: String,
	pub label: String,
	#[serde(rename = "type")]
	pub node_type: NodeType,
	#[serde(default = "default_radius", rename = "baseRadius", alias = "base_radius")]
	pub base_radius: f64,
	#[serde(default)]
	pub metadata: BTreeMap<String, String>,
}

fn default_radius() -> f64 {
	6.0
}

impl GraphNode {
	pub fn new(id: impl Into<String>, label: impl Into<String>, node_type: NodeType) -> Self {
		Self {
			id: id.into(),
			label: label.into(),
			node_type,
			base_radius: default_radius(),
			metadata: BTreeMap::new(),
		}
	}

	pub fn with_radius(mut self, radius: f64) -> Self {
		self.base_radius = radius;
		self
	}
}

/// Undirected for layout purposes; `source_id`/`target_id` order only
/// carries meaning for the data source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphLink {
	#[serde(rename = "sourceId", alias = "source_id", alias = "source")]
	pub source_id: String,
	#[serde(rename = "targetId", alias = "target_id", alias = "target")]
	pub target_id: String,
	#[serde(default)]
	pub kind: String,
	#[serde(default)]
	pub label: Option<String>,
}

impl GraphLink {
	pub fn new(
		source: impl Into<String>,
		target: impl Into<String>,
		kind: impl Into<String>,
	) -> Self {
		Self {
			source_id: source.into(),
			target_id: target.into(),
			kind: kind.into(),
			label: None,
		}
	}
}

/// Raw graph as handed over by the data source, before validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

/// A validated graph. Node order is the input order and is the stable
/// iteration order every traversal uses.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeGraph {
	nodes: Vec<GraphNode>,
	links: Vec<GraphLink>,
	index: HashMap<String, usize>,
}

impl KnowledgeGraph {
	/// Validates `data` and builds the id lookup. Links are not checked for
	/// referential integrity; dangling ones are ignored by the layout.
	pub fn new(data: GraphData) -> Result<Self, LayoutError> {
		let GraphData { nodes, links } = data;
		let mut index = HashMap::with_capacity(nodes.len());

		for (i, node) in nodes.iter().enumerate() {
			if node.id.is_empty() {
				return Err(LayoutError::EmptyNodeId { index: i });
			}
			if node.label.trim().is_empty() {
				return Err(LayoutError::EmptyLabel(node.id.clone()));
			}
			if !node.base_radius.is_finite() || node.base_radius <= 0.0 {
				return Err(LayoutError::InvalidRadius {
					id: node.id.clone(),
					radius: node.base_radius,
				});
			}
			if index.insert(node.id.clone(), i).is_some() {
				return Err(LayoutError::DuplicateNodeId(node.id.clone()));
			}
		}

		Ok(Self {
			nodes,
			links,
			index,
		})
	}

	pub fn from_json(json: &str) -> Result<Self, LayoutError> {
		let data: GraphData = serde_json::from_str(json)?;
		Self::new(data)
	}

	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[GraphLink] {
		&self.links
	}

	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.index_of(id).map(|i| &self.nodes[i])
	}

	/// Endpoint indices of `link`, or `None` when either end is unknown.
	pub fn link_endpoints(&self, link: &GraphLink) -> Option<(usize, usize)> {
		Some((self.index_of(&link.source_id)?, self.index_of(&link.target_id)?))
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
