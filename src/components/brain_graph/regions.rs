use std::collections::HashMap;
use std::f64::consts::PI;

use super::error::LayoutError;
use super::geometry::{Point, Silhouette};
use super::types::NodeType;

/// Revolutions the seeding spiral makes across one type's population.
const SPIRAL_TURNS: f64 = 3.0;
/// Vertical compression of the spiral; the silhouette is wider than tall.
const SPIRAL_Y_SCALE: f64 = 0.7;

/// Where nodes of one type are seeded, in normalized silhouette space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
	pub center_x: f64,
	pub center_y: f64,
	pub spread: f64,
}

impl Region {
	pub const fn new(center_x: f64, center_y: f64, spread: f64) -> Self {
		Self {
			center_x,
			center_y,
			spread,
		}
	}

	pub fn center(&self) -> Point {
		Point::new(self.center_x, self.center_y)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegionTable {
	regions: HashMap<NodeType, Region>,
	fallback: Region,
}

impl RegionTable {
	/// Checks every region center against `silhouette` so seeding starts
	/// from inside the outline.
	pub fn new(
		regions: HashMap<NodeType, Region>,
		fallback: Region,
		silhouette: &Silhouette,
	) -> Result<Self, LayoutError> {
		for (node_type, region) in &regions {
			if !silhouette.contains(region.center()) {
				return Err(LayoutError::RegionOutside {
					node_type: node_type.to_string(),
				});
			}
		}
		if !silhouette.contains(fallback.center()) {
			return Err(LayoutError::RegionOutside {
				node_type: "fallback".into(),
			});
		}
		Ok(Self { regions, fallback })
	}

	/// Anatomical placement matching [`Silhouette::brain`]: projects in the
	/// middle, species frontal, investigators parietal, tags along the top,
	/// publications temporal, resources over the cerebellum.
	pub fn brain() -> Self {
		let regions = HashMap::from([
			(NodeType::Project, Region::new(0.50, 0.44, 0.16)),
			(NodeType::Species, Region::new(0.27, 0.46, 0.12)),
			(NodeType::Investigator, Region::new(0.72, 0.36, 0.12)),
			(NodeType::MetaTag, Region::new(0.50, 0.26, 0.20)),
			(NodeType::Publication, Region::new(0.36, 0.64, 0.10)),
			(NodeType::Resource, Region::new(0.70, 0.64, 0.07)),
		]);
		Self {
			regions,
			fallback: Region::new(0.50, 0.47, 0.10),
		}
	}

	pub fn region(&self, node_type: NodeType) -> &Region {
		self.regions.get(&node_type).unwrap_or(&self.fallback)
	}
}

impl Default for RegionTable {
	fn default() -> Self {
		Self::brain()
	}
}

/// Seeds node `index` of `total` nodes of `node_type` on a spiral around the
/// type's region, projected into the silhouette and scaled to pixels.
///
/// Pure: the same arguments always give the same point.
pub fn home_position(
	regions: &RegionTable,
	silhouette: &Silhouette,
	node_type: NodeType,
	index: usize,
	total: usize,
	width: f64,
	height: f64,
) -> (f64, f64) {
	let region = regions.region(node_type);
	let t = if total == 0 {
		0.0
	} else {
		index as f64 / total as f64
	};
	let angle = t * 2.0 * PI * SPIRAL_TURNS;
	let distance = t * region.spread;
	let candidate = Point::new(
		region.center_x + angle.cos() * distance,
		region.center_y + angle.sin() * SPIRAL_Y_SCALE * distance,
	);
	let p = silhouette.project(candidate);
	(p.x * width, p.y * height)
}
