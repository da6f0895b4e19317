use std::collections::{HashMap, HashSet};

use log::{debug, info};

use super::config::LayoutConfig;
use super::ego::{Depth, EgoNetworkResult, extract};
use super::geometry::Silhouette;
use super::layout::build_simulation;
use super::regions::RegionTable;
use super::simulation::{ForceSimulation, SimulationPhase};
use super::types::{KnowledgeGraph, NodeType};

/// Extra world-space slack around a node's radius for pointer hits.
pub const HIT_PADDING: f64 = 4.0;

#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	/// Set once the pointer has travelled far enough to count as a drag
	/// rather than a click.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

/// One graph view: the validated graph, the user's filter choices, the
/// current ego network and the single simulation laying it out.
///
/// Every change to focus, depth, hidden types or viewport size discards the
/// running simulation and seeds a new one. Only the pin of a node that is
/// being dragged survives the rebuild.
pub struct BrainGraphState {
	graph: KnowledgeGraph,
	config: LayoutConfig,
	regions: RegionTable,
	silhouette: Silhouette,
	focus: Option<String>,
	depth: Depth,
	hidden: HashSet<NodeType>,
	ego: EgoNetworkResult,
	sim: ForceSimulation,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
}

impl BrainGraphState {
	pub fn new(
		graph: KnowledgeGraph,
		config: LayoutConfig,
		regions: RegionTable,
		silhouette: Silhouette,
		width: f64,
		height: f64,
	) -> Self {
		let ego = extract(&graph, None, Depth::One, &HashSet::new(), &config.fan_out_caps);
		let sim = build_simulation(&graph, &ego, &config, &regions, &silhouette, width, height);
		info!(
			"graph view ready: {} nodes, {} links, {} visible",
			graph.len(),
			graph.links().len(),
			sim.len()
		);
		Self {
			graph,
			config,
			regions,
			silhouette,
			focus: None,
			depth: Depth::One,
			hidden: HashSet::new(),
			ego,
			sim,
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
		}
	}

	/// Brain silhouette, brain regions and default physics.
	pub fn with_defaults(graph: KnowledgeGraph, width: f64, height: f64) -> Self {
		Self::new(
			graph,
			LayoutConfig::default(),
			RegionTable::brain(),
			Silhouette::brain(),
			width,
			height,
		)
	}

	pub fn graph(&self) -> &KnowledgeGraph {
		&self.graph
	}

	pub fn ego(&self) -> &EgoNetworkResult {
		&self.ego
	}

	pub fn simulation(&self) -> &ForceSimulation {
		&self.sim
	}

	pub fn focus(&self) -> Option<&str> {
		self.focus.as_deref()
	}

	pub fn depth(&self) -> Depth {
		self.depth
	}

	pub fn hidden_types(&self) -> &HashSet<NodeType> {
		&self.hidden
	}

	pub fn silhouette(&self) -> &Silhouette {
		&self.silhouette
	}

	pub fn positions(&self) -> HashMap<String, (f64, f64)> {
		self.sim.positions()
	}

	pub fn set_focus(&mut self, focus: Option<&str>) {
		if self.focus.as_deref() == focus {
			return;
		}
		self.focus = focus.map(str::to_owned);
		self.relayout();
	}

	pub fn set_depth(&mut self, depth: Depth) {
		if self.depth == depth {
			return;
		}
		self.depth = depth;
		self.relayout();
	}

	pub fn toggle_hidden_type(&mut self, node_type: NodeType) {
		if !self.hidden.remove(&node_type) {
			self.hidden.insert(node_type);
		}
		self.relayout();
	}

	pub fn set_hidden_types(&mut self, hidden: HashSet<NodeType>) {
		if self.hidden == hidden {
			return;
		}
		self.hidden = hidden;
		self.relayout();
	}

	/// New viewport size. Home positions depend on it, so the layout is
	/// seeded again.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.width == width && self.height == height {
			return;
		}
		self.width = width;
		self.height = height;
		self.relayout();
	}

	pub fn begin_drag(&mut self, id: &str) -> bool {
		self.sim.begin_drag(id)
	}

	/// `x`/`y` are graph-space coordinates.
	pub fn update_drag(&mut self, id: &str, x: f64, y: f64) -> bool {
		self.sim.update_drag(id, x, y)
	}

	pub fn end_drag(&mut self, id: &str) -> bool {
		self.sim.end_drag(id)
	}

	/// Runs one iteration if the simulation is not idle.
	pub fn tick(&mut self) -> bool {
		self.sim.tick()
	}

	fn relayout(&mut self) {
		let pinned = match self.sim.phase() {
			SimulationPhase::Dragging { node } => {
				let node = &self.sim.nodes()[node];
				node.fx.zip(node.fy).map(|pin| (node.id.clone(), pin))
			}
			_ => None,
		};

		self.ego = extract(
			&self.graph,
			self.focus.as_deref(),
			self.depth,
			&self.hidden,
			&self.config.fan_out_caps,
		);
		self.sim = build_simulation(
			&self.graph,
			&self.ego,
			&self.config,
			&self.regions,
			&self.silhouette,
			self.width,
			self.height,
		);

		if let Some((id, (x, y))) = pinned {
			if self.sim.begin_drag(&id) {
				self.sim.update_drag(&id, x, y);
			} else {
				self.drag = DragState::default();
			}
		}
		debug!(
			"relayout: focus={:?} depth={} hidden={:?} visible={}",
			self.ego.focus_id,
			u8::from(self.depth),
			self.hidden,
			self.sim.len()
		);
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		for node in self.sim.nodes() {
			let (dx, dy) = (node.x - gx, node.y - gy);
			// Radius and padding are world-space, they scale with zoom.
			if (dx * dx + dy * dy).sqrt() < node.effective_radius + HIT_PADDING {
				found = Some(node.id.clone());
			}
		}
		found
	}

	/// Zooms by one wheel notch around the screen point `(sx, sy)`.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::brain_graph::types::{GraphData, GraphLink, GraphNode};

	fn graph() -> KnowledgeGraph {
		KnowledgeGraph::new(GraphData {
			nodes: vec![
				GraphNode::new("p1", "Project", NodeType::Project),
				GraphNode::new("s1", "Species", NodeType::Species),
				GraphNode::new("m1", "Tag", NodeType::MetaTag),
			],
			links: vec![
				GraphLink::new("p1", "s1", "studies"),
				GraphLink::new("p1", "m1", "tagged"),
			],
		})
		.unwrap()
	}

	#[test]
	fn starts_in_overview() {
		let state = BrainGraphState::with_defaults(graph(), 800.0, 600.0);
		assert!(state.ego().is_overview());
		assert_eq!(state.positions().len(), 2);
		assert_eq!(state.simulation().phase(), SimulationPhase::Running);
	}

	#[test]
	fn focus_and_filters_rebuild_the_layout() {
		let mut state = BrainGraphState::with_defaults(graph(), 800.0, 600.0);
		state.set_focus(Some("p1"));
		assert_eq!(state.ego().focus_id.as_deref(), Some("p1"));
		assert_eq!(state.positions().len(), 3);

		state.toggle_hidden_type(NodeType::MetaTag);
		assert!(!state.positions().contains_key("m1"));
		state.toggle_hidden_type(NodeType::MetaTag);
		assert!(state.positions().contains_key("m1"));

		state.set_focus(None);
		assert!(state.ego().is_overview());
	}

	#[test]
	fn relayout_restarts_cooled_simulation() {
		let mut state = BrainGraphState::with_defaults(graph(), 800.0, 600.0);
		while state.tick() {}
		assert_eq!(state.simulation().phase(), SimulationPhase::Idle);
		state.set_depth(Depth::Two);
		assert_eq!(state.simulation().phase(), SimulationPhase::Running);
		assert_eq!(state.simulation().iterations(), 0);
	}

	#[test]
	fn drag_survives_relayout() {
		let mut state = BrainGraphState::with_defaults(graph(), 800.0, 600.0);
		assert!(state.begin_drag("p1"));
		assert!(state.update_drag("p1", 5.0, 5.0));
		state.set_focus(Some("s1"));
		let p1 = state.simulation().node("p1").unwrap();
		assert_eq!((p1.fx, p1.fy), (Some(5.0), Some(5.0)));
		assert!(state.end_drag("p1"));
	}

	#[test]
	fn resize_rescales_home_positions() {
		let mut state = BrainGraphState::with_defaults(graph(), 800.0, 600.0);
		let before = state.simulation().node("p1").unwrap().home_x;
		state.resize(1600.0, 600.0);
		let after = state.simulation().node("p1").unwrap().home_x;
		assert!((after - 2.0 * before).abs() < 1e-9);
	}

	#[test]
	fn hit_testing_respects_zoom() {
		let mut state = BrainGraphState::with_defaults(graph(), 800.0, 600.0);
		let p1 = state.simulation().node("p1").unwrap();
		let (x, y) = (p1.x, p1.y);
		assert_eq!(state.node_at_position(x, y).as_deref(), Some("p1"));

		state.zoom_at(0.0, 0.0, -1.0);
		assert!(state.transform.k > 1.0);
		let k = state.transform.k;
		assert_eq!(state.node_at_position(x * k, y * k).as_deref(), Some("p1"));
		assert_eq!(state.node_at_position(-500.0, -500.0), None);
	}
}
