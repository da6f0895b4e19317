//! Constrained force simulation.
//!
//! Each iteration is atomic: forces for every node are accumulated from one
//! snapshot of positions, then all nodes are integrated, then every unpinned
//! node is projected back into the silhouette.
//!
//! # Usage
//! ```ignore
//! let mut sim = ForceSimulation::new(nodes, links, config, silhouette, 800.0, 600.0);
//! sim.start();
//!
//! // Each frame:
//! sim.tick();
//! for node in sim.nodes() {
//!     draw_circle(node.x, node.y, node.effective_radius);
//! }
//! ```

use std::collections::HashMap;

use log::{debug, trace};
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::config::ForceConfig;
use super::geometry::Silhouette;
use super::types::NodeType;

const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;
const JIGGLE: f64 = 1e-6;

/// Engine-owned state for one visible node.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	/// Index of the node in the source graph.
	pub index: usize,
	pub id: String,
	pub node_type: NodeType,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	/// Pinned position, set only while the node is dragged.
	pub fx: Option<f64>,
	pub fy: Option<f64>,
	pub home_x: f64,
	pub home_y: f64,
	/// 0 for the focus, 1 or 2 for its ego network, `None` in overview mode.
	pub hop_distance: Option<u8>,
	pub is_focus: bool,
	pub effective_radius: f64,
}

impl SimNode {
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() && self.fy.is_some()
	}
}

/// `Idle -> Running -> Dragging -> Running -> Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationPhase {
	#[default]
	Idle,
	Running,
	/// Held warm while the node at this position in [`ForceSimulation::nodes`]
	/// is pinned under the pointer.
	Dragging { node: usize },
}

pub struct ForceSimulation {
	nodes: Vec<SimNode>,
	links: Vec<(usize, usize)>,
	node_index: HashMap<String, usize>,
	config: ForceConfig,
	silhouette: Silhouette,
	width: f64,
	height: f64,
	alpha: f64,
	alpha_target: f64,
	phase: SimulationPhase,
	iterations: u64,
	energy: f64,
}

impl ForceSimulation {
	/// `links` hold positions into `nodes`; out-of-range and self links are
	/// dropped. Starts idle.
	pub fn new(
		nodes: Vec<SimNode>,
		links: Vec<(usize, usize)>,
		config: ForceConfig,
		silhouette: Silhouette,
		width: f64,
		height: f64,
	) -> Self {
		let n = nodes.len();
		let links = links
			.into_iter()
			.filter(|&(s, t)| s < n && t < n && s != t)
			.collect();
		let node_index = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		Self {
			nodes,
			links,
			node_index,
			config,
			silhouette,
			width,
			height,
			alpha: 1.0,
			alpha_target: 0.0,
			phase: SimulationPhase::Idle,
			iterations: 0,
			energy: 0.0,
		}
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn links(&self) -> &[(usize, usize)] {
		&self.links
	}

	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.node_index.get(id).map(|&i| &self.nodes[i])
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn phase(&self) -> SimulationPhase {
		self.phase
	}

	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Kinetic energy of the last iteration.
	pub fn energy(&self) -> f64 {
		self.energy
	}

	pub fn iterations(&self) -> u64 {
		self.iterations
	}

	pub fn silhouette(&self) -> &Silhouette {
		&self.silhouette
	}

	pub fn positions(&self) -> HashMap<String, (f64, f64)> {
		self.nodes
			.iter()
			.map(|n| (n.id.clone(), (n.x, n.y)))
			.collect()
	}

	/// Starts cooling from full energy. An empty simulation stays idle.
	pub fn start(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		self.alpha = 1.0;
		if self.phase == SimulationPhase::Idle {
			self.set_phase(SimulationPhase::Running);
		}
	}

	/// Raises energy to at least `alpha` without resetting the layout.
	pub fn reheat(&mut self, alpha: f64) {
		if self.nodes.is_empty() {
			return;
		}
		self.alpha = self.alpha.max(alpha);
		if self.phase == SimulationPhase::Idle {
			self.set_phase(SimulationPhase::Running);
		}
	}

	/// Runs until the simulation cools to idle or `max_iterations` is
	/// reached and returns the resulting positions.
	pub fn run(&mut self, max_iterations: usize) -> HashMap<String, (f64, f64)> {
		if self.phase == SimulationPhase::Idle {
			self.start();
		}
		for _ in 0..max_iterations {
			if !self.tick() {
				break;
			}
		}
		self.positions()
	}

	/// Performs one iteration. Returns `false` when idle or empty.
	pub fn tick(&mut self) -> bool {
		if self.phase == SimulationPhase::Idle {
			return false;
		}
		if self.nodes.is_empty() {
			self.set_phase(SimulationPhase::Idle);
			return false;
		}

		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
		let forces = self.accumulate_forces();
		self.integrate(&forces);
		self.contain();
		self.iterations += 1;
		trace!(
			"iteration {} alpha={:.4} energy={:.3}",
			self.iterations, self.alpha, self.energy
		);

		if self.phase == SimulationPhase::Running && self.alpha < self.config.alpha_min {
			self.set_phase(SimulationPhase::Idle);
		}
		true
	}

	/// Pins `id` at its current position and keeps the simulation warm until
	/// [`end_drag`](Self::end_drag). A drag already in progress on another
	/// node is released first.
	pub fn begin_drag(&mut self, id: &str) -> bool {
		let Some(&idx) = self.node_index.get(id) else {
			return false;
		};
		if let SimulationPhase::Dragging { node } = self.phase {
			if node != idx {
				self.release(node);
			}
		}
		let node = &mut self.nodes[idx];
		node.fx = Some(node.x);
		node.fy = Some(node.y);
		node.vx = 0.0;
		node.vy = 0.0;
		self.alpha_target = self.config.reheat_alpha;
		self.alpha = self.alpha.max(self.config.reheat_alpha);
		self.set_phase(SimulationPhase::Dragging { node: idx });
		true
	}

	/// Moves the pin of the node being dragged. The position is picked up
	/// by the next iteration.
	pub fn update_drag(&mut self, id: &str, x: f64, y: f64) -> bool {
		let Some(&idx) = self.node_index.get(id) else {
			return false;
		};
		let dragging = self.phase == (SimulationPhase::Dragging { node: idx });
		if !dragging || !x.is_finite() || !y.is_finite() {
			return false;
		}
		let node = &mut self.nodes[idx];
		node.fx = Some(x);
		node.fy = Some(y);
		true
	}

	/// Unpins the dragged node, projects it back inside and lets the
	/// simulation cool again.
	pub fn end_drag(&mut self, id: &str) -> bool {
		let Some(&idx) = self.node_index.get(id) else {
			return false;
		};
		if self.phase != (SimulationPhase::Dragging { node: idx }) {
			return false;
		}
		self.release(idx);
		self.alpha_target = 0.0;
		self.set_phase(SimulationPhase::Running);
		true
	}

	fn release(&mut self, idx: usize) {
		let (width, height) = (self.width, self.height);
		let node = &mut self.nodes[idx];
		if let (Some(fx), Some(fy)) = (node.fx.take(), node.fy.take()) {
			node.x = fx;
			node.y = fy;
		}
		(node.x, node.y) = self.silhouette.project_scaled(node.x, node.y, width, height);
	}

	fn set_phase(&mut self, phase: SimulationPhase) {
		if self.phase != phase {
			debug!("simulation {:?} -> {:?}", self.phase, phase);
			self.phase = phase;
		}
	}

	/// Separation vector from `i` to `j`. Coincident nodes get a tiny
	/// direction derived from their indices so forces stay finite.
	fn delta(&self, i: usize, j: usize) -> (f64, f64) {
		let (a, b) = (&self.nodes[i], &self.nodes[j]);
		let (dx, dy) = (b.x - a.x, b.y - a.y);
		if dx == 0.0 && dy == 0.0 {
			let angle = (i * 31 + j * 17) as f64 * GOLDEN_ANGLE;
			(angle.cos() * JIGGLE, angle.sin() * JIGGLE)
		} else {
			(dx, dy)
		}
	}

	fn accumulate_forces(&self) -> Vec<(f64, f64)> {
		let cfg = &self.config;
		let alpha = self.alpha;
		let mut forces = vec![(0.0, 0.0); self.nodes.len()];

		// Parallel links each pull independently.
		for &(s, t) in &self.links {
			let (dx, dy) = self.delta(s, t);
			let dist = (dx * dx + dy * dy).sqrt();
			let k = (dist - cfg.link_distance) / dist * cfg.link_strength * alpha * 0.5;
			forces[s].0 += dx * k;
			forces[s].1 += dy * k;
			forces[t].0 -= dx * k;
			forces[t].1 -= dy * k;
		}

		let max_radius = self
			.nodes
			.iter()
			.map(|n| n.effective_radius)
			.fold(0.0, f64::max);
		let reach = cfg
			.charge_max_distance
			.max(2.0 * max_radius + cfg.collision_padding);
		let charge_max_sq = cfg.charge_max_distance * cfg.charge_max_distance;
		let charge_min_sq = cfg.charge_min_distance * cfg.charge_min_distance;

		self.for_each_pair(reach, |i, j| {
			let (dx, dy) = self.delta(i, j);
			let dist_sq = dx * dx + dy * dy;
			let dist = dist_sq.sqrt();
			let (ux, uy) = (dx / dist, dy / dist);

			if dist_sq <= charge_max_sq {
				let f = cfg.charge_strength * alpha / dist_sq.max(charge_min_sq);
				forces[i].0 -= ux * f;
				forces[i].1 -= uy * f;
				forces[j].0 += ux * f;
				forces[j].1 += uy * f;
			}

			let (ri, rj) = (self.nodes[i].effective_radius, self.nodes[j].effective_radius);
			let min_dist = ri + rj + cfg.collision_padding;
			if dist < min_dist {
				let push = (min_dist - dist) * cfg.collision_strength * 0.5;
				forces[i].0 -= ux * push;
				forces[i].1 -= uy * push;
				forces[j].0 += ux * push;
				forces[j].1 += uy * push;
			}
		});

		for (node, force) in self.nodes.iter().zip(forces.iter_mut()) {
			force.0 += (node.home_x - node.x) * cfg.home_x_strength * alpha;
			force.1 += (node.home_y - node.y) * cfg.home_y_strength * alpha;
		}

		forces
	}

	/// Calls `f(i, j)` with `i < j` for every pair that may lie within
	/// `reach`: all pairs for small graphs, R-tree neighbors for large ones.
	fn for_each_pair(&self, reach: f64, mut f: impl FnMut(usize, usize)) {
		let n = self.nodes.len();
		if n <= self.config.spatial_index_threshold {
			for i in 0..n {
				for j in (i + 1)..n {
					f(i, j);
				}
			}
			return;
		}

		let tree = RTree::bulk_load(
			self.nodes
				.iter()
				.enumerate()
				.map(|(i, node)| GeomWithData::new([node.x, node.y], i))
				.collect(),
		);
		let reach_sq = reach * reach;
		let mut neighbors = Vec::new();
		for (i, node) in self.nodes.iter().enumerate() {
			neighbors.clear();
			neighbors.extend(
				tree.locate_within_distance([node.x, node.y], reach_sq)
					.map(|entry| entry.data)
					.filter(|&j| j > i),
			);
			// Tree order is arbitrary; sorting keeps accumulation order stable.
			neighbors.sort_unstable();
			for &j in &neighbors {
				f(i, j);
			}
		}
	}

	fn integrate(&mut self, forces: &[(f64, f64)]) {
		let keep = 1.0 - self.config.velocity_decay;
		let max_velocity = self.config.max_velocity;
		let mut energy = 0.0;

		for (node, &(fx, fy)) in self.nodes.iter_mut().zip(forces) {
			if let (Some(px), Some(py)) = (node.fx, node.fy) {
				node.x = px;
				node.y = py;
				node.vx = 0.0;
				node.vy = 0.0;
				continue;
			}

			let (mut vx, mut vy) = ((node.vx + fx) * keep, (node.vy + fy) * keep);
			if !vx.is_finite() || !vy.is_finite() {
				vx = 0.0;
				vy = 0.0;
			}
			let speed = (vx * vx + vy * vy).sqrt();
			if speed > max_velocity {
				let scale = max_velocity / speed;
				vx *= scale;
				vy *= scale;
			}

			node.vx = vx;
			node.vy = vy;
			node.x += vx;
			node.y += vy;
			if !node.x.is_finite() || !node.y.is_finite() {
				node.x = node.home_x;
				node.y = node.home_y;
				node.vx = 0.0;
				node.vy = 0.0;
			}
			energy += vx * vx + vy * vy;
		}

		self.energy = energy;
	}

	fn contain(&mut self) {
		let (width, height) = (self.width, self.height);
		for node in self.nodes.iter_mut().filter(|n| !n.is_pinned()) {
			(node.x, node.y) = self.silhouette.project_scaled(node.x, node.y, width, height);
		}
	}
}
