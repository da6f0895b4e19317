use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::config::LayoutConfig;
use super::ego::EgoNetworkResult;
use super::geometry::Silhouette;
use super::regions::{RegionTable, home_position};
use super::simulation::{ForceSimulation, SimNode};
use super::types::{KnowledgeGraph, NodeType};

/// Creates one [`SimNode`] per visible node, in graph order. Home positions
/// come from the region table; starting positions are the home positions
/// plus seeded jitter, projected back inside.
pub fn seed_nodes(
	graph: &KnowledgeGraph,
	ego: &EgoNetworkResult,
	config: &LayoutConfig,
	regions: &RegionTable,
	silhouette: &Silhouette,
	width: f64,
	height: f64,
) -> Vec<SimNode> {
	let nodes = graph.nodes();
	let mut totals: HashMap<NodeType, usize> = HashMap::new();
	for &i in &ego.visible_nodes {
		*totals.entry(nodes[i].node_type).or_default() += 1;
	}

	let amplitude = config.jitter.amplitude.abs();
	let mut rng = StdRng::seed_from_u64(config.jitter.seed);
	let mut seen: HashMap<NodeType, usize> = HashMap::new();

	ego.visible_nodes
		.iter()
		.map(|&i| {
			let node = &nodes[i];
			let slot = seen.entry(node.node_type).or_default();
			let index_in_type = *slot;
			*slot += 1;

			let (home_x, home_y) = home_position(
				regions,
				silhouette,
				node.node_type,
				index_in_type,
				totals[&node.node_type],
				width,
				height,
			);
			let (x, y) = if amplitude > 0.0 {
				let jx = rng.gen_range(-amplitude..=amplitude);
				let jy = rng.gen_range(-amplitude..=amplitude);
				silhouette.project_scaled(home_x + jx, home_y + jy, width, height)
			} else {
				(home_x, home_y)
			};

			let hop_distance = ego.hop_distance(&node.id);
			SimNode {
				index: i,
				id: node.id.clone(),
				node_type: node.node_type,
				x,
				y,
				vx: 0.0,
				vy: 0.0,
				fx: None,
				fy: None,
				home_x,
				home_y,
				hop_distance,
				is_focus: hop_distance == Some(0),
				effective_radius: config.radii.effective_radius(node.base_radius, hop_distance),
			}
		})
		.collect()
}

/// Maps the visible links onto positions within `seeded`.
pub fn seed_links(
	graph: &KnowledgeGraph,
	ego: &EgoNetworkResult,
	seeded: &[SimNode],
) -> Vec<(usize, usize)> {
	let local: HashMap<usize, usize> = seeded
		.iter()
		.enumerate()
		.map(|(pos, node)| (node.index, pos))
		.collect();
	ego.visible_links
		.iter()
		.filter_map(|&li| {
			let (a, b) = graph.link_endpoints(&graph.links()[li])?;
			Some((*local.get(&a)?, *local.get(&b)?))
		})
		.collect()
}

/// Builds a fresh, started simulation for `ego`.
pub fn build_simulation(
	graph: &KnowledgeGraph,
	ego: &EgoNetworkResult,
	config: &LayoutConfig,
	regions: &RegionTable,
	silhouette: &Silhouette,
	width: f64,
	height: f64,
) -> ForceSimulation {
	let nodes = seed_nodes(graph, ego, config, regions, silhouette, width, height);
	let links = seed_links(graph, ego, &nodes);
	let mut sim = ForceSimulation::new(
		nodes,
		links,
		config.forces.clone(),
		silhouette.clone(),
		width,
		height,
	);
	sim.start();
	sim
}
