//! Bounded, type-filtered ego networks.
//!
//! Traversal always walks nodes in the graph's input order, so the fan-out
//! caps and the recorded hop distances are reproducible: when a node is
//! reachable through several hop-1 neighbors, the first admission wins.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};

use super::error::LayoutError;
use super::types::{KnowledgeGraph, NodeType};

/// How far from the focus node the ego network reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Depth {
	#[default]
	One,
	Two,
}

impl TryFrom<u8> for Depth {
	type Error = LayoutError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		match value {
			1 => Ok(Depth::One),
			2 => Ok(Depth::Two),
			other => Err(LayoutError::InvalidDepth(other)),
		}
	}
}

impl From<Depth> for u8 {
	fn from(depth: Depth) -> u8 {
		match depth {
			Depth::One => 1,
			Depth::Two => 2,
		}
	}
}

/// Visible subset of the graph for one (focus, depth, hidden types) input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EgoNetworkResult {
	pub visible_node_ids: HashSet<String>,
	/// Empty in overview mode.
	pub hop_distance_by_id: HashMap<String, u8>,
	/// Focus id actually used; `None` when the request fell back to overview.
	pub focus_id: Option<String>,
	/// Indices into the graph's nodes, in input order.
	pub visible_nodes: Vec<usize>,
	/// Indices into the graph's links whose endpoints are both visible.
	pub visible_links: Vec<usize>,
}

impl EgoNetworkResult {
	pub fn is_visible(&self, id: &str) -> bool {
		self.visible_node_ids.contains(id)
	}

	pub fn hop_distance(&self, id: &str) -> Option<u8> {
		self.hop_distance_by_id.get(id).copied()
	}

	pub fn is_overview(&self) -> bool {
		self.focus_id.is_none()
	}
}

/// Undirected neighbor lists indexed like the graph's nodes. Self links and
/// links to unknown ids are dropped; each list is sorted and deduplicated.
fn adjacency(graph: &KnowledgeGraph) -> Vec<Vec<usize>> {
	let mut adj = vec![Vec::new(); graph.len()];
	for link in graph.links() {
		let Some((a, b)) = graph.link_endpoints(link) else {
			continue;
		};
		if a == b {
			continue;
		}
		adj[a].push(b);
		adj[b].push(a);
	}
	for list in &mut adj {
		list.sort_unstable();
		list.dedup();
	}
	adj
}

/// Computes the visible node and link set.
///
/// `caps` limits how many nodes of a type may be admitted at hop 2,
/// cumulatively across all hop-1 sources. An unknown focus, or a focus whose
/// own type is hidden, falls back to overview mode.
pub fn extract(
	graph: &KnowledgeGraph,
	focus_id: Option<&str>,
	depth: Depth,
	hidden: &HashSet<NodeType>,
	caps: &HashMap<NodeType, usize>,
) -> EgoNetworkResult {
	let nodes = graph.nodes();
	let adj = adjacency(graph);
	let is_hidden = |i: usize| hidden.contains(&nodes[i].node_type);

	let focus = match focus_id {
		None => None,
		Some(id) => match graph.index_of(id) {
			Some(i) if !is_hidden(i) => Some(i),
			Some(_) => {
				debug!("focus {id} has a hidden type, showing overview");
				None
			}
			None => {
				warn!("unknown focus id {id}, showing overview");
				None
			}
		},
	};

	let mut visible = vec![false; nodes.len()];
	let mut hops: HashMap<usize, u8> = HashMap::new();

	match focus {
		None => {
			for (i, node) in nodes.iter().enumerate() {
				if node.node_type != NodeType::Project {
					continue;
				}
				if !is_hidden(i) {
					visible[i] = true;
				}
				for &n in &adj[i] {
					let overview_type = matches!(
						nodes[n].node_type,
						NodeType::Species | NodeType::Investigator
					);
					if overview_type && !is_hidden(n) {
						visible[n] = true;
					}
				}
			}
		}
		Some(f) => {
			visible[f] = true;
			hops.insert(f, 0);
			for &n in &adj[f] {
				if !is_hidden(n) {
					visible[n] = true;
					hops.insert(n, 1);
				}
			}

			if depth == Depth::Two {
				let first_hop: Vec<usize> =
					adj[f].iter().copied().filter(|&n| visible[n]).collect();
				let mut admitted: HashMap<NodeType, usize> = HashMap::new();
				for h in first_hop {
					for &n in &adj[h] {
						if visible[n] || is_hidden(n) {
							continue;
						}
						let node_type = nodes[n].node_type;
						let count = admitted.entry(node_type).or_insert(0);
						if caps.get(&node_type).is_some_and(|&cap| *count >= cap) {
							continue;
						}
						*count += 1;
						visible[n] = true;
						hops.insert(n, 2);
					}
				}
			}
		}
	}

	let visible_nodes: Vec<usize> = (0..nodes.len()).filter(|&i| visible[i]).collect();
	let visible_links = graph
		.links()
		.iter()
		.enumerate()
		.filter_map(|(li, link)| {
			let (a, b) = graph.link_endpoints(link)?;
			(a != b && visible[a] && visible[b]).then_some(li)
		})
		.collect();

	let result = EgoNetworkResult {
		visible_node_ids: visible_nodes.iter().map(|&i| nodes[i].id.clone()).collect(),
		hop_distance_by_id: hops
			.into_iter()
			.map(|(i, hop)| (nodes[i].id.clone(), hop))
			.collect(),
		focus_id: focus.map(|f| nodes[f].id.clone()),
		visible_nodes,
		visible_links,
	};
	debug!(
		"ego network: focus={:?} depth={} nodes={} links={}",
		result.focus_id,
		u8::from(depth),
		result.visible_nodes.len(),
		result.visible_links.len()
	);
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::brain_graph::types::{GraphData, GraphLink, GraphNode};

	fn node(id: &str, t: NodeType) -> GraphNode {
		GraphNode::new(id, id.to_uppercase(), t)
	}

	fn graph(nodes: Vec<GraphNode>, links: &[(&str, &str)]) -> KnowledgeGraph {
		KnowledgeGraph::new(GraphData {
			nodes,
			links: links
				.iter()
				.map(|(a, b)| GraphLink::new(*a, *b, "rel"))
				.collect(),
		})
		.unwrap()
	}

	fn no_caps() -> HashMap<NodeType, usize> {
		HashMap::new()
	}

	#[test]
	fn self_links_and_dangling_links_are_ignored() {
		let g = graph(
			vec![node("p1", NodeType::Project), node("s1", NodeType::Species)],
			&[("p1", "p1"), ("p1", "ghost"), ("p1", "s1"), ("s1", "p1")],
		);
		let adj = adjacency(&g);
		assert_eq!(adj[0], vec![1]);
		assert_eq!(adj[1], vec![0]);

		let r = extract(&g, Some("p1"), Depth::One, &HashSet::new(), &no_caps());
		// Both parallel links survive; the self link and dangling link do not.
		assert_eq!(r.visible_links, vec![2, 3]);
	}

	#[test]
	fn unknown_focus_falls_back_to_overview() {
		let g = graph(
			vec![
				node("p1", NodeType::Project),
				node("s1", NodeType::Species),
				node("r1", NodeType::Resource),
			],
			&[("p1", "s1"), ("p1", "r1")],
		);
		let r = extract(&g, Some("nope"), Depth::Two, &HashSet::new(), &no_caps());
		assert!(r.is_overview());
		assert_eq!(r.visible_nodes, vec![0, 1]);
		assert!(r.hop_distance_by_id.is_empty());
	}

	#[test]
	fn hidden_focus_type_falls_back_to_overview() {
		let g = graph(
			vec![node("p1", NodeType::Project), node("m1", NodeType::MetaTag)],
			&[("p1", "m1")],
		);
		let hidden = HashSet::from([NodeType::MetaTag]);
		let r = extract(&g, Some("m1"), Depth::One, &hidden, &no_caps());
		assert!(r.is_overview());
		assert!(!r.is_visible("m1"));
		assert!(r.is_visible("p1"));
	}

	#[test]
	fn overview_with_hidden_projects_keeps_their_neighbors() {
		let g = graph(
			vec![
				node("p1", NodeType::Project),
				node("s1", NodeType::Species),
				node("i1", NodeType::Investigator),
			],
			&[("p1", "s1"), ("p1", "i1")],
		);
		let hidden = HashSet::from([NodeType::Project]);
		let r = extract(&g, None, Depth::One, &hidden, &no_caps());
		assert_eq!(r.visible_nodes, vec![1, 2]);
		assert!(r.visible_links.is_empty());
	}

	#[test]
	fn first_admission_wins_for_shared_second_hop() {
		// s1 and i1 both reach t1; s1 comes first in node order.
		let g = graph(
			vec![
				node("p1", NodeType::Project),
				node("s1", NodeType::Species),
				node("i1", NodeType::Investigator),
				node("t1", NodeType::Publication),
			],
			&[("p1", "i1"), ("p1", "s1"), ("i1", "t1"), ("s1", "t1")],
		);
		let r = extract(&g, Some("p1"), Depth::Two, &HashSet::new(), &no_caps());
		assert_eq!(r.hop_distance("t1"), Some(2));
		assert_eq!(r.hop_distance("s1"), Some(1));
		assert_eq!(r.hop_distance("p1"), Some(0));
	}

	#[test]
	fn depth_conversion() {
		assert_eq!(Depth::try_from(2).unwrap(), Depth::Two);
		assert!(matches!(Depth::try_from(3), Err(LayoutError::InvalidDepth(3))));
		assert_eq!(u8::from(Depth::One), 1);
	}
}
