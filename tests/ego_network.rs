use std::collections::{HashMap, HashSet};

use brain_graph_canvas::components::brain_graph::{
	Depth, GraphData, GraphLink, GraphNode, KnowledgeGraph, LayoutConfig, NodeType, extract,
};

/// P1 linked to S1, I1 and M1..M10. With `extended`, S1 also links to
/// N1..N6, tags P1 does not reach directly.
fn research_graph(extended: bool) -> KnowledgeGraph {
	let mut nodes = vec![
		GraphNode::new("P1", "Project", NodeType::Project),
		GraphNode::new("S1", "Species", NodeType::Species),
		GraphNode::new("I1", "Investigator", NodeType::Investigator),
	];
	let mut links = vec![
		GraphLink::new("P1", "S1", "studies"),
		GraphLink::new("P1", "I1", "led_by"),
	];
	for i in 1..=10 {
		let id = format!("M{i}");
		nodes.push(GraphNode::new(&id, format!("tag {i}"), NodeType::MetaTag));
		links.push(GraphLink::new("P1", id, "tagged"));
	}
	if extended {
		for i in 1..=6 {
			let id = format!("N{i}");
			nodes.push(GraphNode::new(&id, format!("species tag {i}"), NodeType::MetaTag));
			links.push(GraphLink::new("S1", id, "tagged"));
		}
	}
	KnowledgeGraph::new(GraphData { nodes, links }).unwrap()
}

fn caps() -> HashMap<NodeType, usize> {
	LayoutConfig::default().fan_out_caps
}

fn ids(names: &[&str]) -> HashSet<String> {
	names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn depth_one_admits_every_neighbor_uncapped() {
	let g = research_graph(false);
	let r = extract(&g, Some("P1"), Depth::One, &HashSet::new(), &caps());

	let mut expected = ids(&["P1", "S1", "I1"]);
	expected.extend((1..=10).map(|i| format!("M{i}")));
	assert_eq!(r.visible_node_ids, expected);

	assert_eq!(r.hop_distance("P1"), Some(0));
	for id in expected.iter().filter(|id| *id != "P1") {
		assert_eq!(r.hop_distance(id), Some(1), "{id}");
	}
	assert_eq!(r.visible_links.len(), 12);
}

#[test]
fn depth_two_caps_second_hop_meta_tags_at_five() {
	let g = research_graph(true);
	let r = extract(&g, Some("P1"), Depth::Two, &HashSet::new(), &caps());

	let admitted: Vec<_> = (1..=6)
		.map(|i| format!("N{i}"))
		.filter(|id| r.is_visible(id))
		.collect();
	assert_eq!(admitted, ["N1", "N2", "N3", "N4", "N5"]);
	assert!(!r.is_visible("N6"));
	for id in &admitted {
		assert_eq!(r.hop_distance(id), Some(2));
	}
	// First-hop tags are never subject to the cap.
	assert!((1..=10).all(|i| r.hop_distance(&format!("M{i}")) == Some(1)));
}

#[test]
fn depth_two_without_cap_admits_all() {
	let g = research_graph(true);
	let r = extract(&g, Some("P1"), Depth::Two, &HashSet::new(), &HashMap::new());
	assert!((1..=6).all(|i| r.is_visible(&format!("N{i}"))));
}

#[test]
fn hidden_types_remove_nodes_and_their_links() {
	let g = research_graph(false);
	let hidden = HashSet::from([NodeType::MetaTag]);
	let r = extract(&g, Some("P1"), Depth::One, &hidden, &caps());

	assert_eq!(r.visible_node_ids, ids(&["P1", "S1", "I1"]));
	for &li in &r.visible_links {
		let link = &g.links()[li];
		assert!(!link.source_id.starts_with('M') && !link.target_id.starts_with('M'));
	}
	assert_eq!(r.visible_links.len(), 2);
}

#[test]
fn overview_never_shows_meta_tags() {
	let g = research_graph(true);
	for depth in [Depth::One, Depth::Two] {
		let r = extract(&g, None, depth, &HashSet::new(), &caps());
		assert_eq!(r.visible_node_ids, ids(&["P1", "S1", "I1"]));
		assert!(r.hop_distance_by_id.is_empty());
		assert!(r.is_overview());
	}
}

#[test]
fn extraction_is_deterministic() {
	let g = research_graph(true);
	let hidden = HashSet::from([NodeType::Investigator]);
	let a = extract(&g, Some("P1"), Depth::Two, &hidden, &caps());
	let b = extract(&g, Some("P1"), Depth::Two, &hidden, &caps());
	assert_eq!(a.visible_node_ids, b.visible_node_ids);
	assert_eq!(a.hop_distance_by_id, b.hop_distance_by_id);
	assert_eq!(a, b);
}
