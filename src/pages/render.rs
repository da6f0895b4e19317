use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use crate::components::brain_graph::{BrainGraphState, NodeType, SimNode};

fn node_color(node_type: NodeType) -> &'static str {
	match node_type {
		NodeType::Project => "#f4a261",
		NodeType::Species => "#2a9d8f",
		NodeType::Investigator => "#e76f51",
		NodeType::MetaTag => "#8ab4f8",
		NodeType::Publication => "#c3a6ff",
		NodeType::Resource => "#e9c46a",
	}
}

/// Labels the focus and its direct neighbors, or every project in overview.
fn shows_label(node: &SimNode) -> bool {
	match node.hop_distance {
		Some(hop) => hop <= 1,
		None => node.node_type == NodeType::Project,
	}
}

/// Draws the brain outline, links and nodes for the current view.
pub fn draw_brain(ctx: &CanvasRenderingContext2d, state: &BrainGraphState) {
	ctx.set_fill_style_str("#1a1a2e");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_outline(state, ctx);
	draw_links(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_outline(state: &BrainGraphState, ctx: &CanvasRenderingContext2d) {
	let vertices = state.silhouette().vertices();
	let Some(first) = vertices.first() else {
		return;
	};
	ctx.begin_path();
	ctx.move_to(first.x * state.width, first.y * state.height);
	for v in &vertices[1..] {
		ctx.line_to(v.x * state.width, v.y * state.height);
	}
	ctx.close_path();
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.04)");
	ctx.fill();
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.25)");
	ctx.set_line_width(1.5 / state.transform.k);
	ctx.stroke();
}

fn draw_links(state: &BrainGraphState, ctx: &CanvasRenderingContext2d) {
	let nodes = state.simulation().nodes();
	ctx.set_stroke_style_str("rgba(100, 180, 255, 0.35)");
	ctx.set_line_width(1.0 / state.transform.k);
	ctx.begin_path();
	for &(s, t) in state.simulation().links() {
		ctx.move_to(nodes[s].x, nodes[s].y);
		ctx.line_to(nodes[t].x, nodes[t].y);
	}
	ctx.stroke();
}

fn draw_nodes(state: &BrainGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let graph_nodes = state.graph().nodes();
	ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));

	for node in state.simulation().nodes() {
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, node.effective_radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node_color(node.node_type));
		ctx.fill();

		if node.is_focus {
			ctx.set_stroke_style_str("white");
			ctx.set_line_width(2.0 / k);
			ctx.stroke();
		}
		if shows_label(node) {
			ctx.set_fill_style_str("rgba(255, 255, 255, 0.8)");
			let label = &graph_nodes[node.index].label;
			let _ = ctx.fill_text(label, node.x + node.effective_radius + 3.0, node.y + 3.0);
		}
	}
}
