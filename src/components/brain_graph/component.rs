use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::LayoutConfig;
use super::ego::Depth;
use super::geometry::Silhouette;
use super::regions::RegionTable;
use super::state::BrainGraphState;
use super::types::{GraphData, KnowledgeGraph, NodeType};

/// Screen pixels the pointer may travel before a press becomes a drag.
const CLICK_SLOP: f64 = 3.0;

/// Draws one frame. Called after each animation tick with the canvas context
/// and the current view; pan/zoom is in `state.transform`.
pub type FrameRenderer = Rc<dyn Fn(&CanvasRenderingContext2d, &BrainGraphState)>;

fn build_state(
	data: GraphData,
	config: &LayoutConfig,
	(w, h): (f64, f64),
	depth: Depth,
	hidden: HashSet<NodeType>,
) -> Option<BrainGraphState> {
	match KnowledgeGraph::new(data) {
		Ok(graph) => {
			let mut state = BrainGraphState::new(
				graph,
				config.clone(),
				RegionTable::brain(),
				Silhouette::brain(),
				w,
				h,
			);
			state.set_depth(depth);
			state.set_hidden_types(hidden);
			Some(state)
		}
		Err(err) => {
			error!("rejected graph data: {err}");
			None
		}
	}
}

/// Replaces `slot` with a view of new graph data, keeping its viewport size.
/// Returns `true` when a focus was set before, since the rebuilt view starts
/// in overview mode.
fn rebuild_state(
	slot: &mut Option<BrainGraphState>,
	data: GraphData,
	config: &LayoutConfig,
	fallback_size: Option<(f64, f64)>,
	depth: Depth,
	hidden: HashSet<NodeType>,
) -> bool {
	let previous = slot.as_ref().map(|s| ((s.width, s.height), s.focus().is_some()));
	let Some((size, had_focus)) = previous.or(fallback_size.map(|size| (size, false))) else {
		return false;
	};
	*slot = build_state(data, config, size, depth, hidden);
	had_focus
}

fn pointer_position(
	canvas_ref: NodeRef<leptos::html::Canvas>,
	ev: &MouseEvent,
) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

/// Canvas host for the brain-shaped graph. Owns the animation loop and turns
/// pointer gestures into focus, drag, pan and zoom commands.
#[component]
pub fn BrainGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(into)] depth: Signal<Depth>,
	#[prop(into)] hidden_types: Signal<HashSet<NodeType>>,
	#[prop(optional, into)] on_focus: Option<Callback<Option<String>>>,
	#[prop(optional)] renderer: Option<FrameRenderer>,
	#[prop(optional)] config: Option<LayoutConfig>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = Rc::new(config.unwrap_or_default());
	let state: Rc<RefCell<Option<BrainGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init, config_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), config.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: Option<CanvasRenderingContext2d> = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into().ok());
		let Some(ctx) = ctx else {
			error!("canvas has no 2d context");
			return;
		};

		*state_init.borrow_mut() = build_state(
			data.get_untracked(),
			&config_init,
			(w, h),
			depth.get_untracked(),
			hidden_types.get_untracked(),
		);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, renderer) =
			(state_init.clone(), animate_init.clone(), renderer.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				s.tick();
				if let Some(ref draw) = renderer {
					draw(&ctx, s);
				}
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Filter inputs. The first run of each is covered by the setup above.
	let state_depth = state.clone();
	Effect::new(move |prev: Option<()>| {
		let depth = depth.get();
		if prev.is_some() {
			if let Some(ref mut s) = *state_depth.borrow_mut() {
				s.set_depth(depth);
			}
		}
	});

	let state_hidden = state.clone();
	Effect::new(move |prev: Option<()>| {
		let hidden = hidden_types.get();
		if prev.is_some() {
			if let Some(ref mut s) = *state_hidden.borrow_mut() {
				s.set_hidden_types(hidden);
			}
		}
	});

	let (state_data, config_data) = (state.clone(), config.clone());
	Effect::new(move |prev: Option<()>| {
		let data = data.get();
		if prev.is_none() {
			return;
		}
		let canvas_size = canvas_ref.get_untracked().map(|canvas| {
			let canvas: HtmlCanvasElement = canvas.into();
			(canvas.width() as f64, canvas.height() as f64)
		});
		let focus_cleared = rebuild_state(
			&mut state_data.borrow_mut(),
			data,
			&config_data,
			canvas_size,
			depth.get_untracked(),
			hidden_types.get_untracked(),
		);
		if let (true, Some(cb)) = (focus_cleared, on_focus) {
			cb.run(None);
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(id) = s.node_at_position(x, y) {
				let start = s.simulation().node(&id).map(|n| (n.x, n.y));
				if let Some((nx, ny)) = start {
					s.begin_drag(&id);
					s.drag.active = true;
					s.drag.node_id = Some(id);
					s.drag.start_x = x;
					s.drag.start_y = y;
					s.drag.node_start_x = nx;
					s.drag.node_start_y = ny;
					s.drag.moved = false;
				}
			} else {
				s.pan.active = true;
				s.pan.start_x = x;
				s.pan.start_y = y;
				s.pan.transform_start_x = s.transform.x;
				s.pan.transform_start_y = s.transform.y;
				s.pan.moved = false;
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				let (dx, dy) = (x - s.drag.start_x, y - s.drag.start_y);
				if dx.hypot(dy) > CLICK_SLOP {
					s.drag.moved = true;
				}
				if let Some(id) = s.drag.node_id.clone() {
					let k = s.transform.k;
					let (nx, ny) = (s.drag.node_start_x + dx / k, s.drag.node_start_y + dy / k);
					s.update_drag(&id, nx, ny);
				}
			} else if s.pan.active {
				let (dx, dy) = (x - s.pan.start_x, y - s.pan.start_y);
				if dx.hypot(dy) > CLICK_SLOP {
					s.pan.moved = true;
				}
				s.transform.x = s.pan.transform_start_x + dx;
				s.transform.y = s.pan.transform_start_y + dy;
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		let mut focused = None;
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			if s.drag.active {
				if let Some(id) = s.drag.node_id.take() {
					s.end_drag(&id);
					// A press that never moved is a click: focus the node.
					if !s.drag.moved {
						s.set_focus(Some(&id));
						focused = Some(Some(id));
					}
				}
			} else if s.pan.active && !s.pan.moved && s.focus().is_some() {
				s.set_focus(None);
				focused = Some(None);
			}
			s.drag = Default::default();
			s.pan.active = false;
		}
		if let (Some(focus), Some(cb)) = (focused, on_focus) {
			cb.run(focus);
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			if let Some(id) = s.drag.node_id.take() {
				s.end_drag(&id);
			}
			s.drag = Default::default();
			s.pan.active = false;
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer_position(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			s.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="brain-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::brain_graph::types::{GraphLink, GraphNode};

	fn data(extra: bool) -> GraphData {
		let mut nodes = vec![
			GraphNode::new("p1", "Project", NodeType::Project),
			GraphNode::new("s1", "Species", NodeType::Species),
		];
		if extra {
			nodes.push(GraphNode::new("i1", "Investigator", NodeType::Investigator));
		}
		GraphData {
			nodes,
			links: vec![GraphLink::new("p1", "s1", "studies")],
		}
	}

	#[test]
	fn rebuild_reports_dropped_focus() {
		let config = LayoutConfig::default();
		let size = (640.0, 480.0);
		let mut slot = build_state(data(false), &config, size, Depth::Two, HashSet::new());
		slot.as_mut().unwrap().set_focus(Some("p1"));

		let hidden = HashSet::new();
		let cleared = rebuild_state(&mut slot, data(true), &config, None, Depth::Two, hidden);
		assert!(cleared);
		let state = slot.as_ref().unwrap();
		assert_eq!(state.focus(), None);
		assert_eq!(state.depth(), Depth::Two);
		assert_eq!((state.width, state.height), size);
		assert_eq!(state.graph().len(), 3);

		let hidden = HashSet::new();
		let cleared = rebuild_state(&mut slot, data(false), &config, None, Depth::One, hidden);
		assert!(!cleared);
	}

	#[test]
	fn rebuild_without_view_uses_canvas_size() {
		let config = LayoutConfig::default();
		let mut slot = None;
		let hidden = HashSet::from([NodeType::Species]);
		assert!(!rebuild_state(&mut slot, data(false), &config, None, Depth::One, hidden.clone()));
		assert!(slot.is_none());

		rebuild_state(&mut slot, data(false), &config, Some((300.0, 200.0)), Depth::One, hidden);
		let state = slot.as_ref().unwrap();
		assert_eq!((state.width, state.height), (300.0, 200.0));
		assert!(!state.positions().contains_key("s1"));
	}

	#[test]
	fn invalid_data_leaves_no_view() {
		let mut bad = data(false);
		bad.nodes.push(GraphNode::new("p1", "Again", NodeType::Project));
		let config = LayoutConfig::default();
		let state = build_state(bad, &config, (640.0, 480.0), Depth::One, HashSet::new());
		assert!(state.is_none());
	}
}
