use std::collections::HashSet;
use std::rc::Rc;

use leptos::ev::MouseEvent;
use leptos::prelude::*;

use super::render::draw_brain;
use crate::components::brain_graph::{
	BrainGraphCanvas, Depth, FrameRenderer, GraphData, GraphLink, GraphNode, NodeType,
};

const HINT: &str = "Click a node to focus. Drag to reposition, scroll to zoom.";

/// Generate a sample research graph: projects with their species,
/// investigators, tags, publications and resources.
fn generate_sample_data(projects: usize) -> GraphData {
	let mut nodes = Vec::new();
	let mut links = Vec::new();

	let species = ["Mus musculus", "Danio rerio", "Macaca mulatta", "Drosophila"];
	for (i, name) in species.iter().enumerate() {
		nodes.push(GraphNode::new(format!("species-{i}"), *name, NodeType::Species));
	}
	for i in 0..6 {
		nodes.push(GraphNode::new(
			format!("inv-{i}"),
			format!("Investigator {}", i + 1),
			NodeType::Investigator,
		));
	}
	for i in 0..16 {
		nodes.push(
			GraphNode::new(format!("tag-{i}"), format!("tag {}", i + 1), NodeType::MetaTag)
				.with_radius(3.5),
		);
	}

	for p in 0..projects {
		let id = format!("project-{p}");
		nodes.push(
			GraphNode::new(&id, format!("Project {}", p + 1), NodeType::Project).with_radius(9.0),
		);

		let pick = |salt: usize, n: usize| (rand_simple(p * 7 + salt) * n as f64) as usize;
		links.push(GraphLink::new(&id, format!("species-{}", pick(1, species.len())), "studies"));
		links.push(GraphLink::new(&id, format!("inv-{}", pick(2, 6)), "led_by"));
		for t in 0..3 {
			links.push(GraphLink::new(&id, format!("tag-{}", pick(3 + t, 16)), "tagged"));
		}

		let publication = format!("pub-{p}");
		nodes.push(GraphNode::new(&publication, format!("Paper {}", p + 1), NodeType::Publication));
		links.push(GraphLink::new(&id, publication, "published"));

		if p % 2 == 0 {
			let resource = format!("res-{p}");
			nodes.push(GraphNode::new(&resource, format!("Dataset {}", p + 1), NodeType::Resource));
			links.push(GraphLink::new(&id, resource, "produced"));
		}
	}

	GraphData { nodes, links }
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph_data = Signal::derive(move || generate_sample_data(10));
	let (depth, set_depth) = signal(Depth::One);
	let (hidden, set_hidden) = signal(HashSet::<NodeType>::new());
	let (focus, set_focus) = signal(None::<String>);

	let toggle_depth = move |_: MouseEvent| {
		set_depth.update(|d| {
			*d = match *d {
				Depth::One => Depth::Two,
				Depth::Two => Depth::One,
			}
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<div class="fullscreen-graph">
				<BrainGraphCanvas
					data=graph_data
					depth=depth
					hidden_types=hidden
					on_focus=Callback::new(move |id: Option<String>| set_focus.set(id))
					renderer={
						let renderer: FrameRenderer = Rc::new(draw_brain);
						renderer
					}
					fullscreen=true
				/>
				<div class="graph-overlay">
					<h1>"Research Brain"</h1>
					<p class="subtitle">
						{move || match focus.get() {
							Some(id) => format!("Focused on {id}. Click the background to reset."),
							None => HINT.to_string(),
						}}
					</p>
					<button on:click=toggle_depth>
						{move || format!("Hops: {}", u8::from(depth.get()))}
					</button>
					{NodeType::ALL
						.into_iter()
						.map(|t| {
							view! {
								<label class="type-filter">
									<input
										type="checkbox"
										prop:checked=move || !hidden.get().contains(&t)
										on:change=move |_| {
											set_hidden
												.update(|h| {
													if !h.remove(&t) {
														h.insert(t);
													}
												})
										}
									/>
									{t.as_str()}
								</label>
							}
						})
						.collect_view()}
				</div>
			</div>
		</ErrorBoundary>
	}
}
