//! vizkit-graph: force-directed graph layout with an interactive canvas view.
//!
//! The layout engine runs headless (see [`Driver`]); this crate also ships a
//! WASM canvas component that renders it with pan/zoom, node dragging, and
//! hover tooltips.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod error;

pub use components::force_graph::{
	Driver, DriverSettings, ForceGraphCanvas, GraphData, GraphDocument, GraphEdge, GraphEvent,
	GraphNode, InitialLayout, ManualScheduler, PhysicsOverrides, PhysicsParams, Preset,
	RunStatus, RunToken, Scheduler, SimulationState, Snapshot, Theme, TickOutcome, TreeNode,
	Vec2, ViewTransform, Viewport,
};
pub use error::{LayoutError, LoadError};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("vizkit-graph: logging initialized");
}

/// Parses a graph document: `{ nodes, edges | links, preset?, physics? }`.
pub fn parse_graph_document(json: &str) -> Result<GraphDocument, LoadError> {
	Ok(serde_json::from_str(json)?)
}

/// Load the graph document from a script element with id="graph-data".
fn load_graph_document() -> Result<GraphDocument, LoadError> {
	let window: Window = web_sys::window().ok_or(LoadError::MissingElement("window"))?;
	let document = window
		.document()
		.ok_or(LoadError::MissingElement("document"))?;
	let script: HtmlScriptElement = document
		.get_element_by_id("graph-data")
		.and_then(|e| e.dyn_into().ok())
		.ok_or(LoadError::MissingElement("script#graph-data"))?;
	let json_text = script
		.text()
		.map_err(|_| LoadError::MissingElement("script#graph-data text"))?;

	let doc = parse_graph_document(&json_text)?;
	info!(
		"vizkit-graph: loaded {} nodes, {} edges ({:?} preset)",
		doc.data.nodes.len(),
		doc.data.edges.len(),
		doc.preset
	);
	Ok(doc)
}

/// Tooltip contents for the hovered node.
#[derive(Clone, Debug, PartialEq)]
struct Tooltip {
	label: String,
	x: f64,
	y: f64,
}

/// Main application component.
/// Loads the graph document from the DOM and renders the force-directed view.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let doc = load_graph_document().unwrap_or_else(|e| {
		warn!("vizkit-graph: {}", e);
		GraphDocument::default()
	});
	let GraphDocument {
		data,
		preset,
		physics,
	} = doc;
	let graph_signal = Signal::derive(move || data.clone());

	let (tooltip, set_tooltip) = signal(None::<Tooltip>);
	let (selected, set_selected) = signal(None::<String>);
	let on_event = Callback::new(move |event: GraphEvent| match event {
		GraphEvent::HoverEnter { label, x, y } => set_tooltip.set(Some(Tooltip { label, x, y })),
		GraphEvent::HoverLeave => set_tooltip.set(None),
		GraphEvent::NodeClick(id) => set_selected.set(Some(format!("node {id}"))),
		GraphEvent::EdgeClick(id) => set_selected.set(Some(format!("edge {id}"))),
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Graph Visualization" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=graph_signal
				preset=preset
				physics=physics
				fullscreen=true
				on_event=on_event
			/>
			<div class="graph-overlay">
				<h1>"Graph"</h1>
				<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
				<p class="selection">{move || selected.get().unwrap_or_default()}</p>
			</div>
			{move || {
				tooltip
					.get()
					.map(|t| {
						view! {
							<div
								class="graph-tooltip"
								style=format!("position: absolute; left: {}px; top: {}px;", t.x + 12.0, t.y + 12.0)
							>
								{t.label}
							</div>
						}
					})
			}}
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn invalid_document_is_a_json_error() {
		let err = parse_graph_document("{ nodes: ").unwrap_err();
		assert!(matches!(err, LoadError::Json(_)));
	}
}
