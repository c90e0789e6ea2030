//! Canvas rendering for the force graph.
//!
//! Draws whatever the driver currently holds; it never touches simulation
//! state. Passes, bottom to top:
//! 1. Background (screen space)
//! 2. Edge lines, arrowheads and edge labels (world space)
//! 3. Nodes, the hover ring and node labels (world space)

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::driver::{Driver, Scheduler};
use super::state::{SimNode, SimulationState};
use super::theme::Theme;

const LABEL_FONT_PX: f64 = 11.0;

/// Renders the complete graph to the canvas.
pub fn render<S: Scheduler>(
	driver: &Driver<S>,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	width: f64,
	height: f64,
) {
	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, width, height);

	let Some(state) = driver.state() else {
		draw_empty(ctx, theme, width, height);
		return;
	};

	let transform = driver.transform();
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);

	draw_edges(state, ctx, theme, transform.k);
	draw_nodes(state, ctx, theme, transform.k, driver.hovered());

	ctx.restore();
}

fn draw_empty(ctx: &CanvasRenderingContext2d, theme: &Theme, width: f64, height: f64) {
	ctx.set_fill_style_str(&theme.node.label_color.with_alpha(0.5).to_css());
	ctx.set_font("14px sans-serif");
	ctx.set_text_align("center");
	let _ = ctx.fill_text("No data", width / 2.0, height / 2.0);
	ctx.set_text_align("start");
}

fn draw_edges(state: &SimulationState, ctx: &CanvasRenderingContext2d, theme: &Theme, k: f64) {
	let style = &theme.edge;
	let color = style.color.to_css();
	ctx.set_stroke_style_str(&color);
	ctx.set_fill_style_str(&color);
	ctx.set_line_width(style.width / k);

	for (i, edge) in state.edges.iter().enumerate() {
		let g = state.edge_geometry(i);

		match style.dash {
			Some((dash, gap)) => {
				let _ = ctx.set_line_dash(&js_sys::Array::of2(
					&JsValue::from_f64(dash / k),
					&JsValue::from_f64(gap / k),
				));
			}
			None => {
				let _ = ctx.set_line_dash(&js_sys::Array::new());
			}
		}
		ctx.begin_path();
		ctx.move_to(g.start.x, g.start.y);
		ctx.line_to(g.end.x, g.end.y);
		ctx.stroke();

		if let Some(arrow) = g.arrow {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
			ctx.begin_path();
			ctx.move_to(arrow.tip.x, arrow.tip.y);
			ctx.line_to(arrow.left.x, arrow.left.y);
			ctx.line_to(arrow.right.x, arrow.right.y);
			ctx.close_path();
			ctx.fill();
		}

		if let Some(label) = &edge.label {
			ctx.set_fill_style_str(&style.label_color.to_css());
			ctx.set_font(&label_font(k));
			ctx.set_text_align("center");
			let _ = ctx.fill_text(label, g.label_anchor.x, g.label_anchor.y);
			ctx.set_text_align("start");
			ctx.set_fill_style_str(&color);
		}
	}

	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(
	state: &SimulationState,
	ctx: &CanvasRenderingContext2d,
	theme: &Theme,
	k: f64,
	hovered: Option<usize>,
) {
	for node in &state.nodes {
		draw_node(ctx, node, theme, k);
	}

	if let Some(node) = hovered.and_then(|i| state.nodes.get(i)) {
		let (x, y) = (node.position.x, node.position.y);
		ctx.begin_path();
		let _ = ctx.arc(x, y, node.radius + 3.0 / k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&theme.node.hover_ring.to_css());
		ctx.set_line_width(1.5 / k);
		ctx.stroke();
	}
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &SimNode, theme: &Theme, k: f64) {
	let (x, y, radius) = (node.position.x, node.position.y, node.radius);
	let base = theme.node_color(node.color.as_deref(), node.palette_slot);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match ctx
		.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
		.ok()
		.filter(|_| theme.node.use_gradient)
	{
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &base.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &base.to_css());
			let _ = gradient.add_color_stop(1.0, &base.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&base.to_css()),
	}
	ctx.fill();

	if theme.node.border_width > 0.0 {
		ctx.set_stroke_style_str(&theme.node.border_color.to_css());
		ctx.set_line_width(theme.node.border_width / k);
		ctx.stroke();
	}

	if let Some(label) = &node.label {
		ctx.set_fill_style_str(&theme.node.label_color.to_css());
		ctx.set_font(&label_font(k));
		let _ = ctx.fill_text(label, x + radius + 4.0 / k, y + 3.0 / k);
	}
}

/// Font string that keeps labels at a constant screen size.
fn label_font(k: f64) -> String {
	format!("{}px sans-serif", LABEL_FONT_PX / k.max(0.5))
}
