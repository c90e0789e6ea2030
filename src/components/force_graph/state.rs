//! Graph simulation state and interaction tracking.
//!
//! [`SimulationState`] is the single value the driver owns for one run: the
//! nodes with their positions and velocities, the edges resolved to node
//! indices, the viewport, and which node (if any) is held by a drag. Physics
//! and drag handling both mutate it through `&mut`, never concurrently.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, info};

use super::config::{DEFAULT_NODE_RADIUS, InitialLayout};
use super::geometry::{self, EdgeGeometry};
use super::types::GraphData;
use super::vector::Vec2;
use crate::error::LayoutError;

/// Fraction of the smaller viewport side used as the initial circle radius.
const CIRCLE_FRACTION: f64 = 0.35;

/// Size of the area nodes are laid out in, in simulation units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
	pub width: f64,
	pub height: f64,
}

impl Viewport {
	pub const fn new(width: f64, height: f64) -> Self {
		Self { width, height }
	}

	/// False until the container has been laid out with a real size.
	pub fn has_area(&self) -> bool {
		self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
	}

	pub fn center(&self) -> Vec2 {
		Vec2::new(self.width / 2.0, self.height / 2.0)
	}

	/// Moves `pos` so a circle of `radius` around it lies inside the viewport.
	/// When the viewport is narrower than the circle, centers it on that axis.
	pub fn clamp(&self, pos: Vec2, radius: f64) -> Vec2 {
		Vec2::new(
			clamp_axis(pos.x, radius, self.width),
			clamp_axis(pos.y, radius, self.height),
		)
	}
}

fn clamp_axis(value: f64, radius: f64, extent: f64) -> f64 {
	if extent <= 2.0 * radius || !value.is_finite() {
		extent / 2.0
	} else {
		value.clamp(radius, extent - radius)
	}
}

/// Pan and zoom transform applied to the entire graph view.
///
/// Maps simulation space to screen space as `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
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

impl ViewTransform {
	pub const MIN_ZOOM: f64 = 0.1;
	pub const MAX_ZOOM: f64 = 10.0;

	pub fn screen_to_graph(&self, screen: Vec2) -> Vec2 {
		Vec2::new((screen.x - self.x) / self.k, (screen.y - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, graph: Vec2) -> Vec2 {
		Vec2::new(graph.x * self.k + self.x, graph.y * self.k + self.y)
	}

	/// Scales by `factor` while keeping the graph point under `anchor`
	/// (screen space) fixed.
	pub fn zoom_at(&mut self, anchor: Vec2, factor: f64) {
		let new_k = (self.k * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
		let ratio = new_k / self.k;
		self.x = anchor.x - (anchor.x - self.x) * ratio;
		self.y = anchor.y - (anchor.y - self.y) * ratio;
		self.k = new_k;
	}
}

/// A node as the simulation sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	pub id: String,
	pub label: Option<String>,
	pub color: Option<String>,
	/// Palette index: shared by nodes of the same group.
	pub palette_slot: usize,
	pub radius: f64,
	pub position: Vec2,
	pub velocity: Vec2,
}

/// An edge whose endpoints were found among the nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct SimEdge {
	pub id: String,
	pub source: usize,
	pub target: usize,
	pub weight: f64,
	pub label: Option<String>,
	pub directed: bool,
}

/// Per-tick position of one node, as handed to the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeSnapshot {
	pub id: String,
	pub x: f64,
	pub y: f64,
	pub radius: f64,
}

/// Per-tick drawable geometry of one edge.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSnapshot {
	pub id: String,
	pub geometry: EdgeGeometry,
}

/// Everything the renderer needs for one frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
	pub nodes: Vec<NodeSnapshot>,
	pub edges: Vec<EdgeSnapshot>,
}

/// Core graph state for one simulation run.
#[derive(Clone, Debug)]
pub struct SimulationState {
	pub nodes: Vec<SimNode>,
	pub edges: Vec<SimEdge>,
	viewport: Viewport,
	index: HashMap<String, usize>,
	/// Node indices sorted by id; forces are summed in this order.
	order: Vec<usize>,
	/// Position of each node in `order`.
	rank: Vec<usize>,
	dragged: Option<usize>,
}

impl SimulationState {
	/// Builds node and edge state from caller data.
	///
	/// Nodes get starting positions from `layout` and zero velocity. Edges
	/// naming an unknown node are dropped. Repeated node ids keep their first
	/// occurrence.
	pub fn new(
		data: &GraphData,
		viewport: Viewport,
		layout: InitialLayout,
	) -> Result<Self, LayoutError> {
		if data.nodes.is_empty() {
			return Err(LayoutError::EmptyGraph);
		}
		if !viewport.has_area() {
			return Err(LayoutError::ZeroViewport {
				width: viewport.width,
				height: viewport.height,
			});
		}

		let mut index = HashMap::with_capacity(data.nodes.len());
		let mut groups: HashMap<&str, usize> = HashMap::new();
		let mut nodes = Vec::with_capacity(data.nodes.len());

		for node in &data.nodes {
			if index.contains_key(&node.id) {
				debug!("graph: duplicate node id {:?} ignored", node.id);
				continue;
			}
			let palette_slot = match &node.group {
				Some(group) => {
					let next = groups.len();
					*groups.entry(group.as_str()).or_insert(next)
				}
				None => nodes.len(),
			};
			let radius = node
				.radius
				.filter(|r| r.is_finite() && *r > 0.0)
				.unwrap_or(DEFAULT_NODE_RADIUS);

			index.insert(node.id.clone(), nodes.len());
			nodes.push(SimNode {
				id: node.id.clone(),
				label: node.label.clone(),
				color: node.color.clone(),
				palette_slot,
				radius,
				position: Vec2::ZERO,
				velocity: Vec2::ZERO,
			});
		}

		let count = nodes.len();
		for (i, node) in nodes.iter_mut().enumerate() {
			let start = initial_position(layout, i, count, viewport, node.radius);
			node.position = viewport.clamp(start, node.radius);
		}

		let mut edges = Vec::with_capacity(data.edges.len());
		for edge in &data.edges {
			match (index.get(&edge.source), index.get(&edge.target)) {
				(Some(&source), Some(&target)) => edges.push(SimEdge {
					id: edge.resolved_id(),
					source,
					target,
					weight: spring_weight(edge.weight),
					label: edge.label.clone(),
					directed: edge.directed,
				}),
				_ => debug!(
					"graph: skipping edge {} -> {} with unknown endpoint",
					edge.source, edge.target
				),
			}
		}

		info!(
			"graph: initialized {} nodes, {} edges in {}x{}",
			nodes.len(),
			edges.len(),
			viewport.width,
			viewport.height
		);

		let mut order: Vec<usize> = (0..nodes.len()).collect();
		order.sort_by(|&a, &b| nodes[a].id.cmp(&nodes[b].id));
		let mut rank = vec![0; nodes.len()];
		for (r, &i) in order.iter().enumerate() {
			rank[i] = r;
		}

		Ok(Self {
			nodes,
			edges,
			viewport,
			index,
			order,
			rank,
			dragged: None,
		})
	}

	pub fn viewport(&self) -> Viewport {
		self.viewport
	}

	pub fn node_index(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	pub fn node(&self, id: &str) -> Option<&SimNode> {
		self.node_index(id).map(|i| &self.nodes[i])
	}

	/// Node indices in id order, independent of input order.
	pub fn force_order(&self) -> &[usize] {
		&self.order
	}

	/// Position of node `idx` within [`force_order`](Self::force_order).
	pub fn rank(&self, idx: usize) -> usize {
		self.rank[idx]
	}

	/// Index of the node currently held by a drag.
	pub fn dragged(&self) -> Option<usize> {
		self.dragged
	}

	pub fn is_dragging(&self) -> bool {
		self.dragged.is_some()
	}

	/// Hands the node at `idx` to the drag controller: the integrator skips it
	/// until [`release`](Self::release).
	pub fn pin(&mut self, idx: usize) {
		if let Some(node) = self.nodes.get_mut(idx) {
			node.velocity = Vec2::ZERO;
			self.dragged = Some(idx);
		}
	}

	pub fn release(&mut self) {
		self.dragged = None;
	}

	/// Writes a position directly, bypassing the integrator. The position is
	/// clamped into the viewport and the node's velocity cleared.
	pub fn place(&mut self, idx: usize, pos: Vec2) {
		let viewport = self.viewport;
		if let Some(node) = self.nodes.get_mut(idx) {
			if pos.is_finite() {
				node.position = viewport.clamp(pos, node.radius);
			}
			node.velocity = Vec2::ZERO;
		}
	}

	/// Topmost node whose circle contains `point` (simulation space).
	/// Later nodes are drawn above earlier ones, so they win.
	pub fn node_at(&self, point: Vec2) -> Option<usize> {
		self.nodes
			.iter()
			.rposition(|node| node.position.distance(point) <= node.radius)
	}

	/// Nearest edge within `tolerance` of `point` (simulation space).
	pub fn edge_at(&self, point: Vec2, tolerance: f64) -> Option<usize> {
		(0..self.edges.len())
			.map(|i| (i, geometry::distance_to_segment(point, self.edge_segment(i))))
			.filter(|(_, d)| *d <= tolerance)
			.min_by(|a, b| a.1.total_cmp(&b.1))
			.map(|(i, _)| i)
	}

	fn edge_segment(&self, idx: usize) -> (Vec2, Vec2) {
		let g = self.edge_geometry(idx);
		(g.start, g.end)
	}

	/// Drawable geometry of the edge at `idx`, from current positions.
	pub fn edge_geometry(&self, idx: usize) -> EdgeGeometry {
		let edge = &self.edges[idx];
		let (source, target) = (&self.nodes[edge.source], &self.nodes[edge.target]);
		geometry::edge_geometry(
			source.position,
			source.radius,
			target.position,
			target.radius,
			edge.directed,
		)
	}

	pub fn snapshot(&self) -> Snapshot {
		Snapshot {
			nodes: self
				.nodes
				.iter()
				.map(|n| NodeSnapshot {
					id: n.id.clone(),
					x: n.position.x,
					y: n.position.y,
					radius: n.radius,
				})
				.collect(),
			edges: (0..self.edges.len())
				.map(|i| EdgeSnapshot {
					id: self.edges[i].id.clone(),
					geometry: self.edge_geometry(i),
				})
				.collect(),
		}
	}
}

/// Spring multiplier for an edge. Weights live in `(0, 1]`: larger values are
/// capped at 1 and missing, non-positive or non-finite ones count as 1.
fn spring_weight(weight: Option<f64>) -> f64 {
	match weight {
		Some(w) if w.is_finite() && w > 0.0 => w.min(1.0),
		_ => 1.0,
	}
}

fn initial_position(
	layout: InitialLayout,
	i: usize,
	count: usize,
	viewport: Viewport,
	radius: f64,
) -> Vec2 {
	match layout {
		InitialLayout::Circular => {
			if count == 1 {
				return viewport.center();
			}
			let angle = (i as f64) * 2.0 * PI / count as f64;
			let ring = viewport.width.min(viewport.height) * CIRCLE_FRACTION;
			viewport.center() + Vec2::from_angle(angle) * ring
		}
		InitialLayout::Random { seed } => {
			let s = seed as f64 + i as f64 * 1.618;
			Vec2::new(
				radius + pseudo_random(s * 1.1) * (viewport.width - 2.0 * radius),
				radius + pseudo_random(s * 2.3) * (viewport.height - 2.0 * radius),
			)
		}
	}
}

/// Deterministic hash of `seed` into `[0, 1)`.
fn pseudo_random(seed: f64) -> f64 {
	let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
	x - x.floor()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphEdge, GraphNode};
	use pretty_assertions::assert_eq;

	fn ring(n: usize) -> GraphData {
		GraphData {
			nodes: (0..n).map(|i| GraphNode::new(format!("n{i}"))).collect(),
			edges: (0..n)
				.map(|i| GraphEdge::new(format!("n{i}"), format!("n{}", (i + 1) % n)))
				.collect(),
		}
	}

	#[test]
	fn circular_layout_is_deterministic_and_centered() {
		let viewport = Viewport::new(400.0, 300.0);
		let a = SimulationState::new(&ring(4), viewport, InitialLayout::Circular).unwrap();
		let b = SimulationState::new(&ring(4), viewport, InitialLayout::Circular).unwrap();
		assert_eq!(a.snapshot(), b.snapshot());

		let first = a.nodes[0].position;
		assert_eq!(first, Vec2::new(200.0 + 300.0 * CIRCLE_FRACTION, 150.0));
		assert!(a.nodes.iter().all(|n| n.velocity == Vec2::ZERO));
	}

	#[test]
	fn spring_weights_are_capped_to_unit_range() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
			edges: vec![
				GraphEdge::new("a", "b").with_weight(0.25),
				GraphEdge::new("a", "b").with_weight(50.0),
				GraphEdge::new("a", "b").with_weight(-5.0),
				GraphEdge::new("a", "b").with_weight(0.0),
				GraphEdge::new("a", "b").with_weight(f64::INFINITY),
				GraphEdge::new("a", "b"),
			],
		};
		let state =
			SimulationState::new(&data, Viewport::new(100.0, 100.0), InitialLayout::Circular)
				.unwrap();
		let weights: Vec<f64> = state.edges.iter().map(|e| e.weight).collect();
		assert_eq!(weights, vec![0.25, 1.0, 1.0, 1.0, 1.0, 1.0]);
	}

	#[test]
	fn force_order_follows_ids_not_input_order() {
		let data = GraphData {
			nodes: ["c", "a", "b"].into_iter().map(GraphNode::new).collect(),
			edges: vec![],
		};
		let state =
			SimulationState::new(&data, Viewport::new(100.0, 100.0), InitialLayout::Circular)
				.unwrap();
		assert_eq!(state.force_order(), &[1, 2, 0]);
		assert_eq!((state.rank(0), state.rank(1), state.rank(2)), (2, 0, 1));
	}

	#[test]
	fn random_layout_stays_inside_viewport() {
		let viewport = Viewport::new(120.0, 80.0);
		let state =
			SimulationState::new(&ring(30), viewport, InitialLayout::Random { seed: 7 }).unwrap();
		for node in &state.nodes {
			assert!(node.position.x >= node.radius && node.position.x <= 120.0 - node.radius);
			assert!(node.position.y >= node.radius && node.position.y <= 80.0 - node.radius);
		}
	}

	#[test]
	fn rejects_empty_graph_and_zero_viewport() {
		let err = SimulationState::new(
			&GraphData::default(),
			Viewport::new(10.0, 10.0),
			InitialLayout::Circular,
		)
		.unwrap_err();
		assert_eq!(err, LayoutError::EmptyGraph);

		let err = SimulationState::new(&ring(2), Viewport::new(0.0, 10.0), InitialLayout::Circular)
			.unwrap_err();
		assert!(matches!(err, LayoutError::ZeroViewport { .. }));
	}

	#[test]
	fn groups_share_a_palette_slot() {
		let mut data = ring(3);
		data.nodes[0].group = Some("core".into());
		data.nodes[2].group = Some("core".into());
		let state =
			SimulationState::new(&data, Viewport::new(100.0, 100.0), InitialLayout::Circular)
				.unwrap();
		assert_eq!(state.nodes[0].palette_slot, state.nodes[2].palette_slot);
	}

	#[test]
	fn explicit_radius_is_kept() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a").with_radius(20.0), GraphNode::new("b")],
			edges: vec![],
		};
		let state =
			SimulationState::new(&data, Viewport::new(200.0, 200.0), InitialLayout::Circular)
				.unwrap();
		assert_eq!(state.nodes[0].radius, 20.0);
		assert_eq!(state.nodes[1].radius, DEFAULT_NODE_RADIUS);
	}

	#[test]
	fn hit_tests_nodes_and_edges() {
		let data = GraphData {
			nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
			edges: vec![GraphEdge::new("a", "b")],
		};
		let mut state =
			SimulationState::new(&data, Viewport::new(200.0, 200.0), InitialLayout::Circular)
				.unwrap();
		state.place(0, Vec2::new(50.0, 100.0));
		state.place(1, Vec2::new(150.0, 100.0));

		assert_eq!(state.node_at(Vec2::new(52.0, 98.0)), Some(0));
		assert_eq!(state.node_at(Vec2::new(100.0, 150.0)), None);
		assert_eq!(state.edge_at(Vec2::new(100.0, 102.0), 4.0), Some(0));
		assert_eq!(state.edge_at(Vec2::new(100.0, 120.0), 4.0), None);
	}

	#[test]
	fn place_clamps_into_viewport() {
		let mut state =
			SimulationState::new(&ring(2), Viewport::new(100.0, 100.0), InitialLayout::Circular)
				.unwrap();
		state.place(0, Vec2::new(-40.0, 500.0));
		assert_eq!(state.nodes[0].position, Vec2::new(8.0, 92.0));
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut transform = ViewTransform::default();
		let anchor = Vec2::new(120.0, 80.0);
		let before = transform.screen_to_graph(anchor);
		transform.zoom_at(anchor, 2.0);
		assert_eq!(transform.screen_to_graph(anchor), before);
		assert_eq!(transform.graph_to_screen(before), anchor);
	}
}
