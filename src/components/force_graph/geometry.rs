//! Edge line and arrowhead geometry.
//!
//! Pure functions of two node positions: the renderer calls them every frame
//! and gets identical output for identical input.

use super::vector::Vec2;

/// Length of an arrowhead along the edge, in simulation units.
pub const ARROW_SIZE: f64 = 6.0;

/// Distance of an edge label from the edge line.
pub const LABEL_OFFSET: f64 = 6.0;

/// Triangle drawn at the target end of a directed edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arrowhead {
	/// Point touching the target node's boundary.
	pub tip: Vec2,
	/// Base corners of the triangle.
	pub left: Vec2,
	pub right: Vec2,
	/// Direction of the edge at the tip, in degrees clockwise from +x
	/// (screen space, y down).
	pub angle_deg: f64,
}

impl Arrowhead {
	/// SVG `transform` placing an arrow glyph drawn along +x with its tip at
	/// the origin.
	pub fn transform(&self) -> String {
		format!(
			"translate({},{}) rotate({})",
			self.tip.x, self.tip.y, self.angle_deg
		)
	}
}

/// Drawable geometry of one edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeGeometry {
	pub start: Vec2,
	pub end: Vec2,
	pub arrow: Option<Arrowhead>,
	/// Where the edge label goes: the midpoint, nudged off the line.
	pub label_anchor: Vec2,
}

impl EdgeGeometry {
	/// SVG path data for the edge line.
	pub fn path(&self) -> String {
		format!(
			"M{},{} L{},{}",
			self.start.x, self.start.y, self.end.x, self.end.y
		)
	}
}

/// Computes the line between two nodes, trimmed to their boundaries.
///
/// Undirected edges run from boundary to boundary. Directed edges stop short
/// of the target by [`ARROW_SIZE`] so that the arrowhead, whose tip sits on
/// the target boundary, covers the gap. Coincident centers give a zero-length
/// line pointing along +x.
pub fn edge_geometry(
	source: Vec2,
	source_radius: f64,
	target: Vec2,
	target_radius: f64,
	directed: bool,
) -> EdgeGeometry {
	let dir = (target - source).normalized_or(Vec2::new(1.0, 0.0));
	let start = source + dir * source_radius;
	let label_anchor = source.midpoint(target) + dir.perpendicular() * LABEL_OFFSET;

	if !directed {
		return EdgeGeometry {
			start,
			end: target - dir * target_radius,
			arrow: None,
			label_anchor,
		};
	}

	let tip = target - dir * target_radius;
	let end = tip - dir * ARROW_SIZE;
	let half_width = dir.perpendicular() * (ARROW_SIZE * 0.5);

	EdgeGeometry {
		start,
		end,
		arrow: Some(Arrowhead {
			tip,
			left: end + half_width,
			right: end - half_width,
			angle_deg: dir.y.atan2(dir.x).to_degrees(),
		}),
		label_anchor,
	}
}

/// Shortest distance from `point` to the segment `(a, b)`.
pub fn distance_to_segment(point: Vec2, (a, b): (Vec2, Vec2)) -> f64 {
	let ab = b - a;
	let len_sq = ab.length_squared();
	if len_sq < f64::EPSILON {
		return point.distance(a);
	}
	let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
	point.distance(a + ab * t)
}
