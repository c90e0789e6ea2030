//! Pointer interaction: dragging nodes, telling clicks from drags, and
//! hover tracking.
//!
//! The host routes raw pointer input here; nothing in this module knows
//! about DOM listeners.

use super::vector::Vec2;

/// Events reported to the embedding application.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphEvent {
	/// A node was pressed and released without being moved.
	NodeClick(String),
	/// An edge was clicked.
	EdgeClick(String),
	/// The pointer entered a node. Position is in screen space.
	HoverEnter { label: String, x: f64, y: f64 },
	/// The pointer left the hovered node.
	HoverLeave,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum DragPhase {
	#[default]
	Idle,
	Dragging {
		node: usize,
		origin: Vec2,
		moved: bool,
	},
}

/// Outcome of releasing a drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragRelease {
	pub node: usize,
	/// True when the pointer never left the click tolerance.
	pub clicked: bool,
}

/// Two-state drag machine: idle, or dragging one node.
///
/// Pointer positions are in screen space; the tolerance that separates a
/// click from a drag is measured there too, so it does not change with zoom.
#[derive(Clone, Debug, Default)]
pub struct DragController {
	phase: DragPhase,
	click_tolerance: f64,
}

impl DragController {
	pub fn new(click_tolerance: f64) -> Self {
		Self {
			phase: DragPhase::Idle,
			click_tolerance,
		}
	}

	pub fn is_dragging(&self) -> bool {
		matches!(self.phase, DragPhase::Dragging { .. })
	}

	/// Node currently being dragged.
	pub fn node(&self) -> Option<usize> {
		match self.phase {
			DragPhase::Dragging { node, .. } => Some(node),
			DragPhase::Idle => None,
		}
	}

	/// Begins dragging `node`. Ignored while another drag is in progress.
	pub fn start(&mut self, node: usize, pointer: Vec2) -> bool {
		if self.is_dragging() {
			return false;
		}
		self.phase = DragPhase::Dragging {
			node,
			origin: pointer,
			moved: false,
		};
		true
	}

	/// Records pointer travel and returns the node that should follow it.
	pub fn move_to(&mut self, pointer: Vec2) -> Option<usize> {
		match &mut self.phase {
			DragPhase::Dragging {
				node,
				origin,
				moved,
			} => {
				if !*moved && origin.distance(pointer) > self.click_tolerance {
					*moved = true;
				}
				Some(*node)
			}
			DragPhase::Idle => None,
		}
	}

	/// Ends the drag, reporting whether it was really a click.
	pub fn end(&mut self) -> Option<DragRelease> {
		match std::mem::take(&mut self.phase) {
			DragPhase::Dragging { node, moved, .. } => Some(DragRelease {
				node,
				clicked: !moved,
			}),
			DragPhase::Idle => None,
		}
	}

	/// Drops any drag without reporting it, e.g. when the graph is replaced.
	pub fn cancel(&mut self) {
		self.phase = DragPhase::Idle;
	}
}

/// Change of hovered node produced by [`HoverTracker::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverChange {
	Enter(usize),
	/// Pointer moved from one node straight onto another.
	Switch { from: usize, to: usize },
	Leave(usize),
}

/// Remembers the hovered node so enter/leave fire once per transition.
#[derive(Clone, Debug, Default)]
pub struct HoverTracker {
	hovered: Option<usize>,
}

impl HoverTracker {
	pub fn hovered(&self) -> Option<usize> {
		self.hovered
	}

	pub fn update(&mut self, hit: Option<usize>) -> Option<HoverChange> {
		let previous = std::mem::replace(&mut self.hovered, hit);
		match (previous, hit) {
			(None, Some(to)) => Some(HoverChange::Enter(to)),
			(Some(from), None) => Some(HoverChange::Leave(from)),
			(Some(from), Some(to)) if from != to => Some(HoverChange::Switch { from, to }),
			_ => None,
		}
	}

	pub fn clear(&mut self) -> Option<HoverChange> {
		self.update(None)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn press_and_release_in_place_is_a_click() {
		let mut drag = DragController::new(3.0);
		assert!(drag.start(2, Vec2::new(10.0, 10.0)));
		assert_eq!(drag.move_to(Vec2::new(11.0, 11.0)), Some(2));
		assert_eq!(
			drag.end(),
			Some(DragRelease {
				node: 2,
				clicked: true
			})
		);
		assert!(!drag.is_dragging());
	}

	#[test]
	fn moving_past_tolerance_is_a_drag() {
		let mut drag = DragController::new(3.0);
		drag.start(0, Vec2::ZERO);
		drag.move_to(Vec2::new(20.0, 0.0));
		drag.move_to(Vec2::ZERO);
		assert_eq!(drag.end().map(|r| r.clicked), Some(false));
	}

	#[test]
	fn second_start_is_ignored() {
		let mut drag = DragController::new(3.0);
		assert!(drag.start(0, Vec2::ZERO));
		assert!(!drag.start(1, Vec2::ZERO));
		assert_eq!(drag.node(), Some(0));
	}

	#[test]
	fn idle_controller_ignores_moves_and_releases() {
		let mut drag = DragController::new(3.0);
		assert_eq!(drag.move_to(Vec2::ZERO), None);
		assert_eq!(drag.end(), None);
	}

	#[test]
	fn hover_reports_each_transition_once() {
		let mut hover = HoverTracker::default();
		assert_eq!(hover.update(Some(1)), Some(HoverChange::Enter(1)));
		assert_eq!(hover.update(Some(1)), None);
		assert_eq!(
			hover.update(Some(4)),
			Some(HoverChange::Switch { from: 1, to: 4 })
		);
		assert_eq!(hover.clear(), Some(HoverChange::Leave(4)));
		assert_eq!(hover.clear(), None);
	}
}
