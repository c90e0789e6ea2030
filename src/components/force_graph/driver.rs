//! Simulation driver: owns the state of one run, decides when to keep
//! ticking, and routes pointer input.
//!
//! The driver never loops by itself. Each tick ends by asking a
//! [`Scheduler`] for another callback, so the host (an animation frame loop
//! in the browser, a plain loop in tests) decides when ticks happen. Every
//! request carries a [`RunToken`]; starting, stopping or reloading bumps the
//! generation, so a callback that was already queued for an older run finds
//! its token stale and does nothing.

use log::debug;

use super::config::{DriverSettings, PhysicsParams};
use super::interaction::{DragController, GraphEvent, HoverChange, HoverTracker};
use super::physics;
use super::state::{SimulationState, Snapshot, ViewTransform, Viewport};
use super::types::GraphData;
use super::vector::Vec2;
use crate::error::LayoutError;

/// Identifies the run a scheduled tick belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunToken(u64);

/// Host-side timer the driver asks for its next tick.
pub trait Scheduler {
	/// Requests one later call to [`Driver::on_tick`] with `token`.
	fn schedule(&mut self, token: RunToken);
	/// Withdraws any requested call that has not run yet.
	fn cancel(&mut self);
}

/// Scheduler that only records the pending request. The host, or a test,
/// delivers it by calling [`Driver::run_pending`].
#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
	pending: Option<RunToken>,
	cancellations: usize,
}

impl ManualScheduler {
	pub fn pending(&self) -> Option<RunToken> {
		self.pending
	}

	pub fn take(&mut self) -> Option<RunToken> {
		self.pending.take()
	}

	/// Number of times a request was withdrawn.
	pub fn cancellations(&self) -> usize {
		self.cancellations
	}
}

impl Scheduler for ManualScheduler {
	fn schedule(&mut self, token: RunToken) {
		self.pending = Some(token);
	}

	fn cancel(&mut self) {
		if self.pending.take().is_some() {
			self.cancellations += 1;
		}
	}
}

/// Result of delivering one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
	/// Stepped, and another tick was scheduled.
	Continue,
	/// Stepped, and the layout is at rest; nothing was scheduled.
	Settled,
	/// The token belongs to an earlier run. Nothing changed.
	Stale,
}

/// Coarse lifecycle of the driver, for choosing what the host displays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
	/// No nodes to lay out.
	Empty,
	/// Waiting for a viewport with a non-zero size.
	Deferred,
	Running,
	Idle,
}

/// Owns one force-directed layout and everything that mutates it.
pub struct Driver<S: Scheduler> {
	scheduler: S,
	settings: DriverSettings,
	params: PhysicsParams,
	graph: GraphData,
	viewport: Viewport,
	state: Option<SimulationState>,
	transform: ViewTransform,
	drag: DragController,
	hover: HoverTracker,
	generation: u64,
	running: bool,
	started_at: f64,
	last_movement: f64,
	ticks: u64,
}

impl<S: Scheduler> Driver<S> {
	pub fn new(scheduler: S, params: PhysicsParams, settings: DriverSettings) -> Self {
		Self {
			scheduler,
			drag: DragController::new(settings.click_tolerance),
			settings,
			params,
			graph: GraphData::default(),
			viewport: Viewport::default(),
			state: None,
			transform: ViewTransform::default(),
			hover: HoverTracker::default(),
			generation: 0,
			running: false,
			started_at: 0.0,
			last_movement: 0.0,
			ticks: 0,
		}
	}

	pub fn scheduler(&self) -> &S {
		&self.scheduler
	}

	pub fn scheduler_mut(&mut self) -> &mut S {
		&mut self.scheduler
	}

	pub fn state(&self) -> Option<&SimulationState> {
		self.state.as_ref()
	}

	pub fn state_mut(&mut self) -> Option<&mut SimulationState> {
		self.state.as_mut()
	}

	pub fn params(&self) -> &PhysicsParams {
		&self.params
	}

	pub fn settings(&self) -> &DriverSettings {
		&self.settings
	}

	pub fn transform(&self) -> &ViewTransform {
		&self.transform
	}

	pub fn transform_mut(&mut self) -> &mut ViewTransform {
		&mut self.transform
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.is_dragging()
	}

	/// Summed node displacement of the most recent tick.
	pub fn last_movement(&self) -> f64 {
		self.last_movement
	}

	/// Ticks stepped since the current layout was initialized.
	pub fn tick_count(&self) -> u64 {
		self.ticks
	}

	pub fn status(&self) -> RunStatus {
		match (&self.state, self.running) {
			(None, _) if self.graph.is_empty() => RunStatus::Empty,
			(None, _) => RunStatus::Deferred,
			(Some(_), true) => RunStatus::Running,
			(Some(_), false) => RunStatus::Idle,
		}
	}

	/// Replaces the graph and lays it out from scratch.
	///
	/// An empty graph or a zero-sized viewport leaves the driver without a
	/// simulation; for the latter, the next [`resize`](Self::resize) to a
	/// real size initializes it.
	pub fn load(&mut self, data: GraphData, now: f64) -> Result<(), LayoutError> {
		self.graph = data;
		self.reinitialize(now)
	}

	/// Records a new viewport size. A change re-lays out the current graph.
	pub fn resize(&mut self, viewport: Viewport, now: f64) -> Result<(), LayoutError> {
		if viewport == self.viewport && self.state.is_some() {
			return Ok(());
		}
		self.viewport = viewport;
		self.reinitialize(now)
	}

	/// Swaps the physics coefficients and restarts the run with the current
	/// positions.
	pub fn set_params(&mut self, params: PhysicsParams, now: f64) {
		self.params = params;
		self.start(now);
	}

	fn reinitialize(&mut self, now: f64) -> Result<(), LayoutError> {
		self.stop();
		self.drag.cancel();
		self.hover.clear();
		self.state = None;
		self.ticks = 0;
		self.last_movement = 0.0;

		let state = SimulationState::new(&self.graph, self.viewport, self.settings.layout)?;
		self.state = Some(state);
		self.start(now);
		Ok(())
	}

	/// Begins a fresh run at `now`, invalidating any tick already queued.
	/// Does nothing when there is no simulation.
	pub fn start(&mut self, now: f64) {
		if self.state.is_none() {
			return;
		}
		self.scheduler.cancel();
		self.generation += 1;
		self.running = true;
		self.started_at = now;
		self.scheduler.schedule(RunToken(self.generation));
	}

	/// Stops ticking and invalidates any tick already queued.
	pub fn stop(&mut self) {
		self.scheduler.cancel();
		self.generation += 1;
		self.running = false;
	}

	/// Tears the driver down for good: cancels the queued tick, drops any
	/// drag or hover, and discards the graph. Ticks delivered afterwards are
	/// stale.
	pub fn shutdown(&mut self) {
		self.stop();
		self.drag.cancel();
		self.hover.clear();
		self.state = None;
		self.graph = GraphData::default();
		debug!("graph: driver shut down");
	}

	/// Delivers one scheduled tick.
	///
	/// Keeps scheduling while a node is dragged, while the run is younger
	/// than the minimum run time, or while the tick moved nodes by more than
	/// the stability threshold in total.
	pub fn on_tick(&mut self, token: RunToken, now: f64) -> TickOutcome {
		if token != RunToken(self.generation) || !self.running {
			debug!("graph: ignoring stale tick {:?}", token);
			return TickOutcome::Stale;
		}
		let Some(state) = self.state.as_mut() else {
			self.running = false;
			return TickOutcome::Stale;
		};

		let movement = physics::step(state, &self.params);
		self.last_movement = movement;
		self.ticks += 1;

		let young = now - self.started_at < self.settings.min_run_ms;
		if state.is_dragging() || young || movement > self.settings.stability_threshold {
			self.scheduler.schedule(token);
			TickOutcome::Continue
		} else {
			self.running = false;
			debug!(
				"graph: settled after {} ticks (movement {:.4})",
				self.ticks, movement
			);
			TickOutcome::Settled
		}
	}

	pub fn snapshot(&self) -> Snapshot {
		self.state
			.as_ref()
			.map(SimulationState::snapshot)
			.unwrap_or_default()
	}

	/// Id of the node under `screen`, if any.
	pub fn node_at(&self, screen: Vec2) -> Option<&str> {
		let state = self.state.as_ref()?;
		let idx = state.node_at(self.transform.screen_to_graph(screen))?;
		Some(state.nodes[idx].id.as_str())
	}

	/// Id of the edge under `screen`, if any.
	pub fn edge_at(&self, screen: Vec2) -> Option<&str> {
		let state = self.state.as_ref()?;
		let point = self.transform.screen_to_graph(screen);
		let tolerance = self.settings.edge_hit_tolerance / self.transform.k;
		let idx = state.edge_at(point, tolerance)?;
		Some(state.edges[idx].id.as_str())
	}

	/// Pointer pressed at `screen`: starts dragging the node there, if any.
	pub fn pointer_down(&mut self, screen: Vec2, now: f64) -> bool {
		match self.node_at(screen).map(str::to_owned) {
			Some(id) => self.on_drag_start(&id, screen, now),
			None => false,
		}
	}

	/// Hands node `id` to the drag controller. The physics keeps running so
	/// the other nodes react to it.
	pub fn on_drag_start(&mut self, id: &str, pointer: Vec2, now: f64) -> bool {
		let Some(state) = self.state.as_mut() else {
			return false;
		};
		let Some(idx) = state.node_index(id) else {
			return false;
		};
		if !self.drag.start(idx, pointer) {
			return false;
		}
		state.pin(idx);
		if !self.running {
			self.start(now);
		}
		true
	}

	/// Moves the dragged node to the pointer, converted to simulation space.
	pub fn on_drag_move(&mut self, pointer: Vec2) -> bool {
		let Some(idx) = self.drag.move_to(pointer) else {
			return false;
		};
		let target = self.transform.screen_to_graph(pointer);
		if let Some(state) = self.state.as_mut() {
			state.place(idx, target);
		}
		true
	}

	/// Releases the dragged node back to the physics and restarts ticking.
	/// Returns a click event when the pointer never really moved.
	pub fn on_drag_end(&mut self, now: f64) -> Option<GraphEvent> {
		let release = self.drag.end()?;
		let state = self.state.as_mut()?;
		state.release();
		let id = state.nodes.get(release.node).map(|n| n.id.clone());
		self.start(now);
		if release.clicked {
			id.map(GraphEvent::NodeClick)
		} else {
			None
		}
	}

	/// A click that did not land on a node: reports the edge under it.
	pub fn background_click(&self, screen: Vec2) -> Option<GraphEvent> {
		self.edge_at(screen)
			.map(|id| GraphEvent::EdgeClick(id.to_owned()))
	}

	/// Tracks the node under the pointer and reports enter/leave
	/// transitions. Hover is frozen while dragging.
	pub fn hover(&mut self, screen: Vec2) -> Vec<GraphEvent> {
		if self.drag.is_dragging() {
			return Vec::new();
		}
		let hit = self
			.state
			.as_ref()
			.and_then(|s| s.node_at(self.transform.screen_to_graph(screen)));
		let change = self.hover.update(hit);
		self.hover_events(change, screen)
	}

	/// Pointer left the view.
	pub fn pointer_leave(&mut self) -> Vec<GraphEvent> {
		let change = self.hover.clear();
		self.hover_events(change, Vec2::ZERO)
	}

	/// Index of the hovered node, for highlighting.
	pub fn hovered(&self) -> Option<usize> {
		self.hover.hovered()
	}

	fn hover_events(&self, change: Option<HoverChange>, screen: Vec2) -> Vec<GraphEvent> {
		let enter = |idx: usize| {
			let node = self.state.as_ref().and_then(|s| s.nodes.get(idx));
			GraphEvent::HoverEnter {
				label: node
					.map(|n| n.label.clone().unwrap_or_else(|| n.id.clone()))
					.unwrap_or_default(),
				x: screen.x,
				y: screen.y,
			}
		};
		match change {
			Some(HoverChange::Enter(to)) => vec![enter(to)],
			Some(HoverChange::Switch { to, .. }) => vec![GraphEvent::HoverLeave, enter(to)],
			Some(HoverChange::Leave(_)) => vec![GraphEvent::HoverLeave],
			None => Vec::new(),
		}
	}
}

impl Driver<ManualScheduler> {
	/// Delivers the pending tick, if one was requested.
	pub fn run_pending(&mut self, now: f64) -> Option<TickOutcome> {
		let token = self.scheduler.take()?;
		Some(self.on_tick(token, now))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::types::{GraphEdge, GraphNode};
	use pretty_assertions::assert_eq;

	fn triangle() -> GraphData {
		GraphData {
			nodes: vec![
				GraphNode::new("a").with_label("Alpha"),
				GraphNode::new("b"),
				GraphNode::new("c"),
			],
			edges: vec![
				GraphEdge::new("a", "b"),
				GraphEdge::new("b", "c"),
				GraphEdge::new("c", "a"),
			],
		}
	}

	fn driver() -> Driver<ManualScheduler> {
		let mut driver = Driver::new(
			ManualScheduler::default(),
			PhysicsParams::default(),
			DriverSettings::default(),
		);
		driver.resize(Viewport::new(400.0, 300.0), 0.0).unwrap_err();
		driver
	}

	#[test]
	fn deferred_until_viewport_has_area() {
		let mut driver = driver();
		assert_eq!(driver.status(), RunStatus::Empty);
		let err = Driver::new(
			ManualScheduler::default(),
			PhysicsParams::default(),
			DriverSettings::default(),
		)
		.load(triangle(), 0.0)
		.unwrap_err();
		assert!(matches!(err, LayoutError::ZeroViewport { .. }));

		driver.load(triangle(), 0.0).unwrap();
		assert_eq!(driver.status(), RunStatus::Running);
		assert!(driver.scheduler().pending().is_some());
	}

	#[test]
	fn empty_graph_never_schedules() {
		let mut driver = driver();
		assert_eq!(driver.load(GraphData::default(), 0.0), Err(LayoutError::EmptyGraph));
		assert_eq!(driver.scheduler().pending(), None);
		assert_eq!(driver.snapshot(), Snapshot::default());
	}

	#[test]
	fn reload_invalidates_queued_tick() {
		let mut driver = driver();
		driver.load(triangle(), 0.0).unwrap();
		let old = driver.scheduler().pending().unwrap();

		driver.load(triangle(), 10.0).unwrap();
		assert_eq!(driver.scheduler().cancellations(), 1);
		assert_eq!(driver.on_tick(old, 20.0), TickOutcome::Stale);
		assert_eq!(driver.tick_count(), 0);
	}

	#[test]
	fn stop_cancels_and_ignores_late_ticks() {
		let mut driver = driver();
		driver.load(triangle(), 0.0).unwrap();
		let token = driver.scheduler().pending().unwrap();
		driver.stop();
		assert_eq!(driver.scheduler().pending(), None);
		assert_eq!(driver.on_tick(token, 16.0), TickOutcome::Stale);
		assert_eq!(driver.status(), RunStatus::Idle);
	}

	#[test]
	fn shutdown_mid_drag_cancels_the_queued_tick() {
		let mut driver = driver();
		driver.load(triangle(), 0.0).unwrap();
		assert!(driver.on_drag_start("b", Vec2::new(5.0, 5.0), 0.0));
		let token = driver.scheduler().pending().unwrap();

		driver.shutdown();

		assert_eq!(driver.scheduler().pending(), None);
		assert_eq!(driver.on_tick(token, 16.0), TickOutcome::Stale);
		assert!(!driver.is_dragging());
		assert_eq!(driver.hovered(), None);
		assert_eq!(driver.status(), RunStatus::Empty);
		assert_eq!(driver.on_drag_end(32.0), None);
	}

	#[test]
	fn keeps_ticking_during_minimum_run_time() {
		let still = PhysicsParams {
			gravity: 0.0,
			repulsion: 0.0,
			link_strength: 0.0,
			..PhysicsParams::default()
		};
		let mut driver = Driver::new(ManualScheduler::default(), still, DriverSettings::default());
		driver.resize(Viewport::new(400.0, 300.0), 0.0).unwrap_err();
		driver.load(triangle(), 0.0).unwrap();

		assert_eq!(driver.run_pending(1000.0), Some(TickOutcome::Continue));
		assert_eq!(driver.last_movement(), 0.0);
		assert_eq!(driver.run_pending(1999.0), Some(TickOutcome::Continue));
		assert_eq!(driver.run_pending(2000.0), Some(TickOutcome::Settled));
		assert_eq!(driver.run_pending(2016.0), None);
		assert_eq!(driver.status(), RunStatus::Idle);
	}

	#[test]
	fn click_without_movement_reports_node() {
		let mut driver = driver();
		driver.load(triangle(), 0.0).unwrap();
		let pos = driver.state().unwrap().nodes[0].position;

		assert!(driver.pointer_down(pos, 5.0));
		assert!(driver.is_dragging());
		assert_eq!(driver.on_drag_end(6.0), Some(GraphEvent::NodeClick("a".into())));
		assert!(!driver.is_dragging());
		assert!(driver.state().unwrap().dragged().is_none());
	}

	#[test]
	fn drag_end_restarts_a_settled_run() {
		let mut driver = driver();
		driver.load(triangle(), 0.0).unwrap();
		driver.stop();
		assert!(!driver.is_running());

		assert!(driver.on_drag_start("b", Vec2::new(0.0, 0.0), 100.0));
		assert!(driver.is_running());
		driver.on_drag_move(Vec2::new(50.0, 60.0));
		assert_eq!(driver.on_drag_end(200.0), None);
		assert!(driver.is_running());
		assert!(driver.scheduler().pending().is_some());
	}

	#[test]
	fn drag_follows_pointer_through_view_transform() {
		let mut driver = driver();
		driver.load(triangle(), 0.0).unwrap();
		*driver.transform_mut() = ViewTransform {
			x: 10.0,
			y: 20.0,
			k: 2.0,
		};
		assert!(driver.on_drag_start("c", Vec2::ZERO, 0.0));
		driver.on_drag_move(Vec2::new(210.0, 220.0));
		assert_eq!(
			driver.state().unwrap().node("c").unwrap().position,
			Vec2::new(100.0, 100.0)
		);
	}

	#[test]
	fn unknown_node_cannot_be_dragged() {
		let mut driver = driver();
		driver.load(triangle(), 0.0).unwrap();
		assert!(!driver.on_drag_start("zz", Vec2::ZERO, 0.0));
		assert!(!driver.on_drag_move(Vec2::new(1.0, 1.0)));
		assert_eq!(driver.on_drag_end(1.0), None);
	}

	#[test]
	fn hover_uses_label_then_leaves() {
		let mut driver = driver();
		driver.load(triangle(), 0.0).unwrap();
		let pos = driver.state().unwrap().nodes[0].position;

		assert_eq!(
			driver.hover(pos),
			vec![GraphEvent::HoverEnter {
				label: "Alpha".into(),
				x: pos.x,
				y: pos.y
			}]
		);
		assert_eq!(driver.hover(pos), vec![]);
		assert_eq!(driver.pointer_leave(), vec![GraphEvent::HoverLeave]);
	}

	#[test]
	fn background_click_finds_edge() {
		let mut driver = driver();
		driver.load(triangle(), 0.0).unwrap();
		let g = driver.state().unwrap().edge_geometry(0);
		let mid = g.start.midpoint(g.end);
		assert_eq!(
			driver.background_click(mid),
			Some(GraphEvent::EdgeClick("a->b".into()))
		);
	}
}
