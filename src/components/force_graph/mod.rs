//! Force-directed graph layout and its interactive canvas view.
//!
//! The layout engine is headless: [`SimulationState`] holds nodes and edges,
//! [`physics::step`] advances it by one tick, and [`Driver`] decides when to
//! tick and routes drag, click and hover input. The canvas component is one
//! adapter over that engine; anything that implements [`Scheduler`] and can
//! draw a [`Snapshot`] can host it.
//!
//! # Example
//!
//! ```
//! use vizkit_graph::{
//!     Driver, DriverSettings, GraphData, GraphEdge, GraphNode, ManualScheduler, Preset,
//!     TickOutcome, Viewport,
//! };
//!
//! let data = GraphData {
//!     nodes: vec![GraphNode::new("a"), GraphNode::new("b")],
//!     edges: vec![GraphEdge::new("a", "b")],
//! };
//! let mut driver = Driver::new(
//!     ManualScheduler::default(),
//!     Preset::Graph.params(),
//!     DriverSettings::default(),
//! );
//! let _ = driver.resize(Viewport::new(640.0, 480.0), 0.0);
//! driver.load(data, 0.0).unwrap();
//!
//! let mut now = 0.0;
//! while let Some(outcome) = driver.run_pending(now) {
//!     now += 16.0;
//!     if outcome == TickOutcome::Settled {
//!         break;
//!     }
//! }
//! assert_eq!(driver.snapshot().edges.len(), 1);
//! ```

mod component;
pub mod config;
pub mod driver;
pub mod geometry;
pub mod interaction;
pub mod physics;
mod render;
pub mod state;
pub mod theme;
pub mod tree;
mod types;
pub mod vector;

pub use component::ForceGraphCanvas;
pub use config::{DriverSettings, InitialLayout, PhysicsOverrides, PhysicsParams, Preset};
pub use driver::{Driver, ManualScheduler, RunStatus, RunToken, Scheduler, TickOutcome};
pub use geometry::{Arrowhead, EdgeGeometry, edge_geometry};
pub use interaction::{DragController, GraphEvent};
pub use state::{SimulationState, Snapshot, ViewTransform, Viewport};
pub use theme::Theme;
pub use tree::TreeNode;
pub use types::{GraphData, GraphDocument, GraphEdge, GraphNode};
pub use vector::Vec2;
