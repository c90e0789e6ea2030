//! Graph data structures for input to the force graph component.

use serde::Deserialize;

use super::config::{PhysicsOverrides, Preset};

/// A node in the graph.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in edges.
	pub id: String,
	/// Optional display label, also used as hover text.
	#[serde(default)]
	pub label: Option<String>,
	/// Optional CSS color override (e.g., "#ff0000" or "rgb(255, 0, 0)").
	/// If not set, color is derived from the theme palette based on `group`.
	#[serde(default)]
	pub color: Option<String>,
	/// Optional group name for palette-based coloring.
	#[serde(default)]
	pub group: Option<String>,
	/// Radius in simulation units. Falls back to the default node radius.
	#[serde(default)]
	pub radius: Option<f64>,
}

impl GraphNode {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_radius(mut self, radius: f64) -> Self {
		self.radius = Some(radius);
		self
	}
}

/// An edge between two nodes, referenced by node id.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphEdge {
	/// Edge identifier. Derived from the endpoints when absent.
	#[serde(default)]
	pub id: Option<String>,
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Spring strength multiplier (1.0 when absent).
	#[serde(default)]
	pub weight: Option<f64>,
	#[serde(default)]
	pub label: Option<String>,
	/// Directed edges are drawn with an arrowhead at the target.
	#[serde(default)]
	pub directed: bool,
}

impl GraphEdge {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			..Self::default()
		}
	}

	pub fn directed(mut self) -> Self {
		self.directed = true;
		self
	}

	pub fn with_weight(mut self, weight: f64) -> Self {
		self.weight = Some(weight);
		self
	}

	/// The explicit id, or `source->target` when none was given.
	pub fn resolved_id(&self) -> String {
		self.id
			.clone()
			.unwrap_or_else(|| format!("{}->{}", self.source, self.target))
	}
}

/// Complete graph data: nodes and edges.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphData {
	#[serde(default)]
	pub nodes: Vec<GraphNode>,
	#[serde(default, alias = "links")]
	pub edges: Vec<GraphEdge>,
}

impl GraphData {
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// A graph plus the physics configuration to lay it out with, as embedded
/// in the host page.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct GraphDocument {
	#[serde(flatten)]
	pub data: GraphData,
	#[serde(default)]
	pub preset: Preset,
	#[serde(default)]
	pub physics: PhysicsOverrides,
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn document_accepts_links_alias_and_defaults() {
		let json = r#"{
			"nodes": [{ "id": "a" }, { "id": "b", "label": "B", "radius": 12 }],
			"links": [{ "source": "a", "target": "b", "directed": true }],
			"preset": "org_chart",
			"physics": { "gravity": 0.5 }
		}"#;
		let doc: GraphDocument = serde_json::from_str(json).unwrap();

		assert_eq!(doc.data.nodes.len(), 2);
		assert_eq!(doc.data.nodes[1].radius, Some(12.0));
		assert_eq!(doc.data.edges[0].resolved_id(), "a->b");
		assert!(doc.data.edges[0].directed);
		assert_eq!(doc.preset, Preset::OrgChart);
		assert_eq!(doc.physics.gravity, Some(0.5));
	}

	#[test]
	fn empty_object_is_an_empty_graph() {
		let doc: GraphDocument = serde_json::from_str("{}").unwrap();
		assert!(doc.data.is_empty());
		assert_eq!(doc.preset, Preset::Graph);
	}
}
