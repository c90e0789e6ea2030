//! Flattens a hierarchy into graph form for the organization-chart preset.

use serde::Deserialize;

use super::types::{GraphData, GraphEdge, GraphNode};

/// One entry of an organization chart.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TreeNode {
	pub id: String,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub group: Option<String>,
	#[serde(default)]
	pub children: Vec<TreeNode>,
}

impl TreeNode {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Self::default()
		}
	}

	pub fn with_children(mut self, children: Vec<TreeNode>) -> Self {
		self.children = children;
		self
	}

	/// Nodes in depth-first pre-order and one directed parent -> child edge
	/// per child.
	pub fn to_graph(&self) -> GraphData {
		let mut data = GraphData::default();
		let mut stack = vec![(self, None::<&str>)];
		while let Some((node, parent)) = stack.pop() {
			data.nodes.push(GraphNode {
				id: node.id.clone(),
				label: node.label.clone(),
				group: node.group.clone(),
				..GraphNode::default()
			});
			if let Some(parent) = parent {
				data.edges.push(GraphEdge::new(parent, node.id.as_str()).directed());
			}
			stack.extend(node.children.iter().rev().map(|c| (c, Some(node.id.as_str()))));
		}
		data
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn flattens_in_pre_order_with_directed_edges() {
		let tree = TreeNode::new("ceo").with_children(vec![
			TreeNode::new("cto").with_children(vec![TreeNode::new("dev")]),
			TreeNode::new("cfo"),
		]);
		let graph = tree.to_graph();

		let ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["ceo", "cto", "dev", "cfo"]);

		let edges: Vec<_> = graph
			.edges
			.iter()
			.map(|e| (e.source.as_str(), e.target.as_str(), e.directed))
			.collect();
		assert_eq!(
			edges,
			[("ceo", "cto", true), ("cto", "dev", true), ("ceo", "cfo", true)]
		);
	}
}
