//! Physics parameters, presets, and driver tuning.
//!
//! Every value has a default so a caller may supply none, some, or all of
//! them. Presets are plain parameter sets for the same engine: the
//! organization-chart preset only changes constants.

use serde::Deserialize;

/// Radius given to nodes that do not specify one.
pub const DEFAULT_NODE_RADIUS: f64 = 8.0;

/// Coefficients for one simulation run.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsParams {
	/// Pull toward the viewport center, per unit of offset. Default `0.05`.
	pub gravity: f64,
	/// Pairwise push, divided by squared distance. Default `2000.0`.
	pub repulsion: f64,
	/// Rest length of an edge spring. Default `80.0`.
	#[serde(alias = "linkDistance")]
	pub link_distance: f64,
	/// Spring coefficient per unit of stretch. Default `0.1`.
	#[serde(alias = "linkStrength")]
	pub link_strength: f64,
	/// Velocity multiplier per tick. Default `0.6`.
	pub friction: f64,
	/// Secondary velocity multiplier per tick. Default `1.0` (off).
	pub decay: f64,
	/// Pull applied to every node by the offset of the layout centroid from
	/// the viewport center. Default `0.0` (off).
	#[serde(alias = "centerForce")]
	pub center_force: f64,
	/// Upper bound on the repulsion magnitude of a single node pair.
	/// Default `50.0`.
	#[serde(alias = "maxRepulsion")]
	pub max_repulsion: f64,
}

impl Default for PhysicsParams {
	fn default() -> Self {
		Self {
			gravity: 0.05,
			repulsion: 2000.0,
			link_distance: 80.0,
			link_strength: 0.1,
			friction: 0.6,
			decay: 1.0,
			center_force: 0.0,
			max_repulsion: 50.0,
		}
	}
}

impl PhysicsParams {
	/// Combined per-tick velocity damping.
	pub fn damping(&self) -> f64 {
		self.friction * self.decay
	}
}

/// Named parameter sets for the layout engine.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
	/// General force-directed layout.
	#[default]
	Graph,
	/// Tree layouts: stiffer, shorter links and weaker gravity.
	#[serde(alias = "orgChart")]
	OrgChart,
}

impl Preset {
	pub fn params(self) -> PhysicsParams {
		match self {
			Preset::Graph => PhysicsParams::default(),
			Preset::OrgChart => PhysicsParams {
				gravity: 0.02,
				link_distance: 60.0,
				link_strength: 0.3,
				..PhysicsParams::default()
			},
		}
	}
}

/// Caller-supplied physics values layered over a preset.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicsOverrides {
	pub gravity: Option<f64>,
	pub repulsion: Option<f64>,
	#[serde(alias = "linkDistance")]
	pub link_distance: Option<f64>,
	#[serde(alias = "linkStrength")]
	pub link_strength: Option<f64>,
	pub friction: Option<f64>,
	pub decay: Option<f64>,
	#[serde(alias = "centerForce")]
	pub center_force: Option<f64>,
	#[serde(alias = "maxRepulsion")]
	pub max_repulsion: Option<f64>,
}

impl PhysicsOverrides {
	/// Replaces each field of `base` that has an override.
	pub fn apply(&self, base: PhysicsParams) -> PhysicsParams {
		PhysicsParams {
			gravity: self.gravity.unwrap_or(base.gravity),
			repulsion: self.repulsion.unwrap_or(base.repulsion),
			link_distance: self.link_distance.unwrap_or(base.link_distance),
			link_strength: self.link_strength.unwrap_or(base.link_strength),
			friction: self.friction.unwrap_or(base.friction),
			decay: self.decay.unwrap_or(base.decay),
			center_force: self.center_force.unwrap_or(base.center_force),
			max_repulsion: self.max_repulsion.unwrap_or(base.max_repulsion),
		}
	}
}

/// Starting positions for a freshly loaded graph.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum InitialLayout {
	/// Evenly spaced on a circle around the viewport center, in input order.
	#[default]
	Circular,
	/// Scattered inside the viewport. The same seed gives the same layout.
	Random { seed: u32 },
}

/// When the driver keeps ticking and how pointer input is classified.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverSettings {
	/// Minimum time a run keeps ticking, in milliseconds.
	pub min_run_ms: f64,
	/// Summed per-node displacement below which a tick counts as settled.
	pub stability_threshold: f64,
	/// Pointer travel (screen pixels) under which a press counts as a click.
	pub click_tolerance: f64,
	/// Screen-space distance within which a pointer hits an edge.
	pub edge_hit_tolerance: f64,
	pub layout: InitialLayout,
}

impl Default for DriverSettings {
	fn default() -> Self {
		Self {
			min_run_ms: 2000.0,
			stability_threshold: 0.1,
			click_tolerance: 3.0,
			edge_hit_tolerance: 4.0,
			layout: InitialLayout::Circular,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn org_chart_is_stiffer_with_less_gravity() {
		let graph = Preset::Graph.params();
		let org = Preset::OrgChart.params();
		assert!(org.link_strength > graph.link_strength);
		assert!(org.gravity < graph.gravity);
		assert_eq!(org.repulsion, graph.repulsion);
	}

	#[test]
	fn overrides_replace_only_given_fields() {
		let overrides = PhysicsOverrides {
			friction: Some(0.8),
			..PhysicsOverrides::default()
		};
		let params = overrides.apply(Preset::OrgChart.params());
		assert_eq!(params.friction, 0.8);
		assert_eq!(params.link_strength, 0.3);
	}

	#[test]
	fn partial_params_deserialize_with_defaults() {
		let params: PhysicsParams = serde_json::from_str(r#"{ "repulsion": 10 }"#).unwrap();
		assert_eq!(params.repulsion, 10.0);
		assert_eq!(params.gravity, PhysicsParams::default().gravity);
	}

	#[test]
	fn camel_case_field_names_are_accepted() {
		let params: PhysicsParams = serde_json::from_str(
			r#"{ "linkDistance": 42, "linkStrength": 0.2, "centerForce": 0.1, "maxRepulsion": 9 }"#,
		)
		.unwrap();
		assert_eq!(params.link_distance, 42.0);
		assert_eq!(params.link_strength, 0.2);
		assert_eq!(params.center_force, 0.1);
		assert_eq!(params.max_repulsion, 9.0);

		let overrides: PhysicsOverrides =
			serde_json::from_str(r#"{ "linkDistance": 30, "link_strength": 0.5 }"#).unwrap();
		assert_eq!(overrides.link_distance, Some(30.0));
		assert_eq!(overrides.link_strength, Some(0.5));

		let preset: Preset = serde_json::from_str(r#""orgChart""#).unwrap();
		assert_eq!(preset, Preset::OrgChart);
	}
}
