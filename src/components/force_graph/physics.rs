//! Force accumulation and integration for one simulation tick.
//!
//! A tick runs in two passes. First every node's net force is computed from
//! the positions as they stood when the tick began. Only then are velocities
//! and positions advanced. Sums over nodes run in id order, so the result
//! does not depend on the order nodes were supplied in.
//!
//! Damping is applied after the force is added:
//! `v = (v + f) * friction * decay`, then `p += v`.

use super::config::PhysicsParams;
use super::state::SimulationState;
use super::vector::Vec2;

/// Distances below this are treated as this, so inverse-square terms stay
/// finite.
const MIN_DISTANCE: f64 = 1.0;

/// Angle step used to pick a separation direction for coincident nodes.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Direction to push the node ranked `i` away from the node ranked `j` when
/// they sit on the same point. Depends only on the pair, so repeated runs agree, and
/// `separation_direction(j, i)` is its opposite.
fn separation_direction(i: usize, j: usize) -> Vec2 {
	let (lo, hi) = (i.min(j), i.max(j));
	let base = Vec2::from_angle((lo * 31 + hi) as f64 * GOLDEN_ANGLE);
	if i <= j { base } else { -base }
}

/// Computes the net force on every node into `forces`, indexed like
/// `state.nodes`.
///
/// Pairwise terms are summed in id order (see
/// [`SimulationState::force_order`]), so shuffling the input nodes yields
/// bit-identical forces. A dragged node still pushes and pulls the others;
/// its own entry is computed but ignored by [`integrate`].
pub fn accumulate_forces(state: &SimulationState, params: &PhysicsParams, forces: &mut Vec<Vec2>) {
	let nodes = &state.nodes;
	let order = state.force_order();
	forces.clear();
	forces.resize(nodes.len(), Vec2::ZERO);
	if nodes.is_empty() {
		return;
	}

	let center = state.viewport().center();
	for (force, node) in forces.iter_mut().zip(nodes) {
		*force += (center - node.position) * params.gravity;
	}

	if params.center_force != 0.0 {
		let sum = order.iter().fold(Vec2::ZERO, |acc, &i| acc + nodes[i].position);
		let centroid = sum * (1.0 / nodes.len() as f64);
		let shift = (center - centroid) * params.center_force;
		for force in forces.iter_mut() {
			*force += shift;
		}
	}

	if params.repulsion != 0.0 {
		for (p, &i) in order.iter().enumerate() {
			for (q, &j) in order.iter().enumerate().skip(p + 1) {
				let delta = nodes[i].position - nodes[j].position;
				let dir = delta.normalized_or(separation_direction(p, q));
				let dist = delta.length().max(MIN_DISTANCE);
				let magnitude = (params.repulsion / (dist * dist)).min(params.max_repulsion);
				forces[i] += dir * magnitude;
				forces[j] -= dir * magnitude;
			}
		}
	}

	for edge in &state.edges {
		if edge.source == edge.target {
			continue;
		}
		let delta = nodes[edge.target].position - nodes[edge.source].position;
		let fallback = -separation_direction(state.rank(edge.source), state.rank(edge.target));
		let dir = delta.normalized_or(fallback);
		let stretch = delta.length() - params.link_distance;
		let pull = dir * (stretch * params.link_strength * edge.weight);
		forces[edge.source] += pull;
		forces[edge.target] -= pull;
	}
}

/// Advances every node except the dragged one by `forces` and returns the
/// summed displacement of this tick.
///
/// Positions are clamped into the viewport; a clamped axis loses its
/// velocity so nodes do not keep pressing into the wall.
pub fn integrate(state: &mut SimulationState, params: &PhysicsParams, forces: &[Vec2]) -> f64 {
	let viewport = state.viewport();
	let dragged = state.dragged();
	let damping = params.damping();
	let mut moved = vec![0.0; state.nodes.len()];

	for (i, (node, force)) in state.nodes.iter_mut().zip(forces).enumerate() {
		if dragged == Some(i) {
			continue;
		}

		let mut velocity = (node.velocity + *force) * damping;
		if !velocity.is_finite() {
			velocity = Vec2::ZERO;
		}

		let proposed = node.position + velocity;
		let clamped = viewport.clamp(proposed, node.radius);
		if clamped.x != proposed.x {
			velocity.x = 0.0;
		}
		if clamped.y != proposed.y {
			velocity.y = 0.0;
		}

		moved[i] = node.position.distance(clamped);
		node.position = clamped;
		node.velocity = velocity;
	}

	state.force_order().iter().map(|&i| moved[i]).sum()
}

/// Runs one full tick: forces from a consistent snapshot, then integration.
/// Returns the summed displacement of all non-dragged nodes.
pub fn step(state: &mut SimulationState, params: &PhysicsParams) -> f64 {
	let mut forces = Vec::with_capacity(state.nodes.len());
	accumulate_forces(state, params, &mut forces);
	integrate(state, params, &forces)
}
