//! Two-dimensional vector used for positions, velocities and forces.

use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A point or displacement in simulation space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
	pub x: f64,
	pub y: f64,
}

impl Vec2 {
	pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Unit vector at `angle` radians from the +x axis.
	pub fn from_angle(angle: f64) -> Self {
		Self::new(angle.cos(), angle.sin())
	}

	pub fn length(self) -> f64 {
		self.x.hypot(self.y)
	}

	pub fn length_squared(self) -> f64 {
		self.x * self.x + self.y * self.y
	}

	pub fn distance(self, other: Vec2) -> f64 {
		(other - self).length()
	}

	pub fn dot(self, other: Vec2) -> f64 {
		self.x * other.x + self.y * other.y
	}

	/// Rotates by +90 degrees in screen space (y grows downward).
	pub fn perpendicular(self) -> Self {
		Self::new(self.y, -self.x)
	}

	/// Returns the unit vector, or `fallback` when the length is too small
	/// to give a meaningful direction.
	pub fn normalized_or(self, fallback: Vec2) -> Self {
		let len = self.length();
		if len < f64::EPSILON || !len.is_finite() {
			fallback
		} else {
			self * (1.0 / len)
		}
	}

	/// Midpoint between `self` and `other`.
	pub fn midpoint(self, other: Vec2) -> Self {
		Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
	}

	pub fn is_finite(self) -> bool {
		self.x.is_finite() && self.y.is_finite()
	}
}

impl Add for Vec2 {
	type Output = Vec2;

	fn add(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl Sub for Vec2 {
	type Output = Vec2;

	fn sub(self, rhs: Vec2) -> Vec2 {
		Vec2::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Vec2 {
	type Output = Vec2;

	fn mul(self, rhs: f64) -> Vec2 {
		Vec2::new(self.x * rhs, self.y * rhs)
	}
}

impl Neg for Vec2 {
	type Output = Vec2;

	fn neg(self) -> Vec2 {
		Vec2::new(-self.x, -self.y)
	}
}

impl AddAssign for Vec2 {
	fn add_assign(&mut self, rhs: Vec2) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl SubAssign for Vec2 {
	fn sub_assign(&mut self, rhs: Vec2) {
		self.x -= rhs.x;
		self.y -= rhs.y;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn normalized_or_falls_back_on_zero_length() {
		let fallback = Vec2::new(1.0, 0.0);
		assert_eq!(Vec2::ZERO.normalized_or(fallback), fallback);
		assert_eq!(Vec2::new(0.0, 5.0).normalized_or(fallback), Vec2::new(0.0, 1.0));
	}

	#[test]
	fn perpendicular_points_up_for_rightward_vector() {
		assert_eq!(Vec2::new(1.0, 0.0).perpendicular(), Vec2::new(0.0, -1.0));
	}
}
