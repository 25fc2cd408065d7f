//! Ray type for spatial queries.
//!
//! A ray is defined by an origin point and a direction vector. The direction
//! is not required to be normalized; the parameter `t` is always expressed in
//! units of the direction's length.

use crate::Vec3;

/// A ray with origin and direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray.
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}
