//! Axis-aligned bounding box in corner form.
//!
//! The voxel query core works on box corners directly: corner coordinates are
//! what gets floor-divided into voxel coordinates, and per-axis extents feed
//! the bucket-splitting statistics.

use crate::Vec3;

/// Minimum thickness a box face is allowed to have. Boxes thinner than this
/// on an axis are padded outward so a flat primitive (e.g. an axis-aligned
/// triangle) still occupies a voxel slab of nonzero width.
const MIN_THICKNESS: f32 = 1.0e-4;

/// An axis-aligned bounding box, stored as min/max corners.
///
/// Invariant: `min[i] <= max[i]` on every axis. Constructors here maintain it;
/// callers assembling corners by hand are expected to as well.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Create a box from already-ordered corners.
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.cmple(max).all(), "box corners out of order");
        Self { min, max }
    }

    /// Create a box from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Per-axis side lengths.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Length of the longest side.
    ///
    /// This is the size measure used by the bucket splitter and the cell
    /// sizing heuristics.
    #[inline]
    pub fn max_extent(&self) -> f32 {
        self.extent().max_element()
    }

    /// True if the point lies inside the box (inclusive on all faces).
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Pad any face thinner than the minimum thickness outward on both sides.
    pub fn pad_thin_faces(&self) -> Aabb {
        let mut min = self.min;
        let mut max = self.max;
        for i in 0..3 {
            if max[i] - min[i] < MIN_THICKNESS {
                let pad = MIN_THICKNESS * 0.5;
                min[i] -= pad;
                max[i] += pad;
            }
        }
        Aabb { min, max }
    }
}
