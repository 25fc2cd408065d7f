//! Bounding-box construction per primitive shape.
//!
//! Corners are computed exactly per shape kind, then pushed outward by a
//! small relative epsilon so a primitive lying exactly on an axis-aligned
//! plane still gets a box with nonzero thickness on that axis. Shapes with no
//! finite bound return `None` and are handled by the linear fallback list.

use raygrid_math::{Aabb, Vec3};

use crate::error::{BuildError, BuildResult};
use crate::primitive::{PrimitiveRef, Shape};

/// Relative outward inflation applied to every box corner.
const INFLATE: f32 = 10.0 * f32::EPSILON;

/// A primitive paired with its bounding box.
///
/// This is the unit the bucket splitter, the cell sizing heuristics and
/// voxel assignment all operate on. The box only lives until the primitive
/// has been assigned to its voxel cells.
pub struct BoxedPrimitive {
    pub bounds: Aabb,
    pub primitive: PrimitiveRef,
}

/// Build the bounding box for a shape, or `None` if the shape is unbounded.
///
/// Surfaces `BuildError::DegenerateBounds` if the raw shape parameters
/// produce corners with `min > max` on some axis (a malformed shape, e.g. a
/// cuboid given swapped corners).
pub fn bounding_box(shape: &Shape) -> BuildResult<Option<Aabb>> {
    let raw = match *shape {
        Shape::Sphere { center, radius } => {
            let r = Vec3::splat(radius);
            corners(center - r, center + r)?
        }
        Shape::Disk {
            center,
            normal,
            radius,
        } => {
            // Exact disk extent per axis: r * sqrt(1 - n_i^2).
            let e = radius * (Vec3::ONE - normal * normal).max(Vec3::ZERO).powf(0.5);
            corners(center - e, center + e)?
        }
        Shape::Tube { start, end, radius } => {
            let axis = (end - start).normalize_or_zero();
            // Each cap circle bounds like a disk with the tube axis as normal.
            let e = radius * (Vec3::ONE - axis * axis).max(Vec3::ZERO).powf(0.5);
            corners(start.min(end) - e, start.max(end) + e)?
        }
        Shape::Cuboid { min, max } => corners(min, max)?,
        Shape::Triangle { a, b, c } => corners(a.min(b).min(c), a.max(b).max(c))?,
        Shape::Torus {
            center,
            axis,
            major,
            minor,
        } => {
            // Ring extent in the torus plane plus tube extent along the axis.
            let ring = (major + minor) * (Vec3::ONE - axis * axis).max(Vec3::ZERO).powf(0.5);
            let e = ring + minor * axis.abs();
            corners(center - e, center + e)?
        }
        Shape::Unbounded => return Ok(None),
    };

    Ok(Some(inflate(raw).pad_thin_faces()))
}

fn corners(min: Vec3, max: Vec3) -> BuildResult<Aabb> {
    if min.cmpgt(max).any() {
        return Err(BuildError::DegenerateBounds { min, max });
    }
    Ok(Aabb { min, max })
}

/// Push corners outward by a relative epsilon: `min` shrinks toward negative
/// infinity and `max` grows toward positive infinity by `|coord| * INFLATE`.
fn inflate(b: Aabb) -> Aabb {
    Aabb {
        min: b.min - b.min.abs() * INFLATE,
        max: b.max + b.max.abs() * INFLATE,
    }
}
