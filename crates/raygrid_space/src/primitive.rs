//! Primitive contract and intersection result types.
//!
//! The query core never implements shapes itself. It only needs three things
//! from a primitive: an intersection test, a closed-volume/inside predicate
//! pair, and enough shape parameters to build a bounding box.

use std::sync::Arc;

use raygrid_math::{Ray, Vec3};

/// Shared handle to an externally owned primitive.
///
/// Primitives are shared rather than owned because a single primitive can sit
/// in many voxel cells and in several grids at once.
pub type PrimitiveRef = Arc<dyn Primitive>;

/// Shape parameters a primitive exposes for bounding-box construction.
///
/// This is a closed set: the box builder knows how to bound exactly these
/// kinds. Anything else reports `Unbounded` and is tested exhaustively via
/// the linear fallback list instead of through a grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere {
        center: Vec3,
        radius: f32,
    },
    /// Flat disk; `normal` must be unit length.
    Disk {
        center: Vec3,
        normal: Vec3,
        radius: f32,
    },
    /// Swept circle between two endpoints; covers cylinders and cones, with
    /// `radius` the widest cross-section. `start` and `end` are the axis
    /// endpoints.
    Tube {
        start: Vec3,
        end: Vec3,
        radius: f32,
    },
    /// Axis-aligned box given directly by its corners.
    Cuboid {
        min: Vec3,
        max: Vec3,
    },
    Triangle {
        a: Vec3,
        b: Vec3,
        c: Vec3,
    },
    /// Torus around `axis` (unit length) through `center`, with major radius
    /// `major` (center of the ring) and tube radius `minor`.
    Torus {
        center: Vec3,
        axis: Vec3,
        major: f32,
        minor: f32,
    },
    /// No finite bound (e.g. a plane). Goes to the linear fallback list.
    Unbounded,
}

/// Raw result of a primitive's own intersection test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// Ray parameter of the intersection, `>= 0`.
    pub t: f32,
    /// World-space intersection point.
    pub position: Vec3,
}

/// Contract every primitive must satisfy to participate in a geometry space.
pub trait Primitive: Send + Sync {
    /// Nearest intersection of the ray with this primitive, if any.
    ///
    /// Implementations must only report hits at `t >= 0`.
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit>;

    /// True if a ray passing through this primitive is only filtered, not
    /// blocked.
    fn is_transparent(&self) -> bool {
        false
    }

    /// True if the primitive encloses a volume, making `contains`
    /// meaningful.
    fn is_closed(&self) -> bool {
        false
    }

    /// True if the point lies inside the primitive's volume. Only consulted
    /// when `is_closed()` returns true.
    fn contains(&self, _point: Vec3) -> bool {
        false
    }

    /// Shape parameters for bounding-box construction.
    fn shape(&self) -> Shape;
}

/// A resolved intersection: the surface hit plus which primitive produced it.
#[derive(Clone)]
pub struct Hit {
    /// Ray parameter of the intersection, `>= 0`.
    pub t: f32,
    /// World-space intersection point.
    pub position: Vec3,
    /// The primitive that was hit.
    pub primitive: PrimitiveRef,
    /// Cached transparency flag of the primitive at the time of the hit.
    pub transparent: bool,
}

impl Hit {
    pub(crate) fn new(surface: SurfaceHit, primitive: &PrimitiveRef) -> Self {
        Self {
            t: surface.t,
            position: surface.position,
            transparent: primitive.is_transparent(),
            primitive: Arc::clone(primitive),
        }
    }

    /// True if both hits refer to the same primitive instance.
    pub fn same_primitive(&self, other: &Hit) -> bool {
        Arc::ptr_eq(&self.primitive, &other.primitive)
    }
}

impl std::fmt::Debug for Hit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hit")
            .field("t", &self.t)
            .field("position", &self.position)
            .field("transparent", &self.transparent)
            .finish()
    }
}
