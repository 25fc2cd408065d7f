//! Reference shapes for unit tests.
//!
//! The query core ships no shape implementations; tests need a couple of
//! real ones to intersect against.

use std::sync::Arc;

use raygrid_math::{Ray, Vec3};

use crate::bounds::{bounding_box, BoxedPrimitive};
use crate::primitive::{Primitive, PrimitiveRef, Shape, SurfaceHit};

/// A solid sphere with a configurable transparency flag.
pub struct TestSphere {
    pub center: Vec3,
    pub radius: f32,
    pub transparent: bool,
}

impl TestSphere {
    pub fn solid(center: Vec3, radius: f32) -> PrimitiveRef {
        Arc::new(TestSphere {
            center,
            radius,
            transparent: false,
        })
    }

    pub fn glass(center: Vec3, radius: f32) -> PrimitiveRef {
        Arc::new(TestSphere {
            center,
            radius,
            transparent: true,
        })
    }
}

impl Primitive for TestSphere {
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let oc = self.center - ray.origin;
        let a = ray.direction.length_squared();
        let h = ray.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Nearest non-negative root.
        let mut root = (h - sqrtd) / a;
        if root < 0.0 {
            root = (h + sqrtd) / a;
            if root < 0.0 {
                return None;
            }
        }

        Some(SurfaceHit {
            t: root,
            position: ray.at(root),
        })
    }

    fn is_transparent(&self) -> bool {
        self.transparent
    }

    fn is_closed(&self) -> bool {
        true
    }

    fn contains(&self, point: Vec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }

    fn shape(&self) -> Shape {
        Shape::Sphere {
            center: self.center,
            radius: self.radius,
        }
    }
}

/// An infinite plane `dot(normal, p) = offset`; unbounded, so it always goes
/// to the linear fallback list.
pub struct TestPlane {
    pub normal: Vec3,
    pub offset: f32,
}

impl TestPlane {
    pub fn new(normal: Vec3, offset: f32) -> PrimitiveRef {
        Arc::new(TestPlane { normal, offset })
    }
}

impl Primitive for TestPlane {
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let denom = self.normal.dot(ray.direction);
        if denom.abs() < 1.0e-8 {
            return None;
        }
        let t = (self.offset - self.normal.dot(ray.origin)) / denom;
        if t < 0.0 {
            return None;
        }
        Some(SurfaceHit {
            t,
            position: ray.at(t),
        })
    }

    fn shape(&self) -> Shape {
        Shape::Unbounded
    }
}

/// Spheres at the origin with the given radii, already boxed.
pub fn boxed_spheres(radii: &[f32]) -> Vec<BoxedPrimitive> {
    radii
        .iter()
        .map(|&r| {
            let primitive = TestSphere::solid(Vec3::ZERO, r);
            let bounds = bounding_box(&primitive.shape())
                .unwrap()
                .expect("sphere is bounded");
            BoxedPrimitive { bounds, primitive }
        })
        .collect()
}
