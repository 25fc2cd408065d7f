//! Reference shapes and scene generators for the equivalence suite.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::Rng;
use raygrid_space::{Primitive, PrimitiveRef, Ray, Shape, SurfaceHit, Vec3};

/// A solid or transparent sphere.
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub transparent: bool,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, transparent: bool) -> PrimitiveRef {
        Arc::new(Sphere {
            center,
            radius,
            transparent,
        })
    }
}

impl Primitive for Sphere {
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

/// An axis-aligned solid box, intersected with the slab method.
pub struct Cube {
    pub min: Vec3,
    pub max: Vec3,
    pub transparent: bool,
}

impl Cube {
    pub fn new(min: Vec3, max: Vec3, transparent: bool) -> PrimitiveRef {
        Arc::new(Cube {
            min,
            max,
            transparent,
        })
    }
}

impl Primitive for Cube {
    fn intersect(&self, ray: &Ray) -> Option<SurfaceHit> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;

        for axis in 0..3 {
            let inv = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv;
            if inv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_enter = t0.max(t_enter);
            t_exit = t1.min(t_exit);
            if t_exit <= t_enter {
                return None;
            }
        }

        // Entering hit if the origin is outside, otherwise the exit face.
        let t = if t_enter >= 0.0 {
            t_enter
        } else if t_exit >= 0.0 {
            t_exit
        } else {
            return None;
        };

        Some(SurfaceHit {
            t,
            position: ray.at(t),
        })
    }

    fn is_transparent(&self) -> bool {
        self.transparent
    }

    fn is_closed(&self) -> bool {
        true
    }

    fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    fn shape(&self) -> Shape {
        Shape::Cuboid {
            min: self.min,
            max: self.max,
        }
    }
}

/// Infinite plane `dot(normal, p) = offset`; unbounded on purpose so every
/// scene exercises the linear fallback path.
pub struct Plane {
    pub normal: Vec3,
    pub offset: f32,
}

impl Plane {
    pub fn new(normal: Vec3, offset: f32) -> PrimitiveRef {
        Arc::new(Plane { normal, offset })
    }
}

impl Primitive for Plane {
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

fn random_point(rng: &mut StdRng, half_extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-half_extent..half_extent),
        rng.gen_range(-half_extent..half_extent),
        rng.gen_range(-half_extent..half_extent),
    )
}

/// A mixed scene of spheres and cubes (about a third transparent) plus one
/// unbounded plane.
pub fn random_scene(rng: &mut StdRng, count: usize) -> Vec<PrimitiveRef> {
    let mut primitives: Vec<PrimitiveRef> = Vec::with_capacity(count + 1);

    for i in 0..count {
        let transparent = rng.gen_bool(0.3);
        let center = random_point(rng, 8.0);
        if i % 3 == 0 {
            let half = Vec3::splat(rng.gen_range(0.2..1.0));
            primitives.push(Cube::new(center - half, center + half, transparent));
        } else {
            let radius = rng.gen_range(0.3..1.2);
            primitives.push(Sphere::new(center, radius, transparent));
        }
    }

    primitives.push(Plane::new(Vec3::Y, -12.0));
    primitives
}

/// A ray with a random origin and a direction of usable length.
pub fn random_ray(rng: &mut StdRng) -> Ray {
    let origin = random_point(rng, 10.0);
    loop {
        let direction = random_point(rng, 1.0);
        if direction.length_squared() > 0.01 {
            return Ray::new(origin, direction);
        }
    }
}
