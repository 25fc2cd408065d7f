//! Math support types for the raygrid voxel query core.
//!
//! Re-exports `glam` so downstream crates get `Vec3`/`IVec3` from one place,
//! and adds the two geometry types the query core is built on: `Ray` and
//! `Aabb`.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod ray;

pub use aabb::Aabb;
pub use ray::Ray;
