//! Voxel-grid spatial index for ray/primitive intersection queries.
//!
//! Partitions a fixed set of primitives into one or more uniform voxel grids
//! so that a ray only has to be tested against the primitives in the cells it
//! actually crosses. Results are identical to exhaustive testing; the grids
//! only change how many candidates get looked at.
//!
//! The lifecycle is two-phase: primitives are added to a [`GeometrySpace`],
//! then `initialize()` builds the index (bounding boxes, bucket split, cell
//! sizing, voxel maps), after which the space is immutable and queries may
//! run concurrently.
//!
//! # Example
//!
//! ```ignore
//! use raygrid_space::{GeometrySpace, SpaceKind, SizingStrategy};
//!
//! let mut space = GeometrySpace::new(SpaceKind::Voxel {
//!     sizing: SizingStrategy::LargestExtent,
//! });
//! space.add_primitives(scene_primitives)?;
//! space.initialize()?;
//!
//! if let Some(hit) = space.nearest_intersection(&ray, 100.0)? {
//!     println!("hit {} at t={}", hit.position, hit.t);
//! }
//! ```

mod bounds;
mod error;
mod primitive;
mod sizing;
mod space;
mod split;
mod traversal;
mod voxel;

#[cfg(test)]
pub(crate) mod testutil;

pub use bounds::{bounding_box, BoxedPrimitive};
pub use error::{BuildError, BuildResult, QueryError, QueryResult};
pub use primitive::{Hit, Primitive, PrimitiveRef, Shape, SurfaceHit};
pub use sizing::SizingStrategy;
pub use space::{GeometrySpace, SpaceKind};
pub use split::{split_collection, SplitStrategy};
pub use traversal::{GridTraversal, VoxelStep};
pub use voxel::{to_voxel, to_voxels, VoxelMap};

/// Re-export the math types queries are expressed in.
pub use raygrid_math::{Aabb, IVec3, Ray, Vec3};
