//! Geometry-space facade.
//!
//! A `GeometrySpace` collects primitives, builds its spatial index once, and
//! then answers intersection and containment queries. The index flavor is
//! picked at construction and fixed for the lifetime of the space:
//!
//! - [`SpaceKind::Linear`] tests every primitive on every query;
//! - [`SpaceKind::Voxel`] builds one uniform grid over everything that has a
//!   bounding box;
//! - [`SpaceKind::MultiVoxel`] splits the collection into buckets of
//!   similarly sized boxes and builds one grid per bucket.
//!
//! Primitives without a bounding box always go to a linear fallback list
//! that the grid variants merge into every answer, so results never depend
//! on the index flavor.

mod grid;
mod linear;
mod multigrid;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use log::debug;
use raygrid_math::{Ray, Vec3};

use crate::bounds::{bounding_box, BoxedPrimitive};
use crate::error::{BuildError, BuildResult, QueryError, QueryResult};
use crate::primitive::{Hit, Primitive, PrimitiveRef};
use crate::sizing::SizingStrategy;
use crate::split::{split_collection, SplitStrategy};
use grid::GridIndex;
use linear::{sort_ascending, truncate_at_first_opaque, LinearIndex};
use multigrid::MultiGridIndex;

/// Which index a geometry space builds at `initialize()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceKind {
    /// Exhaustive testing, no spatial structure.
    Linear,
    /// One uniform grid plus a fallback list for unbounded primitives.
    Voxel { sizing: SizingStrategy },
    /// One grid per bucket of similarly sized primitives.
    MultiVoxel {
        split: SplitStrategy,
        sizing: SizingStrategy,
    },
}

/// The built index, one variant per space kind.
enum SpaceIndex {
    Linear(LinearIndex),
    Voxel {
        grid: GridIndex,
        fallback: LinearIndex,
    },
    MultiVoxel {
        grids: MultiGridIndex,
        fallback: LinearIndex,
    },
}

/// A queryable collection of primitives.
///
/// Lifecycle: add primitives, call [`initialize`](Self::initialize) once,
/// then query. After initialization the space is immutable; queries take
/// `&self` and may run from several threads at once.
pub struct GeometrySpace {
    kind: SpaceKind,
    pending: Vec<PrimitiveRef>,
    index: Option<SpaceIndex>,
    /// Number of primitive intersection tests issued by queries so far.
    tests: AtomicU64,
}

impl GeometrySpace {
    pub fn new(kind: SpaceKind) -> Self {
        Self {
            kind,
            pending: Vec::new(),
            index: None,
            tests: AtomicU64::new(0),
        }
    }

    /// Add one primitive. Only allowed before `initialize()`.
    pub fn add_primitive(&mut self, primitive: PrimitiveRef) -> BuildResult<()> {
        if self.index.is_some() {
            return Err(BuildError::AlreadyInitialized);
        }
        self.pending.push(primitive);
        Ok(())
    }

    /// Add a batch of primitives. Only allowed before `initialize()`.
    pub fn add_primitives<I>(&mut self, primitives: I) -> BuildResult<()>
    where
        I: IntoIterator<Item = PrimitiveRef>,
    {
        if self.index.is_some() {
            return Err(BuildError::AlreadyInitialized);
        }
        self.pending.extend(primitives);
        Ok(())
    }

    /// Number of primitives in the space.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// True once `initialize()` has completed.
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// Build the spatial index. Must be called exactly once, after all
    /// primitives have been added and before any query.
    pub fn initialize(&mut self) -> BuildResult<()> {
        if self.index.is_some() {
            return Err(BuildError::AlreadyInitialized);
        }

        let index = match self.kind {
            SpaceKind::Linear => {
                debug!("linear space over {} primitives", self.pending.len());
                SpaceIndex::Linear(LinearIndex::new(self.pending.clone()))
            }
            SpaceKind::Voxel { sizing } => {
                let (boxed, unboxed) = self.partition_boxed()?;
                let dimension = sizing.cell_dimension(&boxed)?;
                let count = boxed.len();
                let grid = GridIndex::build(dimension, boxed);
                debug!(
                    "voxel space: dimension {} over {} primitives in {} cells, {} unbounded",
                    dimension,
                    count,
                    grid.cell_count(),
                    unboxed.len()
                );
                SpaceIndex::Voxel {
                    grid,
                    fallback: LinearIndex::new(unboxed),
                }
            }
            SpaceKind::MultiVoxel { split, sizing } => {
                let (boxed, unboxed) = self.partition_boxed()?;
                let buckets = split_collection(split, boxed);
                let mut grids = Vec::with_capacity(buckets.len());
                for bucket in buckets {
                    let dimension = sizing.cell_dimension(&bucket)?;
                    let count = bucket.len();
                    let grid = GridIndex::build(dimension, bucket);
                    debug!(
                        "multivoxel grid {}: dimension {} over {} primitives in {} cells",
                        grids.len(),
                        dimension,
                        count,
                        grid.cell_count()
                    );
                    grids.push(grid);
                }
                debug!(
                    "multivoxel space: {} grids, {} unbounded",
                    grids.len(),
                    unboxed.len()
                );
                SpaceIndex::MultiVoxel {
                    grids: MultiGridIndex::new(grids),
                    fallback: LinearIndex::new(unboxed),
                }
            }
        };

        self.index = Some(index);
        Ok(())
    }

    /// Split the pending primitives into boxed and unbounded groups.
    fn partition_boxed(&self) -> BuildResult<(Vec<BoxedPrimitive>, Vec<PrimitiveRef>)> {
        let mut boxed = Vec::new();
        let mut unboxed = Vec::new();
        for primitive in &self.pending {
            match bounding_box(&primitive.shape())? {
                Some(bounds) => boxed.push(BoxedPrimitive {
                    bounds,
                    primitive: Arc::clone(primitive),
                }),
                None => unboxed.push(Arc::clone(primitive)),
            }
        }
        Ok((boxed, unboxed))
    }

    fn ready(&self) -> QueryResult<&SpaceIndex> {
        self.index.as_ref().ok_or(QueryError::NotInitialized)
    }

    fn check_t_max(t_max: f32) -> QueryResult<()> {
        if t_max < 0.0 {
            return Err(QueryError::NegativeTMax(t_max));
        }
        Ok(())
    }

    /// The single closest intersection along the ray with `t <= t_max`, or
    /// `None` if the ray hits nothing in range.
    pub fn nearest_intersection(&self, ray: &Ray, t_max: f32) -> QueryResult<Option<Hit>> {
        let index = self.ready()?;
        Self::check_t_max(t_max)?;

        Ok(match index {
            SpaceIndex::Linear(linear) => linear.nearest(ray, t_max, &self.tests),
            SpaceIndex::Voxel { grid, fallback } => {
                let fall = fallback.nearest(ray, t_max, &self.tests);
                let cap = fall.as_ref().map_or(f32::INFINITY, |h| h.t);
                match grid.nearest(ray, t_max, cap, &self.tests) {
                    Some(hit) if fall.as_ref().map_or(true, |f| hit.t < f.t) => Some(hit),
                    _ => fall,
                }
            }
            SpaceIndex::MultiVoxel { grids, fallback } => {
                let fall = fallback.nearest(ray, t_max, &self.tests);
                grids.nearest(ray, t_max, fall, &self.tests)
            }
        })
    }

    /// Intersections along the ray in descending `t` order: all transparent
    /// hits up to the first opaque one, which (if present) heads the list.
    pub fn nearest_opaque_intersection_list(
        &self,
        ray: &Ray,
        t_max: f32,
    ) -> QueryResult<Vec<Hit>> {
        let index = self.ready()?;
        Self::check_t_max(t_max)?;

        let mut chain = match index {
            SpaceIndex::Linear(linear) => linear.opaque_chain(ray, t_max, &self.tests),
            SpaceIndex::Voxel { grid, fallback } => {
                let mut chain = fallback.opaque_chain(ray, t_max, &self.tests);
                let cap = chain
                    .iter()
                    .find(|h| !h.transparent)
                    .map_or(f32::INFINITY, |h| h.t);
                chain.extend(grid.opaque_chain(ray, t_max, cap, &self.tests));
                sort_ascending(&mut chain);
                truncate_at_first_opaque(&mut chain);
                chain
            }
            SpaceIndex::MultiVoxel { grids, fallback } => {
                let seed = fallback.opaque_chain(ray, t_max, &self.tests);
                grids.opaque_chain(ray, t_max, seed, &self.tests)
            }
        };

        chain.reverse();
        Ok(chain)
    }

    /// Every closed primitive whose volume contains the point.
    pub fn list_containing_point(&self, point: Vec3) -> QueryResult<Vec<PrimitiveRef>> {
        let index = self.ready()?;

        Ok(match index {
            SpaceIndex::Linear(linear) => linear.containing_point(point),
            SpaceIndex::Voxel { grid, fallback } => {
                let mut found = grid.containing_point(point);
                found.extend(fallback.containing_point(point));
                found
            }
            SpaceIndex::MultiVoxel { grids, fallback } => {
                let mut found = grids.containing_point(point);
                found.extend(fallback.containing_point(point));
                found
            }
        })
    }

    /// Number of primitive intersection tests issued so far.
    ///
    /// Instrumentation only; updated with relaxed atomics, so concurrent
    /// readers may momentarily lag.
    pub fn intersection_tests(&self) -> u64 {
        self.tests.load(Ordering::Relaxed)
    }

    /// Reset the intersection-test counter.
    pub fn reset_intersection_tests(&self) {
        self.tests.store(0, Ordering::Relaxed);
    }
}
