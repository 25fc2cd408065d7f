//! Single voxel grid queries.
//!
//! A grid owns one cell dimension and one voxel map. Queries walk the ray's
//! cells in order and only test the primitives located in each cell. A hit
//! only counts while the walk is in the cell the hit point itself maps to;
//! that rule keeps primitives that straddle several cells from being
//! accepted early (or twice) and makes the first accepted cell hit the
//! nearest one overall.

use std::sync::atomic::{AtomicU64, Ordering};

use raygrid_math::{Ray, Vec3};

use crate::bounds::BoxedPrimitive;
use crate::primitive::{Hit, Primitive, PrimitiveRef};
use crate::space::linear::{sort_ascending, truncate_at_first_opaque};
use crate::traversal::{GridTraversal, VoxelStep};
use crate::voxel::{to_voxel, to_voxels, VoxelMap};

/// One uniform grid: cell dimension plus the populated cell map.
pub(crate) struct GridIndex {
    dimension: f32,
    map: VoxelMap,
}

impl GridIndex {
    /// Assign every boxed primitive of a bucket to the cells its box
    /// overlaps.
    pub fn build(dimension: f32, bucket: Vec<BoxedPrimitive>) -> Self {
        let mut map = VoxelMap::new();
        for boxed in bucket {
            for voxel in to_voxels(&boxed.bounds, dimension) {
                map.insert(voxel, boxed.primitive.clone());
            }
        }
        Self { dimension, map }
    }

    pub fn cell_count(&self) -> usize {
        self.map.cell_count()
    }

    /// Start a traversal of this grid for a ray.
    pub fn traversal(&self, ray: &Ray, t_max: f32) -> GridTraversal {
        GridTraversal::new(ray, t_max, self.dimension, self.map.extremum())
    }

    /// Closest valid hit inside one cell, or `None` if the cell has no
    /// primitives or none of them produce a hit that maps back to this cell.
    pub fn best_in_cell(
        &self,
        step: &VoxelStep,
        ray: &Ray,
        t_max: f32,
        tests: &AtomicU64,
    ) -> Option<Hit> {
        let primitives = self.map.get(step.voxel)?;
        let mut best: Option<Hit> = None;

        for primitive in primitives {
            tests.fetch_add(1, Ordering::Relaxed);
            if let Some(surface) = primitive.intersect(ray) {
                if surface.t < 0.0 || surface.t > t_max {
                    continue;
                }
                // Only accept the hit in the cell it actually lies in.
                if to_voxel(surface.position, self.dimension) != step.voxel {
                    continue;
                }
                if best.as_ref().map_or(true, |b| surface.t < b.t) {
                    best = Some(Hit::new(surface, primitive));
                }
            }
        }

        best
    }

    /// All valid hits inside one cell, ascending by `t`.
    pub fn hits_in_cell(
        &self,
        step: &VoxelStep,
        ray: &Ray,
        t_max: f32,
        tests: &AtomicU64,
    ) -> Vec<Hit> {
        let Some(primitives) = self.map.get(step.voxel) else {
            return Vec::new();
        };
        let mut hits = Vec::new();

        for primitive in primitives {
            tests.fetch_add(1, Ordering::Relaxed);
            if let Some(surface) = primitive.intersect(ray) {
                if surface.t >= 0.0
                    && surface.t <= t_max
                    && to_voxel(surface.position, self.dimension) == step.voxel
                {
                    hits.push(Hit::new(surface, primitive));
                }
            }
        }

        sort_ascending(&mut hits);
        hits
    }

    /// Closest hit through the grid. `cap` is the best `t` already known
    /// from elsewhere (e.g. the fallback list); cells entered after it
    /// cannot improve on it and end the walk.
    pub fn nearest(&self, ray: &Ray, t_max: f32, cap: f32, tests: &AtomicU64) -> Option<Hit> {
        for step in self.traversal(ray, t_max) {
            if step.enter > cap {
                return None;
            }
            if let Some(hit) = self.best_in_cell(&step, ray, t_max, tests) {
                // Walk order guarantees no later cell holds a closer hit.
                return Some(hit);
            }
        }
        None
    }

    /// Ascending chain of valid hits up to and including the grid's first
    /// opaque hit. `cap` bounds the walk the same way as in `nearest`.
    pub fn opaque_chain(&self, ray: &Ray, t_max: f32, cap: f32, tests: &AtomicU64) -> Vec<Hit> {
        let mut chain = Vec::new();

        for step in self.traversal(ray, t_max) {
            if step.enter > cap {
                break;
            }
            let cell_hits = self.hits_in_cell(&step, ray, t_max, tests);
            let found_opaque = cell_hits.iter().any(|h| !h.transparent);
            chain.extend(cell_hits);
            if found_opaque {
                truncate_at_first_opaque(&mut chain);
                break;
            }
        }

        chain
    }

    /// Closed primitives in the point's cell that contain the point.
    pub fn containing_point(&self, point: Vec3) -> Vec<PrimitiveRef> {
        match self.map.get(to_voxel(point, self.dimension)) {
            Some(primitives) => primitives
                .iter()
                .filter(|p| p.is_closed() && p.contains(point))
                .cloned()
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::bounding_box;
    use crate::primitive::Primitive;
    use crate::testutil::TestSphere;
    use raygrid_math::IVec3;

    fn grid_of(dimension: f32, primitives: Vec<PrimitiveRef>) -> GridIndex {
        let bucket = primitives
            .into_iter()
            .map(|primitive| {
                let bounds = bounding_box(&primitive.shape()).unwrap().unwrap();
                BoxedPrimitive { bounds, primitive }
            })
            .collect();
        GridIndex::build(dimension, bucket)
    }

    fn counter() -> AtomicU64 {
        AtomicU64::new(0)
    }

    #[test]
    fn test_build_populates_straddled_cells() {
        let grid = grid_of(1.0, vec![TestSphere::solid(Vec3::ZERO, 0.5)]);

        // Box spans [-0.5, 0.5] per axis, so 2^3 cells.
        assert_eq!(grid.cell_count(), 8);
        assert!(grid.map.get(IVec3::new(-1, -1, -1)).is_some());
        assert!(grid.map.get(IVec3::new(0, 0, 0)).is_some());
        assert!(grid.map.get(IVec3::new(1, 0, 0)).is_none());
    }

    #[test]
    fn test_nearest_through_grid() {
        let grid = grid_of(1.0, vec![TestSphere::solid(Vec3::ZERO, 0.5)]);
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));

        let hit = grid
            .nearest(&ray, 100.0, f32::INFINITY, &counter())
            .unwrap();

        assert_eq!(hit.t, 4.5);
        assert_eq!(hit.position, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn test_nearest_skips_untouched_primitives() {
        // A sphere far off the ray's path shares no cells with the ray.
        let grid = grid_of(
            1.0,
            vec![
                TestSphere::solid(Vec3::ZERO, 0.5),
                TestSphere::solid(Vec3::new(0.0, 50.0, 0.0), 0.5),
            ],
        );
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));

        let tests = counter();
        let hit = grid.nearest(&ray, 100.0, f32::INFINITY, &tests).unwrap();

        assert_eq!(hit.t, 4.5);
        // Only the on-path sphere was ever tested, and only in cells the
        // walk reached.
        assert!(tests.load(Ordering::Relaxed) < 4);
    }

    #[test]
    fn test_straddling_hit_accepted_in_its_own_cell_only() {
        // Sphere straddles cells around the origin; the ray approaches from
        // +x and must accept the hit while walking cell (0, 0, 0), which the
        // hit point (0.5, 0, 0) maps to.
        let grid = grid_of(1.0, vec![TestSphere::solid(Vec3::ZERO, 0.5)]);
        let ray = Ray::new(Vec3::new(3.0, 0.2, 0.2), Vec3::new(-1.0, 0.0, 0.0));

        let hit = grid
            .nearest(&ray, 100.0, f32::INFINITY, &counter())
            .unwrap();
        assert_eq!(
            to_voxel(hit.position, 1.0),
            IVec3::new(0, 0, 0)
        );
    }

    #[test]
    fn test_nearest_respects_cap() {
        let grid = grid_of(1.0, vec![TestSphere::solid(Vec3::ZERO, 0.5)]);
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));

        // A known hit at t=2 means no cell entered after t=2 is worth
        // visiting; the sphere's cell starts at t=4.
        assert!(grid.nearest(&ray, 100.0, 2.0, &counter()).is_none());
    }

    #[test]
    fn test_opaque_chain_through_grid() {
        let grid = grid_of(
            1.0,
            vec![
                TestSphere::glass(Vec3::new(2.0, 0.0, 0.0), 0.5),
                TestSphere::solid(Vec3::new(6.0, 0.0, 0.0), 0.5),
                TestSphere::glass(Vec3::new(10.0, 0.0, 0.0), 0.5), // behind the occluder
            ],
        );
        let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::X);

        let chain = grid.opaque_chain(&ray, 100.0, f32::INFINITY, &counter());

        assert_eq!(chain.len(), 2);
        assert!(chain[0].transparent);
        assert_eq!(chain[0].t, 1.5);
        assert!(!chain[1].transparent);
        assert_eq!(chain[1].t, 5.5);
    }

    #[test]
    fn test_containing_point_uses_single_cell() {
        let inside = TestSphere::solid(Vec3::ZERO, 0.5);
        let far = TestSphere::solid(Vec3::new(20.0, 0.0, 0.0), 0.5);
        let grid = grid_of(1.0, vec![inside.clone(), far]);

        let found = grid.containing_point(Vec3::new(0.1, 0.1, 0.1));

        assert_eq!(found.len(), 1);
        assert!(std::sync::Arc::ptr_eq(&found[0], &inside));
        assert!(grid.containing_point(Vec3::new(5.0, 5.0, 5.0)).is_empty());
    }
}
