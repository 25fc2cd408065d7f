//! Multi-resolution grid ensemble.
//!
//! Several grids of different cell sizes cover the same scene, each holding
//! one bucket of similarly sized primitives. A query runs one traversal per
//! grid and interleaves them through a min-heap keyed on the entry time of
//! each traversal's next cell, so the cell that starts soonest — in whichever
//! grid — is always processed first. Popping stops as soon as the heap's
//! minimum entry time exceeds the best hit found: no remaining grid can beat
//! it.

use std::cmp::Ordering as CmpOrdering;
use std::collections::BinaryHeap;
use std::sync::atomic::AtomicU64;

use raygrid_math::{Ray, Vec3};

use crate::primitive::{Hit, PrimitiveRef};
use crate::space::grid::GridIndex;
use crate::space::linear::{sort_ascending, truncate_at_first_opaque};
use crate::traversal::GridTraversal;

pub(crate) struct MultiGridIndex {
    grids: Vec<GridIndex>,
}

/// One grid's traversal waiting in the scheduling heap, keyed by the entry
/// time of its next cell.
struct PendingGrid {
    enter: f32,
    grid: usize,
    walk: GridTraversal,
}

impl PartialEq for PendingGrid {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == CmpOrdering::Equal
    }
}

impl Eq for PendingGrid {}

impl PartialOrd for PendingGrid {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingGrid {
    fn cmp(&self, other: &Self) -> CmpOrdering {
        // Reversed: BinaryHeap is a max-heap, we want the smallest entry
        // time on top. Ties go to the lower grid index for determinism.
        other
            .enter
            .total_cmp(&self.enter)
            .then_with(|| other.grid.cmp(&self.grid))
    }
}

impl MultiGridIndex {
    pub fn new(grids: Vec<GridIndex>) -> Self {
        Self { grids }
    }

    fn schedule(&self, ray: &Ray, t_max: f32) -> BinaryHeap<PendingGrid> {
        self.grids
            .iter()
            .enumerate()
            .filter_map(|(grid, g)| {
                let walk = g.traversal(ray, t_max);
                let enter = walk.peek()?.enter;
                Some(PendingGrid { enter, grid, walk })
            })
            .collect()
    }

    /// Closest hit across all grids, seeded with the best hit already known
    /// from the fallback list.
    pub fn nearest(
        &self,
        ray: &Ray,
        t_max: f32,
        seed: Option<Hit>,
        tests: &AtomicU64,
    ) -> Option<Hit> {
        let mut best = seed;
        let mut heap = self.schedule(ray, t_max);

        while let Some(mut pending) = heap.pop() {
            if let Some(b) = &best {
                if pending.enter > b.t {
                    break;
                }
            }
            let Some(step) = pending.walk.next() else {
                continue;
            };

            match self.grids[pending.grid].best_in_cell(&step, ray, t_max, tests) {
                Some(hit) => {
                    // This grid is done: its walk only gets farther from
                    // here on.
                    if best.as_ref().map_or(true, |b| hit.t < b.t) {
                        best = Some(hit);
                    }
                }
                None => {
                    if let Some(next) = pending.walk.peek() {
                        pending.enter = next.enter;
                        heap.push(pending);
                    }
                }
            }
        }

        best
    }

    /// Merge every grid's hit chain with the fallback chain: all valid hits
    /// in ascending order, cut off after the first opaque hit overall.
    pub fn opaque_chain(
        &self,
        ray: &Ray,
        t_max: f32,
        seed: Vec<Hit>,
        tests: &AtomicU64,
    ) -> Vec<Hit> {
        let mut chain = seed;
        let mut first_opaque_t = chain
            .iter()
            .find(|h| !h.transparent)
            .map_or(f32::INFINITY, |h| h.t);
        let mut heap = self.schedule(ray, t_max);

        while let Some(mut pending) = heap.pop() {
            // Cells entered past the nearest known occluder only hold hits
            // the final truncation would drop anyway.
            if pending.enter > first_opaque_t {
                break;
            }
            let Some(step) = pending.walk.next() else {
                continue;
            };

            let cell_hits = self.grids[pending.grid].hits_in_cell(&step, ray, t_max, tests);
            let cell_opaque_t = cell_hits
                .iter()
                .find(|h| !h.transparent)
                .map(|h| h.t);
            chain.extend(cell_hits);

            match cell_opaque_t {
                Some(t) => {
                    // This grid stops at its first occluder.
                    first_opaque_t = first_opaque_t.min(t);
                }
                None => {
                    if let Some(next) = pending.walk.peek() {
                        pending.enter = next.enter;
                        heap.push(pending);
                    }
                }
            }
        }

        sort_ascending(&mut chain);
        truncate_at_first_opaque(&mut chain);
        chain
    }

    /// Closed primitives containing the point, collected from the point's
    /// cell in every grid.
    pub fn containing_point(&self, point: Vec3) -> Vec<PrimitiveRef> {
        self.grids
            .iter()
            .flat_map(|g| g.containing_point(point))
            .collect()
    }
}
