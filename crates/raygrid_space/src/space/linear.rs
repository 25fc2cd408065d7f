//! Exhaustive primitive testing.
//!
//! Used directly by the linear space variant and as the fallback path every
//! grid variant runs for primitives without a bounding box.

use std::sync::atomic::{AtomicU64, Ordering};

use raygrid_math::{Ray, Vec3};

use crate::primitive::{Hit, Primitive, PrimitiveRef};

/// A plain list of primitives, tested one by one.
pub(crate) struct LinearIndex {
    primitives: Vec<PrimitiveRef>,
}

impl LinearIndex {
    pub fn new(primitives: Vec<PrimitiveRef>) -> Self {
        Self { primitives }
    }

    /// Closest valid hit with `0 <= t <= t_max`.
    pub fn nearest(&self, ray: &Ray, t_max: f32, tests: &AtomicU64) -> Option<Hit> {
        let mut best: Option<Hit> = None;

        for primitive in &self.primitives {
            tests.fetch_add(1, Ordering::Relaxed);
            if let Some(surface) = primitive.intersect(ray) {
                if surface.t < 0.0 || surface.t > t_max {
                    continue;
                }
                if best.as_ref().map_or(true, |b| surface.t < b.t) {
                    best = Some(Hit::new(surface, primitive));
                }
            }
        }

        best
    }

    /// All valid hits in ascending `t` order, cut off after the first opaque
    /// hit.
    pub fn opaque_chain(&self, ray: &Ray, t_max: f32, tests: &AtomicU64) -> Vec<Hit> {
        let mut hits = Vec::new();

        for primitive in &self.primitives {
            tests.fetch_add(1, Ordering::Relaxed);
            if let Some(surface) = primitive.intersect(ray) {
                if surface.t >= 0.0 && surface.t <= t_max {
                    hits.push(Hit::new(surface, primitive));
                }
            }
        }

        sort_ascending(&mut hits);
        truncate_at_first_opaque(&mut hits);
        hits
    }

    /// Closed primitives whose volume contains the point.
    pub fn containing_point(&self, point: Vec3) -> Vec<PrimitiveRef> {
        self.primitives
            .iter()
            .filter(|p| p.is_closed() && p.contains(point))
            .cloned()
            .collect()
    }
}

/// Sort hits by ascending ray parameter.
pub(crate) fn sort_ascending(hits: &mut [Hit]) {
    hits.sort_by(|a, b| a.t.total_cmp(&b.t));
}

/// Keep everything up to and including the first opaque hit; drop the rest.
///
/// Applied to an ascending chain this yields the canonical composition: all
/// transparent hits in front of the occluder, then the occluder itself.
pub(crate) fn truncate_at_first_opaque(hits: &mut Vec<Hit>) {
    if let Some(i) = hits.iter().position(|h| !h.transparent) {
        hits.truncate(i + 1);
    }
}
