//! Bucket splitting for multi-grid construction.
//!
//! Groups boxed primitives into buckets of similarly sized boxes; each final
//! bucket becomes one voxel grid. The size measure throughout is the box's
//! longest side (`Aabb::max_extent`).
//!
//! The recursive strategies run on an explicit worklist carrying the
//! remaining depth, so stack depth stays flat no matter how many primitives
//! come in.

use crate::bounds::BoxedPrimitive;
use crate::error::{BuildError, BuildResult};

/// Buckets at or below this size stop splitting regardless of depth.
const TERMINAL_BUCKET_LEN: usize = 100;

/// How a primitive collection is grouped into grid buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Everything with a box goes into one bucket.
    Single,
    /// Sort by extent and cut into two equal-count halves, smaller half
    /// first.
    HalfAndHalf,
    /// Recursively split below-mean / at-or-above-mean until `depth` runs out
    /// or a bucket is small enough.
    AverageSize { depth: u32 },
    /// Three-way split at mean ± sigma/2; the center bucket terminates
    /// immediately, the outer two recurse.
    HalfSigma { depth: u32 },
}

impl SplitStrategy {
    /// Resolve a numeric strategy code (for code-driven configuration).
    /// `depth` only applies to the recursive strategies.
    pub fn from_code(code: u8, depth: u32) -> BuildResult<Self> {
        match code {
            1 => Ok(SplitStrategy::Single),
            2 => Ok(SplitStrategy::HalfAndHalf),
            3 => Ok(SplitStrategy::AverageSize { depth }),
            4 => Ok(SplitStrategy::HalfSigma { depth }),
            other => Err(BuildError::UnknownSplitStrategy(other)),
        }
    }
}

/// Split a collection of boxed primitives into grid buckets.
///
/// Empty buckets are never produced; with an empty input the result is empty.
pub fn split_collection(
    strategy: SplitStrategy,
    boxed: Vec<BoxedPrimitive>,
) -> Vec<Vec<BoxedPrimitive>> {
    match strategy {
        SplitStrategy::Single => {
            if boxed.is_empty() {
                Vec::new()
            } else {
                vec![boxed]
            }
        }
        SplitStrategy::HalfAndHalf => half_and_half(boxed),
        SplitStrategy::AverageSize { depth } => split_by_mean(boxed, depth),
        SplitStrategy::HalfSigma { depth } => split_by_half_sigma(boxed, depth),
    }
}

fn half_and_half(mut boxed: Vec<BoxedPrimitive>) -> Vec<Vec<BoxedPrimitive>> {
    boxed.sort_unstable_by(|a, b| {
        a.bounds
            .max_extent()
            .partial_cmp(&b.bounds.max_extent())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mid = boxed.len() / 2;
    let larger = boxed.split_off(mid);
    let smaller = boxed;

    [smaller, larger].into_iter().filter(|b| !b.is_empty()).collect()
}

fn split_by_mean(boxed: Vec<BoxedPrimitive>, depth: u32) -> Vec<Vec<BoxedPrimitive>> {
    let mut out = Vec::new();
    let mut work = vec![(boxed, depth)];

    while let Some((bucket, depth)) = work.pop() {
        if bucket.is_empty() {
            continue;
        }
        if depth <= 1 || bucket.len() <= TERMINAL_BUCKET_LEN {
            out.push(bucket);
            continue;
        }

        let mean = mean_extent(&bucket);
        let (below, at_or_above): (Vec<_>, Vec<_>) = bucket
            .into_iter()
            .partition(|b| b.bounds.max_extent() < mean);

        work.push((below, depth - 1));
        work.push((at_or_above, depth - 1));
    }

    out
}

fn split_by_half_sigma(boxed: Vec<BoxedPrimitive>, depth: u32) -> Vec<Vec<BoxedPrimitive>> {
    let mut out = Vec::new();
    let mut work = vec![(boxed, depth)];

    while let Some((bucket, depth)) = work.pop() {
        if bucket.is_empty() {
            continue;
        }
        if depth <= 1 || bucket.len() <= TERMINAL_BUCKET_LEN {
            out.push(bucket);
            continue;
        }

        let (mean, sigma) = extent_stats(&bucket);
        let lo = mean - sigma * 0.5;
        let hi = mean + sigma * 0.5;

        let mut below = Vec::new();
        let mut center = Vec::new();
        let mut above = Vec::new();
        for b in bucket {
            let e = b.bounds.max_extent();
            if e < lo {
                below.push(b);
            } else if e > hi {
                above.push(b);
            } else {
                center.push(b);
            }
        }

        // The center band is homogeneous enough already; only the tails
        // keep splitting.
        if !center.is_empty() {
            out.push(center);
        }
        work.push((below, depth - 1));
        work.push((above, depth - 1));
    }

    out
}

fn mean_extent(bucket: &[BoxedPrimitive]) -> f32 {
    let sum: f32 = bucket.iter().map(|b| b.bounds.max_extent()).sum();
    sum / bucket.len() as f32
}

fn extent_stats(bucket: &[BoxedPrimitive]) -> (f32, f32) {
    let mean = mean_extent(bucket);
    let var: f32 = bucket
        .iter()
        .map(|b| {
            let d = b.bounds.max_extent() - mean;
            d * d
        })
        .sum::<f32>()
        / bucket.len() as f32;
    (mean, var.sqrt())
}
