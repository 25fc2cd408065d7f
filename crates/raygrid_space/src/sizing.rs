//! Cell sizing heuristics.
//!
//! Chooses the uniform voxel dimension for one bucket from the size
//! statistics of its boxes. As in the splitter, a box's size is its longest
//! side.

use crate::bounds::BoxedPrimitive;
use crate::error::{BuildError, BuildResult};

/// How a bucket's voxel cell size is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingStrategy {
    /// Cells of size 1.0 regardless of content.
    Fixed,
    /// Extent of the single largest box.
    LargestExtent,
    /// Mean of the smallest and largest box extents.
    MidExtent,
    /// Extent of the single smallest box.
    SmallestExtent,
}

impl SizingStrategy {
    /// Resolve a numeric strategy code (for code-driven configuration).
    pub fn from_code(code: u8) -> BuildResult<Self> {
        match code {
            1 => Ok(SizingStrategy::Fixed),
            2 => Ok(SizingStrategy::LargestExtent),
            3 => Ok(SizingStrategy::MidExtent),
            4 => Ok(SizingStrategy::SmallestExtent),
            other => Err(BuildError::UnknownSizingStrategy(other)),
        }
    }

    /// Evaluate the cell dimension for a bucket.
    ///
    /// Every strategy except `Fixed` needs at least one box to measure and
    /// reports `BuildError::EmptySizingBucket` otherwise.
    pub fn cell_dimension(&self, bucket: &[BoxedPrimitive]) -> BuildResult<f32> {
        if let SizingStrategy::Fixed = self {
            return Ok(1.0);
        }
        if bucket.is_empty() {
            return Err(BuildError::EmptySizingBucket);
        }

        let mut smallest = f32::INFINITY;
        let mut largest = 0.0f32;
        for b in bucket {
            let e = b.bounds.max_extent();
            smallest = smallest.min(e);
            largest = largest.max(e);
        }

        Ok(match self {
            SizingStrategy::LargestExtent => largest,
            SizingStrategy::MidExtent => (smallest + largest) * 0.5,
            SizingStrategy::SmallestExtent => smallest,
            SizingStrategy::Fixed => 1.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::boxed_spheres;

    #[test]
    fn test_from_code() {
        assert_eq!(SizingStrategy::from_code(1).unwrap(), SizingStrategy::Fixed);
        assert_eq!(
            SizingStrategy::from_code(4).unwrap(),
            SizingStrategy::SmallestExtent
        );
        assert!(matches!(
            SizingStrategy::from_code(0),
            Err(BuildError::UnknownSizingStrategy(0))
        ));
    }

    #[test]
    fn test_fixed_ignores_bucket() {
        assert_eq!(SizingStrategy::Fixed.cell_dimension(&[]).unwrap(), 1.0);
        let bucket = boxed_spheres(&[3.0]);
        assert_eq!(SizingStrategy::Fixed.cell_dimension(&bucket).unwrap(), 1.0);
    }

    #[test]
    fn test_extent_strategies() {
        // Sphere extents are their diameters: 1, 4, 10 (plus epsilon
        // inflation).
        let bucket = boxed_spheres(&[0.5, 2.0, 5.0]);

        let largest = SizingStrategy::LargestExtent
            .cell_dimension(&bucket)
            .unwrap();
        let smallest = SizingStrategy::SmallestExtent
            .cell_dimension(&bucket)
            .unwrap();
        let mid = SizingStrategy::MidExtent.cell_dimension(&bucket).unwrap();

        assert!((largest - 10.0).abs() < 1.0e-3);
        assert!((smallest - 1.0).abs() < 1.0e-3);
        assert!((mid - 5.5).abs() < 1.0e-3);
    }

    #[test]
    fn test_empty_bucket_is_a_configuration_error() {
        for strategy in [
            SizingStrategy::LargestExtent,
            SizingStrategy::MidExtent,
            SizingStrategy::SmallestExtent,
        ] {
            assert!(matches!(
                strategy.cell_dimension(&[]),
                Err(BuildError::EmptySizingBucket)
            ));
        }
    }
}
