//! Error types for index construction and queries.

use raygrid_math::Vec3;
use thiserror::Error;

/// Errors raised while building a geometry space.
///
/// All of these are fatal: a space whose `initialize()` failed must not be
/// queried.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("unknown split strategy code: {0}")]
    UnknownSplitStrategy(u8),

    #[error("unknown cell sizing strategy code: {0}")]
    UnknownSizingStrategy(u8),

    #[error("cell sizing strategy requires a non-empty bucket")]
    EmptySizingBucket,

    #[error("degenerate bounding box: min {min} exceeds max {max}")]
    DegenerateBounds { min: Vec3, max: Vec3 },

    #[error("initialize() called more than once")]
    AlreadyInitialized,
}

/// Errors raised by query methods when their preconditions do not hold.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("query issued before initialize()")]
    NotInitialized,

    #[error("negative t_max: {0}")]
    NegativeTMax(f32),
}

/// Result type for construction operations.
pub type BuildResult<T> = Result<T, BuildError>;

/// Result type for query operations.
pub type QueryResult<T> = Result<T, QueryError>;
