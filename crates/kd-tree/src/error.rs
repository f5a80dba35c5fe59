//! Error type for k-d tree operations.

use thiserror::Error;

/// Errors reported by index construction, insertion, queries and partitioning.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KdTreeError {
    /// The index was configured with zero dimensions.
    #[error("k-d tree dimension must be at least 1")]
    InvalidDimension,

    /// A point or bounds corner does not match the index dimension.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Bounds whose minimum exceeds the maximum on some axis.
    #[error("bounds are inverted on axis {axis}")]
    InvertedBounds { axis: usize },
}

/// Result type for k-d tree operations.
pub type Result<T> = std::result::Result<T, KdTreeError>;
