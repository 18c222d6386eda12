//! Error types for occupancy operations.

use thiserror::Error;

/// Errors that can occur while building an occupancy map or spatial index.
///
/// Queries on a constructed map never fail; the only failure point is
/// construction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OccupancyError {
    /// The input cannot produce a valid map (for example, no triangles).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for occupancy operations.
pub type OccupancyResult<T> = std::result::Result<T, OccupancyError>;
