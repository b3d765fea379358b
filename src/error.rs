//! Error types for grid construction.

use thiserror::Error;

/// Errors raised when building a [`Grid`](crate::Grid).
///
/// Every other grid operation is total: coordinates wrap instead of
/// failing, and a tick cannot fail once the grid exists.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidDimension { width: i64, height: i64 },
    #[error("failed to build tick thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
