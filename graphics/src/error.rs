//! Graphics error types.

use thiserror::Error;
use vbmirror_core::AllocError;

/// Errors that can occur when managing mirrored vertex buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphicsError {
    /// A capacity, layer count, size or index exceeded its bound.
    #[error("{what} out of range: {value} (limit {limit})")]
    OutOfRange {
        what: &'static str,
        value: usize,
        limit: usize,
    },
    /// The subsystem did not return a buffer handle.
    #[error("resource creation failed: {0}")]
    ResourceCreationFailed(String),
    /// An external buffer could not be imported.
    #[error("invalid source: {0}")]
    InvalidSource(String),
    /// A graphics context could not be acquired.
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    /// Host memory for the attribute arrays could not be allocated.
    #[error("out of host memory: {0}")]
    OutOfMemory(#[from] AllocError),
}

/// Result alias for graphics operations.
pub type GraphicsResult<T> = Result<T, GraphicsError>;

impl GraphicsError {
    pub(crate) fn out_of_range(what: &'static str, value: usize, limit: usize) -> Self {
        Self::OutOfRange { what, value, limit }
    }
}
