//! # vbmirror Graphics
//!
//! Host-managed mirrors of GPU vertex buffers.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`VertexBuffer`] - Aligned per-attribute host arrays with an owned GPU buffer
//! - [`GraphicsSubsystem`] - Trait the external rendering subsystem implements
//! - [`GraphicsContext`] - Scoped graphics context guard
//! - [`DummySubsystem`] - In-process subsystem for tests and tooling
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use vbmirror_graphics::{DummySubsystem, GraphicsSubsystem, VertexBuffer};
//!
//! let subsystem: Arc<dyn GraphicsSubsystem> = Arc::new(DummySubsystem::new());
//! let mut buffer = VertexBuffer::new(subsystem, 3, 1)?;
//! buffer.at_mut(0)?.position.x = 1.0;
//! let handle = buffer.update()?;
//! ```

pub mod backend;
pub mod context;
pub mod error;
pub mod limits;
pub mod resources;
pub mod types;

// Re-export main types for convenience
pub use backend::{
    BufferHandle, DummyStats, DummySubsystem, ExternalVertexData, GraphicsSubsystem,
};
pub use context::GraphicsContext;
pub use error::{GraphicsError, GraphicsResult};
pub use limits::{MAXIMUM_UVW_LAYERS, MAXIMUM_VERTICES};
pub use resources::{
    GpuVertexBuffer, TeardownStatus, TexVertArray, Vertex, VertexBuffer, VertexData, VertexMut,
};
pub use types::{
    BufferConfig, BufferFlags, LEGACY_HOST_DATA_VERSION, SemanticVersion, TeardownPolicy,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging-visible library state.
///
/// Call once at startup, after the logger is installed.
pub fn init() {
    vbmirror_core::init();
    log::info!("vbmirror graphics v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_dummy_subsystem() {
        let subsystem = DummySubsystem::new();
        assert_eq!(subsystem.name(), "Dummy");
    }
}
