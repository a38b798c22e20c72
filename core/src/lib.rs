//! # vbmirror core
//!
//! CPU-side building blocks for mirrored vertex buffers: 16-byte aligned
//! vector types, packed colors, and owning over-aligned storage.

pub mod aligned;
pub mod color;
pub mod math;

pub use aligned::{AlignedBuffer, AllocError};
pub use math::{Vec3, Vec4};

/// Core library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log the core library version.
pub fn init() {
    log::info!("vbmirror core v{} initialized", VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
