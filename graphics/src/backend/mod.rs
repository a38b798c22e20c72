//! Graphics subsystem abstraction.
//!
//! The GPU side of a mirrored vertex buffer lives in an external rendering
//! subsystem. This module defines the narrow interface the mirror needs from
//! it: context entry/exit, buffer creation and destruction, flushing, and
//! fetching the subsystem's view of a buffer's data.
//!
//! # Available Subsystems
//!
//! - [`DummySubsystem`]: in-process implementation that duplicates data into
//!   host memory and records every call, for tests and tooling.
//!
//! Real integrations implement [`GraphicsSubsystem`] over their graphics API.

pub mod dummy;

use std::num::NonZeroU64;
use std::ptr::NonNull;

use crate::error::GraphicsResult;
use crate::resources::VertexData;
use crate::types::{BufferFlags, SemanticVersion};

pub use dummy::{DummyStats, DummySubsystem, ExternalVertexData};

/// Opaque handle to a vertex buffer owned by the subsystem.
///
/// Handles are plain identifiers: copying one does not share ownership.
/// Ownership lives in [`GpuVertexBuffer`](crate::resources::GpuVertexBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(NonZeroU64);

impl BufferHandle {
    /// Wrap a raw subsystem identifier. Zero is the null handle.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    /// The raw subsystem identifier.
    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

/// Interface to the external rendering subsystem.
///
/// Every buffer call except [`release_vertex_data`](Self::release_vertex_data)
/// is made while a context obtained through
/// [`GraphicsContext`](crate::context::GraphicsContext) is held. Context entry
/// must be reentrant: importing a buffer holds a context while creating the
/// mirror's own buffer.
///
/// # Safety
///
/// Implementors guarantee that a pointer returned by
/// [`vertex_buffer_data`](Self::vertex_buffer_data) refers to a valid
/// [`VertexData`] whose non-null attribute pointers are readable for `num`
/// elements (and each UV layer for `num * width` floats) until the buffer is
/// flushed, destroyed or has its data released.
pub unsafe trait GraphicsSubsystem: Send + Sync {
    /// Subsystem name for log output.
    fn name(&self) -> &str;

    /// Version reported by the running subsystem.
    fn version(&self) -> SemanticVersion;

    /// Enter the graphics context on the calling thread.
    fn enter_context(&self) -> GraphicsResult<()>;

    /// Leave a context entered with [`enter_context`](Self::enter_context).
    fn leave_context(&self);

    /// Create a vertex buffer from a descriptor block. `None` on failure.
    fn create_vertex_buffer(&self, data: &VertexData, flags: BufferFlags)
        -> Option<BufferHandle>;

    /// Destroy a vertex buffer and everything the subsystem holds for it.
    fn destroy_vertex_buffer(&self, buffer: BufferHandle);

    /// Release only the host-side data block of a buffer. Usable without a
    /// context; older subsystems otherwise leak it when destruction fails.
    fn release_vertex_data(&self, buffer: BufferHandle);

    /// Push the contents described by `data` into the buffer.
    fn flush_vertex_buffer(&self, buffer: BufferHandle, data: &VertexData);

    /// The subsystem's data block for a buffer, if it has one.
    fn vertex_buffer_data(&self, buffer: BufferHandle) -> Option<NonNull<VertexData>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(BufferHandle::from_raw(0).is_none());
        assert_eq!(BufferHandle::from_raw(7).map(BufferHandle::raw), Some(7));
    }
}
