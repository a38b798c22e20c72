//! Owning handle to a subsystem vertex buffer.

use std::ptr::NonNull;
use std::sync::Arc;

use crate::backend::{BufferHandle, GraphicsSubsystem};
use crate::context::GraphicsContext;
use crate::error::{GraphicsError, GraphicsResult};
use crate::types::{BufferFlags, TeardownPolicy};

use super::VertexData;

/// Outcome of releasing a [`GpuVertexBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TeardownStatus {
    /// There was no buffer to release.
    Empty,
    /// The buffer was destroyed under a graphics context.
    Destroyed,
    /// No context was available; only the subsystem's host data was released.
    HostDataReleased,
    /// No context was available and the policy did not allow a fallback.
    Leaked,
}

/// Exclusive owner of one subsystem vertex buffer.
///
/// The buffer is destroyed exactly once: by [`release`](Self::release) or on
/// drop, whichever comes first.
pub struct GpuVertexBuffer {
    subsystem: Arc<dyn GraphicsSubsystem>,
    handle: Option<BufferHandle>,
    policy: TeardownPolicy,
}

impl GpuVertexBuffer {
    /// Create a buffer from `data` under `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::ResourceCreationFailed`] if the subsystem
    /// returns no handle.
    pub(crate) fn create(
        subsystem: &Arc<dyn GraphicsSubsystem>,
        ctx: &GraphicsContext<'_>,
        data: &VertexData,
        flags: BufferFlags,
        policy: TeardownPolicy,
    ) -> GraphicsResult<Self> {
        let handle = ctx.subsystem().create_vertex_buffer(data, flags).ok_or_else(|| {
            GraphicsError::ResourceCreationFailed(format!(
                "{} returned no vertex buffer for {} vertices",
                ctx.subsystem().name(),
                data.num
            ))
        })?;

        Ok(Self {
            subsystem: Arc::clone(subsystem),
            handle: Some(handle),
            policy,
        })
    }

    /// The owned handle, if not yet released.
    pub fn handle(&self) -> Option<BufferHandle> {
        self.handle
    }

    /// Push `data` into the buffer and return the subsystem's refreshed data
    /// block.
    pub(crate) fn flush(
        &self,
        ctx: &GraphicsContext<'_>,
        data: &VertexData,
    ) -> Option<NonNull<VertexData>> {
        let handle = self.handle?;
        ctx.subsystem().flush_vertex_buffer(handle, data);
        ctx.subsystem().vertex_buffer_data(handle)
    }

    /// Release the buffer.
    ///
    /// Tries to destroy it under a fresh graphics context. If the context is
    /// unavailable the [`TeardownPolicy`] decides between releasing only the
    /// subsystem's host data and leaking. Never panics; calling again returns
    /// [`TeardownStatus::Empty`].
    pub fn release(&mut self) -> TeardownStatus {
        let Some(handle) = self.handle.take() else {
            return TeardownStatus::Empty;
        };

        match GraphicsContext::enter(&*self.subsystem) {
            Ok(ctx) => {
                ctx.subsystem().destroy_vertex_buffer(handle);
                log::debug!("Destroyed vertex buffer {}", handle.raw());
                TeardownStatus::Destroyed
            }
            Err(err) => {
                let version = self.subsystem.version();
                if self.policy.releases_host_data(version) {
                    log::warn!(
                        "Cannot destroy vertex buffer {} ({}), releasing host data on {} {}",
                        handle.raw(),
                        err,
                        self.subsystem.name(),
                        version
                    );
                    self.subsystem.release_vertex_data(handle);
                    TeardownStatus::HostDataReleased
                } else {
                    log::warn!(
                        "Cannot destroy vertex buffer {} ({}), leaking it",
                        handle.raw(),
                        err
                    );
                    TeardownStatus::Leaked
                }
            }
        }
    }
}

impl Drop for GpuVertexBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for GpuVertexBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuVertexBuffer")
            .field("subsystem", &self.subsystem.name())
            .field("handle", &self.handle)
            .field("policy", &self.policy)
            .finish()
    }
}

static_assertions::assert_impl_all!(GpuVertexBuffer: Send, Sync);
