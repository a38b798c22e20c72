//! Dummy graphics subsystem for testing and development.
//!
//! This subsystem doesn't talk to a GPU. It duplicates every descriptor block
//! it is handed into host memory, serves those copies back through
//! [`GraphicsSubsystem::vertex_buffer_data`], and records every call so tests
//! can check that buffers are created, flushed and destroyed exactly as often
//! as expected.
//!
//! Failure modes can be injected: buffer creation can be disabled, the
//! graphics context can be made unavailable, and the reported version can be
//! set to exercise version-gated teardown.

use std::collections::HashMap;
use std::ptr::{self, NonNull};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use vbmirror_core::Vec3;

use crate::error::{GraphicsError, GraphicsResult};
use crate::resources::{TexVertArray, VertexData};
use crate::types::{BufferFlags, SemanticVersion};

use super::{BufferHandle, GraphicsSubsystem};

/// One UV layer of an [`ExternalVertexData`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalUvLayer {
    /// Components per vertex.
    pub width: usize,
    /// `vertex_count * width` floats. Empty means the layer has no array.
    pub data: Vec<f32>,
}

/// Owned vertex data as the subsystem stores it.
///
/// Empty attribute vectors are exposed as null pointers in the descriptor
/// block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalVertexData {
    pub vertex_count: usize,
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tangents: Vec<Vec3>,
    pub colors: Vec<u32>,
    pub uv_layers: Vec<ExternalUvLayer>,
}

impl ExternalVertexData {
    /// Data for `vertex_count` vertices with no attributes.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            ..Self::default()
        }
    }

    /// Set positions.
    pub fn with_positions(mut self, positions: Vec<Vec3>) -> Self {
        self.positions = positions;
        self
    }

    /// Set normals.
    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = normals;
        self
    }

    /// Set tangents.
    pub fn with_tangents(mut self, tangents: Vec<Vec3>) -> Self {
        self.tangents = tangents;
        self
    }

    /// Set packed colors.
    pub fn with_colors(mut self, colors: Vec<u32>) -> Self {
        self.colors = colors;
        self
    }

    /// Append a UV layer of the given width.
    pub fn with_uv_layer(mut self, width: usize, data: Vec<f32>) -> Self {
        self.uv_layers.push(ExternalUvLayer { width, data });
        self
    }

    /// Check that every non-empty array covers `vertex_count` vertices.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidSource`] naming the first short array.
    pub fn validate(&self) -> GraphicsResult<()> {
        let count = self.vertex_count;
        let check = |name: &str, len: usize, needed: usize| {
            if len != 0 && len < needed {
                return Err(GraphicsError::InvalidSource(format!(
                    "{} holds {} elements, {} vertices need {}",
                    name, len, count, needed
                )));
            }
            Ok(())
        };

        check("positions", self.positions.len(), count)?;
        check("normals", self.normals.len(), count)?;
        check("tangents", self.tangents.len(), count)?;
        check("colors", self.colors.len(), count)?;
        for (index, layer) in self.uv_layers.iter().enumerate() {
            let needed = count.checked_mul(layer.width).ok_or_else(|| {
                GraphicsError::InvalidSource(format!(
                    "UV layer {} width {} overflows for {} vertices",
                    index, layer.width, count
                ))
            })?;
            check("UV layer", layer.data.len(), needed)?;
        }
        Ok(())
    }

    /// Copy everything a descriptor block points at.
    ///
    /// # Safety
    ///
    /// `data` must satisfy the pointer validity rules of
    /// [`GraphicsSubsystem`].
    unsafe fn from_descriptor(data: &VertexData) -> Self {
        let vec3s = |lanes: Option<&[f32]>| -> Vec<Vec3> {
            lanes
                .map(|l| {
                    l.chunks_exact(4)
                        .map(|c| Vec3::new(c[0], c[1], c[2]))
                        .collect()
                })
                .unwrap_or_default()
        };

        Self {
            vertex_count: data.num,
            positions: vec3s(data.points_f32()),
            normals: vec3s(data.normals_f32()),
            tangents: vec3s(data.tangents_f32()),
            colors: data.colors().map(<[u32]>::to_vec).unwrap_or_default(),
            uv_layers: data
                .tex_arrays()
                .iter()
                .map(|entry| ExternalUvLayer {
                    width: entry.width,
                    data: entry.floats(data.num).map(<[f32]>::to_vec).unwrap_or_default(),
                })
                .collect(),
        }
    }
}

/// Call counters recorded by [`DummySubsystem`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DummyStats {
    /// Buffers created through `create_vertex_buffer`.
    pub created: usize,
    /// Creation attempts rejected while creation was disabled.
    pub failed_creates: usize,
    /// Buffers destroyed.
    pub destroyed: usize,
    /// Host data blocks released without destroying the buffer.
    pub host_data_released: usize,
    /// Flushes performed.
    pub flushes: usize,
    /// Flags of the most recent creation.
    pub last_flags: Option<BufferFlags>,
    /// UV layer count of each created buffer, in creation order.
    pub created_layer_counts: Vec<usize>,
    /// UV layer count of each destroyed buffer, in destruction order.
    pub destroyed_layer_counts: Vec<usize>,
}

/// Host copy of a buffer's data plus the descriptor block pointing into it.
struct HostBlock {
    source: ExternalVertexData,
    // Kept alive for `data.tvarray`.
    _table: Vec<TexVertArray>,
    data: Box<VertexData>,
}

// SAFETY: every pointer in `data` and `_table` refers to heap memory owned by
// this same HostBlock, which is only reached through the subsystem mutex.
unsafe impl Send for HostBlock {}

impl HostBlock {
    fn new(mut source: ExternalVertexData) -> Self {
        fn ptr_or_null<T>(v: &mut Vec<T>) -> *mut T {
            if v.is_empty() {
                ptr::null_mut()
            } else {
                v.as_mut_ptr()
            }
        }

        let mut table: Vec<TexVertArray> = source
            .uv_layers
            .iter_mut()
            .map(|layer| TexVertArray {
                width: layer.width,
                array: ptr_or_null(&mut layer.data).cast(),
            })
            .collect();

        let data = Box::new(VertexData {
            num: source.vertex_count,
            points: ptr_or_null(&mut source.positions),
            normals: ptr_or_null(&mut source.normals),
            tangents: ptr_or_null(&mut source.tangents),
            colors: ptr_or_null(&mut source.colors),
            num_tex: table.len(),
            tvarray: ptr_or_null(&mut table),
        });

        Self {
            source,
            _table: table,
            data,
        }
    }
}

struct DummyBuffer {
    layer_count: usize,
    host: Option<HostBlock>,
}

#[derive(Default)]
struct DummyState {
    buffers: HashMap<BufferHandle, DummyBuffer>,
    stats: DummyStats,
}

/// Dummy graphics subsystem.
pub struct DummySubsystem {
    version: SemanticVersion,
    state: Mutex<DummyState>,
    next_id: AtomicU64,
    context_depth: AtomicUsize,
    context_available: AtomicBool,
    creation_enabled: AtomicBool,
}

impl DummySubsystem {
    /// Version reported unless overridden.
    pub const DEFAULT_VERSION: SemanticVersion = SemanticVersion::new(30, 0, 0);

    /// Create a new dummy subsystem.
    pub fn new() -> Self {
        Self::with_version(Self::DEFAULT_VERSION)
    }

    /// Create a dummy subsystem reporting `version`.
    pub fn with_version(version: SemanticVersion) -> Self {
        Self {
            version,
            state: Mutex::new(DummyState::default()),
            next_id: AtomicU64::new(1),
            context_depth: AtomicUsize::new(0),
            context_available: AtomicBool::new(true),
            creation_enabled: AtomicBool::new(true),
        }
    }

    /// Make context entry succeed or fail.
    pub fn set_context_available(&self, available: bool) {
        self.context_available.store(available, Ordering::Release);
    }

    /// Make buffer creation succeed or return no handle.
    pub fn set_creation_enabled(&self, enabled: bool) {
        self.creation_enabled.store(enabled, Ordering::Release);
    }

    /// Number of contexts currently entered.
    pub fn context_depth(&self) -> usize {
        self.context_depth.load(Ordering::Acquire)
    }

    /// Snapshot of the call counters.
    pub fn stats(&self) -> DummyStats {
        self.state.lock().stats.clone()
    }

    /// Number of buffers not yet destroyed, including externally inserted ones.
    pub fn live_buffers(&self) -> usize {
        self.state.lock().buffers.len()
    }

    /// Whether `buffer` has not been destroyed.
    pub fn is_live(&self, buffer: BufferHandle) -> bool {
        self.state.lock().buffers.contains_key(&buffer)
    }

    /// Copy of the data the subsystem currently holds for `buffer`.
    pub fn read_back(&self, buffer: BufferHandle) -> Option<ExternalVertexData> {
        let state = self.state.lock();
        state
            .buffers
            .get(&buffer)
            .and_then(|b| b.host.as_ref())
            .map(|host| host.source.clone())
    }

    /// Register a buffer created outside the mirror, e.g. by another plugin.
    ///
    /// Not counted in [`DummyStats::created`].
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::InvalidSource`] if an array is shorter than
    /// the vertex count requires (see [`ExternalVertexData::validate`]).
    pub fn insert_external(&self, source: ExternalVertexData) -> GraphicsResult<BufferHandle> {
        source.validate()?;
        let layer_count = source.uv_layers.len();
        Ok(self.insert(DummyBuffer {
            layer_count,
            host: Some(HostBlock::new(source)),
        }))
    }

    /// Register a buffer that has no host data block.
    pub fn insert_without_data(&self) -> BufferHandle {
        self.insert(DummyBuffer {
            layer_count: 0,
            host: None,
        })
    }

    fn allocate_handle(&self) -> BufferHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        BufferHandle::from_raw(id).unwrap_or_else(|| unreachable!("handle ids start at 1"))
    }

    fn insert(&self, buffer: DummyBuffer) -> BufferHandle {
        let handle = self.allocate_handle();
        self.state.lock().buffers.insert(handle, buffer);
        handle
    }
}

impl Default for DummySubsystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DummySubsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DummySubsystem")
            .field("version", &self.version)
            .field("live_buffers", &self.live_buffers())
            .field("context_depth", &self.context_depth())
            .finish()
    }
}

// SAFETY: data pointers handed out point into HostBlocks, which stay in place
// until the buffer is flushed (host block replaced), destroyed or has its data
// released.
unsafe impl GraphicsSubsystem for DummySubsystem {
    fn name(&self) -> &str {
        "Dummy"
    }

    fn version(&self) -> SemanticVersion {
        self.version
    }

    fn enter_context(&self) -> GraphicsResult<()> {
        if !self.context_available.load(Ordering::Acquire) {
            return Err(GraphicsError::ContextUnavailable(
                "dummy context disabled".to_string(),
            ));
        }
        let depth = self.context_depth.fetch_add(1, Ordering::AcqRel) + 1;
        log::trace!("DummySubsystem: enter context (depth {})", depth);
        Ok(())
    }

    fn leave_context(&self) {
        let previous = self.context_depth.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "leave_context without enter_context");
        log::trace!("DummySubsystem: leave context (depth {})", previous - 1);
    }

    fn create_vertex_buffer(
        &self,
        data: &VertexData,
        flags: BufferFlags,
    ) -> Option<BufferHandle> {
        if !self.creation_enabled.load(Ordering::Acquire) {
            log::trace!("DummySubsystem: rejecting vertex buffer creation");
            self.state.lock().stats.failed_creates += 1;
            return None;
        }
        if !flags.contains(BufferFlags::DUP_BUFFER) {
            log::warn!("DummySubsystem: aliasing caller memory is not supported, duplicating");
        }

        // SAFETY: the caller's descriptor is valid for the duration of the call.
        let source = unsafe { ExternalVertexData::from_descriptor(data) };
        let layer_count = source.uv_layers.len();
        let handle = self.allocate_handle();
        log::trace!(
            "DummySubsystem: creating vertex buffer {} ({} vertices, {} layers, {:?})",
            handle.raw(),
            data.num,
            layer_count,
            flags
        );

        let mut state = self.state.lock();
        state.stats.created += 1;
        state.stats.last_flags = Some(flags);
        state.stats.created_layer_counts.push(layer_count);
        state.buffers.insert(
            handle,
            DummyBuffer {
                layer_count,
                host: Some(HostBlock::new(source)),
            },
        );
        Some(handle)
    }

    fn destroy_vertex_buffer(&self, buffer: BufferHandle) {
        let mut state = self.state.lock();
        match state.buffers.remove(&buffer) {
            Some(destroyed) => {
                log::trace!("DummySubsystem: destroying vertex buffer {}", buffer.raw());
                state.stats.destroyed += 1;
                state.stats.destroyed_layer_counts.push(destroyed.layer_count);
            }
            None => log::warn!(
                "DummySubsystem: destroy of unknown vertex buffer {}",
                buffer.raw()
            ),
        }
    }

    fn release_vertex_data(&self, buffer: BufferHandle) {
        let mut state = self.state.lock();
        let released = state
            .buffers
            .get_mut(&buffer)
            .and_then(|b| b.host.take())
            .is_some();
        if released {
            log::trace!("DummySubsystem: released host data of {}", buffer.raw());
            state.stats.host_data_released += 1;
        }
    }

    fn flush_vertex_buffer(&self, buffer: BufferHandle, data: &VertexData) {
        // SAFETY: the caller's descriptor is valid for the duration of the call.
        let source = unsafe { ExternalVertexData::from_descriptor(data) };
        let mut state = self.state.lock();
        match state.buffers.get_mut(&buffer) {
            Some(target) => {
                log::trace!(
                    "DummySubsystem: flush vertex buffer {} ({} vertices)",
                    buffer.raw(),
                    data.num
                );
                target.host = Some(HostBlock::new(source));
                state.stats.flushes += 1;
            }
            None => log::warn!(
                "DummySubsystem: flush of unknown vertex buffer {}",
                buffer.raw()
            ),
        }
    }

    fn vertex_buffer_data(&self, buffer: BufferHandle) -> Option<NonNull<VertexData>> {
        let state = self.state.lock();
        state
            .buffers
            .get(&buffer)
            .and_then(|b| b.host.as_ref())
            .map(|host| NonNull::from(&*host.data))
    }
}
