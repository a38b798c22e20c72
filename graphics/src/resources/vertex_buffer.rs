//! Host-side mirror of a GPU vertex buffer.
//!
//! A [`VertexBuffer`] keeps every vertex attribute in its own 16-byte aligned
//! array (positions, normals, tangents, packed colors and up to
//! [`MAXIMUM_UVW_LAYERS`] UV layers), wires them into a [`VertexData`]
//! descriptor block and owns the subsystem buffer created from that block.
//! Edits happen on the host arrays; [`VertexBuffer::flush`] pushes them to the
//! GPU.
//!
//! # Example
//!
//! ```ignore
//! let subsystem: Arc<dyn GraphicsSubsystem> = Arc::new(DummySubsystem::new());
//! let mut buffer = VertexBuffer::new(subsystem, 4, 1)?;
//! buffer.positions_mut()[0] = Vec3::new(1.0, 0.0, 0.0);
//! buffer.update()?;
//! ```

use std::ptr::{self, NonNull};
use std::sync::Arc;

use smallvec::SmallVec;
use vbmirror_core::{AlignedBuffer, Vec3, Vec4};

use crate::backend::{BufferHandle, GraphicsSubsystem};
use crate::context::GraphicsContext;
use crate::error::{GraphicsError, GraphicsResult};
use crate::limits::{MAXIMUM_UVW_LAYERS, MAXIMUM_VERTICES, MAX_LAYERS};
use crate::types::{BufferConfig, BufferFlags};

use super::gpu_buffer::{GpuVertexBuffer, TeardownStatus};
use super::vertex::{Vertex, VertexMut};
use super::{TexVertArray, VertexData};

/// Component width of freshly allocated UV layers.
const DEFAULT_UV_WIDTH: usize = 4;

struct UvLayer {
    width: usize,
    data: AlignedBuffer<Vec4>,
}

/// Attribute arrays plus the descriptor block pointing into them.
///
/// Every pointer in `data` and `tex_table` refers to heap memory owned by the
/// same value, so moving a `VertexArrays` keeps the descriptor valid.
struct VertexArrays {
    positions: AlignedBuffer<Vec3>,
    normals: AlignedBuffer<Vec3>,
    tangents: AlignedBuffer<Vec3>,
    colors: AlignedBuffer<u32>,
    uv_layers: SmallVec<[UvLayer; MAX_LAYERS]>,
    tex_table: Box<[TexVertArray]>,
    data: VertexData,
}

impl VertexArrays {
    fn empty() -> Self {
        Self {
            positions: AlignedBuffer::empty(),
            normals: AlignedBuffer::empty(),
            tangents: AlignedBuffer::empty(),
            colors: AlignedBuffer::empty(),
            uv_layers: SmallVec::new(),
            tex_table: Box::default(),
            data: VertexData::empty(),
        }
    }

    /// Zeroed arrays for `capacity` vertices and `layers` UV layers of width 4.
    fn allocate(capacity: usize, layers: usize) -> GraphicsResult<Self> {
        let mut uv_layers = SmallVec::new();
        for _ in 0..layers {
            uv_layers.push(UvLayer {
                width: DEFAULT_UV_WIDTH,
                data: AlignedBuffer::try_zeroed(capacity)?,
            });
        }

        let mut arrays = Self {
            positions: AlignedBuffer::try_zeroed(capacity)?,
            normals: AlignedBuffer::try_zeroed(capacity)?,
            tangents: AlignedBuffer::try_zeroed(capacity)?,
            colors: AlignedBuffer::try_zeroed(capacity)?,
            uv_layers,
            tex_table: vec![TexVertArray::null(); layers].into_boxed_slice(),
            data: VertexData::empty(),
        };
        arrays.wire(layers);
        Ok(arrays)
    }

    /// Recompute the layer table and descriptor pointers.
    fn wire(&mut self, active_layers: usize) {
        for (entry, layer) in self.tex_table.iter_mut().zip(self.uv_layers.iter_mut()) {
            *entry = TexVertArray {
                width: layer.width,
                array: layer.data.as_mut_ptr().cast(),
            };
        }

        self.data = VertexData {
            num: self.positions.len(),
            points: self.positions.as_mut_ptr(),
            normals: self.normals.as_mut_ptr(),
            tangents: self.tangents.as_mut_ptr(),
            colors: self.colors.as_mut_ptr(),
            num_tex: active_layers,
            tvarray: if self.tex_table.is_empty() {
                ptr::null_mut()
            } else {
                self.tex_table.as_mut_ptr()
            },
        };
    }

    /// Copy every attribute and the first `layers` UV layers of `other`.
    /// Both sides must have been allocated with the same shape.
    fn copy_from(&mut self, other: &Self, layers: usize) {
        self.positions.copy_from_slice(&other.positions);
        self.normals.copy_from_slice(&other.normals);
        self.tangents.copy_from_slice(&other.tangents);
        self.colors.copy_from_slice(&other.colors);

        for (dst, src) in self.uv_layers.iter_mut().zip(&other.uv_layers).take(layers) {
            dst.width = src.width;
            dst.data.copy_from_slice(&src.data);
        }
        self.wire(self.data.num_tex);
    }

    /// Copy attribute data out of a subsystem descriptor block.
    ///
    /// # Safety
    ///
    /// `source` must satisfy the pointer validity rules of
    /// [`GraphicsSubsystem`].
    unsafe fn import(&mut self, source: &VertexData) {
        let count = source.num.min(self.positions.len());

        copy_vec3_lanes(&mut self.positions[..count], source.points_f32());
        copy_vec3_lanes(&mut self.normals[..count], source.normals_f32());
        copy_vec3_lanes(&mut self.tangents[..count], source.tangents_f32());
        if let Some(colors) = source.colors() {
            self.colors[..count].copy_from_slice(&colors[..count]);
        }

        for (index, (layer, entry)) in self
            .uv_layers
            .iter_mut()
            .zip(source.tex_arrays())
            .enumerate()
        {
            let Some(floats) = entry.floats(source.num) else {
                if !entry.array.is_null() {
                    log::warn!(
                        "Skipping UV layer {} with unsupported width {}",
                        index,
                        entry.width
                    );
                }
                continue;
            };

            let dst = &mut layer.data[..count];
            if entry.width == 4 {
                bytemuck::cast_slice_mut::<Vec4, f32>(dst).copy_from_slice(&floats[..count * 4]);
            } else {
                for (uv, src) in dst.iter_mut().zip(floats.chunks_exact(entry.width)) {
                    *uv = Vec4::ZERO;
                    uv.as_array_mut()[..entry.width].copy_from_slice(src);
                }
            }
        }
    }
}

/// Copy `dst.len()` vertices of four-lane source data into `dst`.
fn copy_vec3_lanes(dst: &mut [Vec3], lanes: Option<&[f32]>) {
    if let Some(lanes) = lanes {
        let count = dst.len();
        bytemuck::cast_slice_mut::<Vec3, f32>(dst).copy_from_slice(&lanes[..count * 4]);
    }
}

/// Host-managed mirror of a GPU vertex buffer.
///
/// Holds `capacity` vertices of which the first `size` are logically in use,
/// and `layer_count` active UV layers. All attribute arrays are allocated and
/// freed together. The GPU buffer is released before the arrays it was created
/// from.
///
/// A buffer with no arrays (capacity 0, no handle) is *empty*. Buffers become
/// empty after [`finalize`](Self::finalize), after being [`take`](Self::take)n
/// from, or when [`initialize`](Self::initialize) fails.
pub struct VertexBuffer {
    subsystem: Arc<dyn GraphicsSubsystem>,
    config: Arc<BufferConfig>,
    capacity: u32,
    size: u32,
    layer_count: u8,
    gpu: Option<GpuVertexBuffer>,
    gpu_data: Option<NonNull<VertexData>>,
    arrays: VertexArrays,
}

// SAFETY: the raw pointers in `arrays` and `gpu_data` refer to memory owned by
// this buffer or by its GPU buffer in the subsystem, and are only reached
// through `&self`/`&mut self`.
unsafe impl Send for VertexBuffer {}

static_assertions::assert_impl_all!(VertexBuffer: Send);
static_assertions::assert_not_impl_any!(VertexBuffer: Sync);

impl VertexBuffer {
    /// Create a buffer with `capacity` zeroed vertices and `layers` UV layers.
    ///
    /// # Errors
    ///
    /// See [`initialize`](Self::initialize).
    pub fn new(
        subsystem: Arc<dyn GraphicsSubsystem>,
        capacity: u32,
        layers: u8,
    ) -> GraphicsResult<Self> {
        Self::with_config(subsystem, capacity, layers, BufferConfig::default())
    }

    /// Create a buffer with a custom configuration.
    pub fn with_config(
        subsystem: Arc<dyn GraphicsSubsystem>,
        capacity: u32,
        layers: u8,
        config: BufferConfig,
    ) -> GraphicsResult<Self> {
        let mut buffer = Self::unallocated_with_config(subsystem, config);
        buffer.initialize(capacity, layers)?;
        Ok(buffer)
    }

    /// An empty buffer bound to `subsystem`. Does not allocate.
    pub fn unallocated(subsystem: Arc<dyn GraphicsSubsystem>) -> Self {
        Self::unallocated_with_config(subsystem, BufferConfig::default())
    }

    /// An empty buffer with a custom configuration. Does not allocate.
    pub fn unallocated_with_config(
        subsystem: Arc<dyn GraphicsSubsystem>,
        config: BufferConfig,
    ) -> Self {
        Self::from_parts(subsystem, Arc::new(config))
    }

    fn from_parts(subsystem: Arc<dyn GraphicsSubsystem>, config: Arc<BufferConfig>) -> Self {
        Self {
            subsystem,
            config,
            capacity: 0,
            size: 0,
            layer_count: 0,
            gpu: None,
            gpu_data: None,
            arrays: VertexArrays::empty(),
        }
    }

    /// Mirror a buffer created outside this crate.
    ///
    /// Allocates a buffer with the external buffer's vertex and UV layer
    /// counts and copies its host data. The external buffer is not owned.
    ///
    /// # Errors
    ///
    /// - [`GraphicsError::InvalidSource`] if the subsystem has no data for
    ///   `external`.
    /// - [`GraphicsError::OutOfRange`] if its counts exceed the limits.
    /// - Anything [`initialize`](Self::initialize) can return.
    pub fn from_external(
        subsystem: Arc<dyn GraphicsSubsystem>,
        external: BufferHandle,
    ) -> GraphicsResult<Self> {
        Self::from_external_with_config(subsystem, external, BufferConfig::default())
    }

    /// [`from_external`](Self::from_external) with a custom configuration.
    pub fn from_external_with_config(
        subsystem: Arc<dyn GraphicsSubsystem>,
        external: BufferHandle,
        config: BufferConfig,
    ) -> GraphicsResult<Self> {
        let source_subsystem = Arc::clone(&subsystem);
        let ctx = GraphicsContext::enter(&*source_subsystem)?;

        let source = ctx.subsystem().vertex_buffer_data(external).ok_or_else(|| {
            GraphicsError::InvalidSource(format!(
                "vertex buffer {} has no data",
                external.raw()
            ))
        })?;
        // SAFETY: the subsystem guarantees the block is valid while we hold
        // the context and do not flush or destroy `external`.
        let source = unsafe { source.as_ref() };

        if source.num > MAXIMUM_VERTICES as usize {
            return Err(GraphicsError::out_of_range(
                "capacity",
                source.num,
                MAXIMUM_VERTICES as usize,
            ));
        }
        if source.num_tex > MAX_LAYERS {
            return Err(GraphicsError::out_of_range(
                "layer count",
                source.num_tex,
                MAX_LAYERS,
            ));
        }

        let mut buffer = Self::unallocated_with_config(subsystem, config);
        buffer.initialize(source.num as u32, source.num_tex as u8)?;
        // SAFETY: as above; our own buffer creation does not touch `external`.
        unsafe { buffer.arrays.import(source) };

        log::debug!(
            "Imported vertex buffer {} into '{}' ({} vertices, {} UV layers)",
            external.raw(),
            buffer.config.display_label(),
            buffer.capacity,
            buffer.layer_count
        );
        drop(ctx);
        Ok(buffer)
    }

    /// Deep copy with a fresh GPU buffer. Copies `size` as well.
    pub fn try_clone(&self) -> GraphicsResult<Self> {
        let mut copy = Self::from_parts(Arc::clone(&self.subsystem), Arc::clone(&self.config));
        copy.clone_from_buffer(self)?;
        Ok(copy)
    }

    /// Reinitialize to `other`'s shape and deep-copy its contents.
    ///
    /// On error `self` is left empty.
    pub fn clone_from_buffer(&mut self, other: &Self) -> GraphicsResult<()> {
        self.initialize(other.capacity, other.layer_count)?;
        self.arrays.copy_from(&other.arrays, other.layer_count as usize);
        self.size = other.size;
        Ok(())
    }

    /// Move the contents out, leaving `self` empty. No allocation or GPU call.
    pub fn take(&mut self) -> Self {
        let empty = Self::from_parts(Arc::clone(&self.subsystem), Arc::clone(&self.config));
        std::mem::replace(self, empty)
    }

    /// Finalize `self` and move `other`'s contents in, leaving `other` empty.
    pub fn move_from(&mut self, other: &mut Self) {
        *self = other.take();
    }

    /// (Re)allocate for `capacity` vertices and `layers` UV layers.
    ///
    /// Finalizes first. On success every array is zeroed, `size == capacity`
    /// and a GPU buffer exists.
    ///
    /// # Errors
    ///
    /// - [`GraphicsError::OutOfRange`] if `capacity > MAXIMUM_VERTICES` or
    ///   `layers > MAXIMUM_UVW_LAYERS`.
    /// - [`GraphicsError::OutOfMemory`] if host allocation fails.
    /// - [`GraphicsError::ContextUnavailable`] or
    ///   [`GraphicsError::ResourceCreationFailed`] from the subsystem.
    ///
    /// The buffer is empty after any error.
    pub fn initialize(&mut self, capacity: u32, layers: u8) -> GraphicsResult<()> {
        self.finalize();

        if capacity > MAXIMUM_VERTICES {
            return Err(GraphicsError::out_of_range(
                "capacity",
                capacity as usize,
                MAXIMUM_VERTICES as usize,
            ));
        }
        if layers > MAXIMUM_UVW_LAYERS {
            return Err(GraphicsError::out_of_range(
                "layer count",
                layers as usize,
                MAX_LAYERS,
            ));
        }

        let arrays = VertexArrays::allocate(capacity as usize, layers as usize)?;
        let (gpu, gpu_data) = {
            let ctx = GraphicsContext::enter(&*self.subsystem)?;
            let gpu = GpuVertexBuffer::create(
                &self.subsystem,
                &ctx,
                &arrays.data,
                self.config.flags | BufferFlags::DUP_BUFFER,
                self.config.teardown,
            )?;
            let gpu_data = gpu
                .handle()
                .and_then(|handle| ctx.subsystem().vertex_buffer_data(handle));
            (gpu, gpu_data)
        };

        log::debug!(
            "Created vertex buffer '{}': {} vertices, {} UV layers",
            self.config.display_label(),
            capacity,
            layers
        );

        self.arrays = arrays;
        self.gpu = Some(gpu);
        self.gpu_data = gpu_data;
        self.capacity = capacity;
        self.size = capacity;
        self.layer_count = layers;
        Ok(())
    }

    /// Release the GPU buffer, then every array. Idempotent.
    pub fn finalize(&mut self) -> TeardownStatus {
        let status = match self.gpu.take() {
            Some(mut gpu) => gpu.release(),
            None => TeardownStatus::Empty,
        };
        if status != TeardownStatus::Empty {
            log::debug!(
                "Finalized vertex buffer '{}' ({:?})",
                self.config.display_label(),
                status
            );
        }

        self.gpu_data = None;
        self.arrays = VertexArrays::empty();
        self.capacity = 0;
        self.size = 0;
        self.layer_count = 0;
        status
    }

    /// Set the logical vertex count. Never reallocates.
    pub fn resize(&mut self, size: u32) -> GraphicsResult<()> {
        if size > self.capacity {
            return Err(GraphicsError::out_of_range(
                "size",
                size as usize,
                self.capacity as usize,
            ));
        }
        self.size = size;
        Ok(())
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// `true` if no vertices are in use.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of active UV layers.
    pub fn layer_count(&self) -> u8 {
        self.layer_count
    }

    /// Change the number of active UV layers, up to the number allocated.
    pub fn set_layer_count(&mut self, layers: u8) -> GraphicsResult<()> {
        let allocated = self.arrays.uv_layers.len();
        if layers as usize > allocated {
            return Err(GraphicsError::out_of_range(
                "layer count",
                layers as usize,
                allocated,
            ));
        }
        self.layer_count = layers;
        self.arrays.data.num_tex = layers as usize;
        Ok(())
    }

    fn vertex_index(&self, index: u32) -> GraphicsResult<usize> {
        if index >= self.size {
            return Err(GraphicsError::out_of_range(
                "vertex index",
                index as usize,
                self.size as usize,
            ));
        }
        Ok(index as usize)
    }

    /// View of the vertex at `index`.
    pub fn at(&self, index: u32) -> GraphicsResult<Vertex<'_>> {
        let i = self.vertex_index(index)?;
        let arrays = &self.arrays;
        Ok(Vertex {
            position: &arrays.positions[i],
            normal: &arrays.normals[i],
            tangent: &arrays.tangents[i],
            color: &arrays.colors[i],
            uv: arrays
                .uv_layers
                .iter()
                .take(self.layer_count as usize)
                .map(|layer| &layer.data[i])
                .collect(),
        })
    }

    /// Mutable view of the vertex at `index`.
    pub fn at_mut(&mut self, index: u32) -> GraphicsResult<VertexMut<'_>> {
        let i = self.vertex_index(index)?;
        let active = self.layer_count as usize;
        let arrays = &mut self.arrays;
        Ok(VertexMut {
            position: &mut arrays.positions[i],
            normal: &mut arrays.normals[i],
            tangent: &mut arrays.tangents[i],
            color: &mut arrays.colors[i],
            uv: arrays
                .uv_layers
                .iter_mut()
                .take(active)
                .map(|layer| &mut layer.data[i])
                .collect(),
        })
    }

    /// Full-capacity UV array of an active layer.
    pub fn uv_layer(&self, index: u8) -> GraphicsResult<&[Vec4]> {
        let active = self.layer_count;
        self.arrays.uv_layers[..active as usize]
            .get(index as usize)
            .map(|layer| layer.data.as_slice())
            .ok_or_else(|| GraphicsError::out_of_range("UV layer", index as usize, active as usize))
    }

    pub fn uv_layer_mut(&mut self, index: u8) -> GraphicsResult<&mut [Vec4]> {
        let active = self.layer_count;
        self.arrays.uv_layers[..active as usize]
            .get_mut(index as usize)
            .map(|layer| layer.data.as_mut_slice())
            .ok_or_else(|| GraphicsError::out_of_range("UV layer", index as usize, active as usize))
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.arrays.positions
    }

    pub fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.arrays.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.arrays.normals
    }

    pub fn normals_mut(&mut self) -> &mut [Vec3] {
        &mut self.arrays.normals
    }

    pub fn tangents(&self) -> &[Vec3] {
        &self.arrays.tangents
    }

    pub fn tangents_mut(&mut self) -> &mut [Vec3] {
        &mut self.arrays.tangents
    }

    /// Packed RGBA colors, see [`vbmirror_core::color`].
    pub fn colors(&self) -> &[u32] {
        &self.arrays.colors
    }

    pub fn colors_mut(&mut self) -> &mut [u32] {
        &mut self.arrays.colors
    }

    /// Push the host arrays to the GPU when `push_to_gpu` is set, and return
    /// the current handle.
    ///
    /// The handle stays owned by this buffer. An empty buffer returns
    /// `Ok(None)` without touching the subsystem.
    pub fn flush(&mut self, push_to_gpu: bool) -> GraphicsResult<Option<BufferHandle>> {
        let Some(gpu) = self.gpu.as_ref() else {
            return Ok(None);
        };

        if push_to_gpu {
            let ctx = GraphicsContext::enter(&*self.subsystem)?;
            self.gpu_data = gpu.flush(&ctx, &self.arrays.data);
            log::trace!(
                "Flushed vertex buffer '{}' ({} vertices)",
                self.config.display_label(),
                self.capacity
            );
        }
        Ok(gpu.handle())
    }

    /// Shorthand for `flush(true)`.
    pub fn update(&mut self) -> GraphicsResult<Option<BufferHandle>> {
        self.flush(true)
    }

    /// The current GPU buffer handle. Not owning.
    pub fn handle(&self) -> Option<BufferHandle> {
        self.gpu.as_ref().and_then(GpuVertexBuffer::handle)
    }

    /// The subsystem's data block for the GPU buffer, as of the last
    /// allocation or flush.
    pub fn gpu_data(&self) -> Option<NonNull<VertexData>> {
        self.gpu_data
    }

    /// The host descriptor block handed to the subsystem.
    pub fn vertex_data(&self) -> &VertexData {
        &self.arrays.data
    }

    pub fn subsystem(&self) -> &Arc<dyn GraphicsSubsystem> {
        &self.subsystem
    }

    pub fn config(&self) -> &BufferConfig {
        &self.config
    }
}

impl Drop for VertexBuffer {
    fn drop(&mut self) {
        self.finalize();
    }
}

impl std::fmt::Debug for VertexBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VertexBuffer")
            .field("label", &self.config.display_label())
            .field("subsystem", &self.subsystem.name())
            .field("capacity", &self.capacity)
            .field("size", &self.size)
            .field("layer_count", &self.layer_count)
            .field("handle", &self.handle())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::DummySubsystem;

    fn dummy() -> (Arc<DummySubsystem>, Arc<dyn GraphicsSubsystem>) {
        let subsystem = Arc::new(DummySubsystem::new());
        let dyn_subsystem: Arc<dyn GraphicsSubsystem> = subsystem.clone();
        (subsystem, dyn_subsystem)
    }

    #[test]
    fn test_new_is_zeroed() {
        let (_, subsystem) = dummy();
        let buffer = VertexBuffer::new(subsystem, 16, 2).unwrap();

        assert_eq!(buffer.capacity(), 16);
        assert_eq!(buffer.size(), 16);
        assert_eq!(buffer.layer_count(), 2);
        assert!(buffer.positions().iter().all(|v| *v == Vec3::ZERO));
        assert!(buffer.colors().iter().all(|c| *c == 0));
        assert!(buffer.uv_layer(1).unwrap().iter().all(|v| *v == Vec4::ZERO));
        assert!(buffer.handle().is_some());
        assert!(buffer.gpu_data().is_some());
    }

    #[test]
    fn test_descriptor_wiring() {
        let (_, subsystem) = dummy();
        let buffer = VertexBuffer::new(subsystem, 8, 3).unwrap();
        let data = buffer.vertex_data();

        assert_eq!(data.num, 8);
        assert_eq!(data.num_tex, 3);
        assert!(ptr::eq(data.points.cast_const(), buffer.positions().as_ptr()));
        assert!(ptr::eq(data.colors.cast_const(), buffer.colors().as_ptr()));
        assert_eq!(data.points as usize % 16, 0);

        let table = unsafe { data.tex_arrays() };
        assert_eq!(table.len(), 3);
        assert!(table.iter().all(|entry| entry.width == 4));
        assert!(ptr::eq(
            table[2].array.cast_const().cast::<Vec4>(),
            buffer.uv_layer(2).unwrap().as_ptr()
        ));
    }

    #[test]
    fn test_no_layers_has_null_table() {
        let (_, subsystem) = dummy();
        let buffer = VertexBuffer::new(subsystem, 4, 0).unwrap();
        assert!(buffer.vertex_data().tvarray.is_null());
        assert!(buffer.uv_layer(0).is_err());
    }

    #[test]
    fn test_flags_include_dup_buffer() {
        let (dummy, subsystem) = dummy();
        let config = BufferConfig::new().with_flags(BufferFlags::empty());
        let _buffer = VertexBuffer::with_config(subsystem, 4, 0, config).unwrap();
        assert_eq!(dummy.stats().last_flags, Some(BufferFlags::DUP_BUFFER));
    }

    #[test]
    fn test_set_layer_count() {
        let (_, subsystem) = dummy();
        let mut buffer = VertexBuffer::new(subsystem, 4, 3).unwrap();

        buffer.set_layer_count(1).unwrap();
        assert_eq!(buffer.layer_count(), 1);
        assert_eq!(buffer.vertex_data().num_tex, 1);
        assert!(buffer.uv_layer(1).is_err());
        assert_eq!(buffer.at(0).unwrap().uv.len(), 1);

        assert!(matches!(
            buffer.set_layer_count(4),
            Err(GraphicsError::OutOfRange { limit: 3, .. })
        ));
        buffer.set_layer_count(3).unwrap();
        assert!(buffer.uv_layer(2).is_ok());
    }

    #[test]
    fn test_at_mut_writes_through() {
        let (_, subsystem) = dummy();
        let mut buffer = VertexBuffer::new(subsystem, 4, 2).unwrap();
        {
            let vertex = buffer.at_mut(3).unwrap();
            *vertex.position = Vec3::new(1.0, 2.0, 3.0);
            *vertex.color = 0xFF00_00FF;
            for uv in vertex.uv {
                *uv = Vec4::new(0.5, 0.25, 0.0, 1.0);
            }
        }

        assert_eq!(buffer.positions()[3], Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(buffer.colors()[3], 0xFF00_00FF);
        assert_eq!(buffer.uv_layer(1).unwrap()[3], Vec4::new(0.5, 0.25, 0.0, 1.0));
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let (dummy, subsystem) = dummy();
        let mut buffer = VertexBuffer::new(subsystem, 4, 1).unwrap();

        assert_eq!(buffer.finalize(), TeardownStatus::Destroyed);
        assert_eq!(buffer.finalize(), TeardownStatus::Empty);
        assert_eq!(buffer.capacity(), 0);
        assert!(buffer.handle().is_none());
        assert!(buffer.gpu_data().is_none());
        drop(buffer);
        assert_eq!(dummy.stats().destroyed, 1);
    }

    #[test]
    fn test_initialize_replaces_gpu_buffer() {
        let (dummy, subsystem) = dummy();
        let mut buffer = VertexBuffer::new(subsystem, 4, 1).unwrap();
        let first = buffer.handle();

        buffer.initialize(8, 2).unwrap();
        assert_ne!(buffer.handle(), first);
        assert_eq!(dummy.live_buffers(), 1);
        assert_eq!(dummy.stats().destroyed_layer_counts, vec![1]);
    }

    #[test]
    fn test_context_balanced() {
        let (dummy, subsystem) = dummy();
        let mut buffer = VertexBuffer::new(subsystem, 4, 1).unwrap();
        buffer.update().unwrap();
        let _copy = buffer.try_clone().unwrap();
        assert_eq!(dummy.context_depth(), 0);
    }

    #[test]
    fn test_context_unavailable_on_initialize() {
        let (dummy, subsystem) = dummy();
        dummy.set_context_available(false);
        let mut buffer = VertexBuffer::unallocated(subsystem);

        assert!(matches!(
            buffer.initialize(4, 1),
            Err(GraphicsError::ContextUnavailable(_))
        ));
        assert_eq!(buffer.capacity(), 0);
        assert!(buffer.positions().is_empty());
    }
}
