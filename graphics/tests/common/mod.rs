//! Common utilities for vertex buffer integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use vbmirror_core::color::pack_rgba;
use vbmirror_core::{Vec3, Vec4};
use vbmirror_graphics::{DummySubsystem, GraphicsSubsystem, SemanticVersion, VertexBuffer};

/// A dummy subsystem plus the same instance behind the trait object the
/// buffers take.
pub struct TestContext {
    pub dummy: Arc<DummySubsystem>,
    pub subsystem: Arc<dyn GraphicsSubsystem>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_dummy(DummySubsystem::new())
    }

    pub fn with_version(version: SemanticVersion) -> Self {
        Self::with_dummy(DummySubsystem::with_version(version))
    }

    fn with_dummy(dummy: DummySubsystem) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        let dummy = Arc::new(dummy);
        let subsystem: Arc<dyn GraphicsSubsystem> = dummy.clone();
        Self { dummy, subsystem }
    }

    /// A new buffer on this context's subsystem.
    pub fn buffer(&self, capacity: u32, layers: u8) -> VertexBuffer {
        VertexBuffer::new(Arc::clone(&self.subsystem), capacity, layers)
            .expect("failed to create vertex buffer")
    }
}

// ============================================================================
// Test Patterns
// ============================================================================

pub fn pattern_position(i: usize) -> Vec3 {
    Vec3::new(i as f32, i as f32 * 2.0, i as f32 * 3.0)
}

pub fn pattern_normal(i: usize) -> Vec3 {
    Vec3::new(0.0, 1.0, i as f32 * 0.5)
}

pub fn pattern_tangent(i: usize) -> Vec3 {
    Vec3::new(1.0, i as f32 * 0.25, 0.0)
}

pub fn pattern_color(i: usize) -> u32 {
    let c = (i % 256) as u8;
    pack_rgba(c, c.wrapping_mul(3), 255 - c, 255)
}

pub fn pattern_uv(layer: usize, i: usize) -> Vec4 {
    Vec4::new(layer as f32, i as f32, 0.5, 1.0)
}

/// Fill every attribute and active UV layer with the test pattern.
pub fn fill_pattern(buffer: &mut VertexBuffer) {
    for (i, v) in buffer.positions_mut().iter_mut().enumerate() {
        *v = pattern_position(i);
    }
    for (i, v) in buffer.normals_mut().iter_mut().enumerate() {
        *v = pattern_normal(i);
    }
    for (i, v) in buffer.tangents_mut().iter_mut().enumerate() {
        *v = pattern_tangent(i);
    }
    for (i, c) in buffer.colors_mut().iter_mut().enumerate() {
        *c = pattern_color(i);
    }
    for layer in 0..buffer.layer_count() {
        let uvs = buffer.uv_layer_mut(layer).expect("active layer");
        for (i, uv) in uvs.iter_mut().enumerate() {
            *uv = pattern_uv(layer as usize, i);
        }
    }
}

/// Check that `buffer` holds the test pattern at every index.
pub fn verify_pattern(buffer: &VertexBuffer) {
    for i in 0..buffer.capacity() as usize {
        assert_eq!(buffer.positions()[i], pattern_position(i), "position {}", i);
        assert_eq!(buffer.normals()[i], pattern_normal(i), "normal {}", i);
        assert_eq!(buffer.tangents()[i], pattern_tangent(i), "tangent {}", i);
        assert_eq!(buffer.colors()[i], pattern_color(i), "color {}", i);
    }
    for layer in 0..buffer.layer_count() {
        let uvs = buffer.uv_layer(layer).expect("active layer");
        for (i, uv) in uvs.iter().enumerate() {
            assert_eq!(*uv, pattern_uv(layer as usize, i), "uv {} of layer {}", i, layer);
        }
    }
}
