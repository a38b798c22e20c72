//! Per-vertex views into a [`VertexBuffer`](super::VertexBuffer).

use smallvec::SmallVec;
use vbmirror_core::{Vec3, Vec4};

use crate::limits::MAX_LAYERS;

/// Shared view of one vertex's attributes.
#[derive(Debug, Clone)]
pub struct Vertex<'a> {
    pub position: &'a Vec3,
    pub normal: &'a Vec3,
    pub tangent: &'a Vec3,
    pub color: &'a u32,
    /// One entry per active UV layer.
    pub uv: SmallVec<[&'a Vec4; MAX_LAYERS]>,
}

/// Mutable view of one vertex's attributes.
#[derive(Debug)]
pub struct VertexMut<'a> {
    pub position: &'a mut Vec3,
    pub normal: &'a mut Vec3,
    pub tangent: &'a mut Vec3,
    pub color: &'a mut u32,
    /// One entry per active UV layer.
    pub uv: SmallVec<[&'a mut Vec4; MAX_LAYERS]>,
}
