//! Vertex buffer resources.
//!
//! - [`VertexBuffer`] - host-managed mirror of a GPU vertex buffer
//! - [`GpuVertexBuffer`] - owning handle to the subsystem buffer
//! - [`VertexData`] / [`TexVertArray`] - descriptor block shared with the subsystem
//! - [`Vertex`] / [`VertexMut`] - per-vertex views

mod descriptor;
mod gpu_buffer;
mod vertex;
mod vertex_buffer;

pub use descriptor::{TexVertArray, VertexData};
pub use gpu_buffer::{GpuVertexBuffer, TeardownStatus};
pub use vertex::{Vertex, VertexMut};
pub use vertex_buffer::VertexBuffer;
