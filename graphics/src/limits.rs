//! Hard limits shared with the external graphics subsystem.

/// Maximum number of vertices a single buffer may hold.
pub const MAXIMUM_VERTICES: u32 = 0x00FF_FFFF;

/// Maximum number of UV coordinate layers per buffer.
pub const MAXIMUM_UVW_LAYERS: u8 = 8;

/// [`MAXIMUM_UVW_LAYERS`] as a `usize`, for inline array sizes.
pub(crate) const MAX_LAYERS: usize = MAXIMUM_UVW_LAYERS as usize;
