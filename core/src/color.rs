//! Packed 32-bit vertex colors.
//!
//! Colors are stored as `u32` with red in the lowest byte and alpha in the
//! highest, which is the byte order GPU subsystems read as RGBA8.

/// Pack RGBA components into a `u32`.
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16) | ((a as u32) << 24)
}

/// Unpack a `u32` color into `[r, g, b, a]`.
pub const fn unpack_rgba(color: u32) -> [u8; 4] {
    color.to_le_bytes()
}

/// Opaque white.
pub const WHITE: u32 = pack_rgba(255, 255, 255, 255);
