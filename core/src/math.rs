//! Vertex math types.
//!
//! [`Vec3`] and [`Vec4`] are 16-byte aligned, 16-byte sized vectors that match
//! the layout GPU subsystems expect for SIMD-friendly vertex attribute arrays.
//! Conversions to and from `nalgebra` vectors are provided for callers that do
//! actual math on the data.

use bytemuck::{Pod, Zeroable};
use static_assertions::{assert_eq_size, const_assert_eq};

pub use nalgebra;

/// 3-component float vector padded to 16 bytes.
///
/// The fourth lane is padding. It is zeroed by every constructor and ignored
/// by equality.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pad: f32,
}

// SAFETY: four f32 fields, no padding bytes, any bit pattern is valid.
unsafe impl Zeroable for Vec3 {}
unsafe impl Pod for Vec3 {}

assert_eq_size!(Vec3, [f32; 4]);
const_assert_eq!(std::mem::align_of::<Vec3>(), 16);

impl Vec3 {
    /// All components zero.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Create a new vector.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, pad: 0.0 }
    }

    /// Components as an array.
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl PartialEq for Vec3 {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.z == other.z
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}

impl From<nalgebra::Vector3<f32>> for Vec3 {
    fn from(v: nalgebra::Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Vec3> for nalgebra::Vector3<f32> {
    fn from(v: Vec3) -> Self {
        nalgebra::Vector3::new(v.x, v.y, v.z)
    }
}

/// 4-component float vector, 16-byte aligned.
///
/// Used for UV layers, which always store four lanes regardless of the
/// declared component width.
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

// SAFETY: four f32 fields, no padding bytes, any bit pattern is valid.
unsafe impl Zeroable for Vec4 {}
unsafe impl Pod for Vec4 {}

assert_eq_size!(Vec4, [f32; 4]);
const_assert_eq!(std::mem::align_of::<Vec4>(), 16);

impl Vec4 {
    /// All components zero.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Create a new vector.
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Components as an array.
    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    /// Components as a mutable array view.
    pub fn as_array_mut(&mut self) -> &mut [f32; 4] {
        bytemuck::cast_mut(self)
    }
}

impl From<[f32; 4]> for Vec4 {
    fn from(a: [f32; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }
}

impl From<nalgebra::Vector4<f32>> for Vec4 {
    fn from(v: nalgebra::Vector4<f32>) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

impl From<Vec4> for nalgebra::Vector4<f32> {
    fn from(v: Vec4) -> Self {
        nalgebra::Vector4::new(v.x, v.y, v.z, v.w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_layout() {
        assert_eq!(std::mem::size_of::<Vec3>(), 16);
        assert_eq!(std::mem::align_of::<Vec3>(), 16);
    }

    #[test]
    fn test_vec3_equality_ignores_padding() {
        let mut a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(1.0, 2.0, 3.0);
        bytemuck::cast_mut::<Vec3, [f32; 4]>(&mut a)[3] = 42.0;
        assert_eq!(a, b);
    }

    #[test]
    fn test_nalgebra_conversion() {
        let v = nalgebra::Vector3::new(0.5, -1.0, 2.0);
        let ours: Vec3 = v.into();
        let back: nalgebra::Vector3<f32> = ours.into();
        assert_eq!(v, back);
    }

    #[test]
    fn test_vec4_array_view() {
        let mut v = Vec4::ZERO;
        v.as_array_mut()[1] = 3.0;
        assert_eq!(v.to_array(), [0.0, 3.0, 0.0, 0.0]);
    }
}
