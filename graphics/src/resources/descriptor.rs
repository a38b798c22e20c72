//! Descriptor block exchanged with the graphics subsystem.
//!
//! [`VertexData`] is the `#[repr(C)]` aggregate of counts and raw pointers the
//! subsystem reads when creating or flushing a vertex buffer, and the shape it
//! hands back when asked for a buffer's data. The pointers are never owned by
//! the descriptor itself.

use std::ffi::c_void;
use std::ptr;

use vbmirror_core::Vec3;

/// One UV layer entry in a [`VertexData`] block.
///
/// `array` points at `num * width` floats, tightly packed.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct TexVertArray {
    /// Components per vertex (1..=4).
    pub width: usize,
    /// Start of the layer's float data.
    pub array: *mut c_void,
}

impl TexVertArray {
    /// A layer entry with no data.
    pub const fn null() -> Self {
        Self {
            width: 0,
            array: ptr::null_mut(),
        }
    }
}

/// Counts and pointers describing every attribute array of a vertex buffer.
///
/// Any attribute pointer may be null, meaning the attribute is absent.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct VertexData {
    /// Number of vertices.
    pub num: usize,
    pub points: *mut Vec3,
    pub normals: *mut Vec3,
    pub tangents: *mut Vec3,
    pub colors: *mut u32,
    /// Number of entries in `tvarray`.
    pub num_tex: usize,
    pub tvarray: *mut TexVertArray,
}

impl VertexData {
    /// A descriptor with no vertices and null pointers.
    pub const fn empty() -> Self {
        Self {
            num: 0,
            points: ptr::null_mut(),
            normals: ptr::null_mut(),
            tangents: ptr::null_mut(),
            colors: ptr::null_mut(),
            num_tex: 0,
            tvarray: ptr::null_mut(),
        }
    }

    /// Positions as a float slice (`num * 4` lanes, padding included).
    ///
    /// Read as `f32` so sources aligned to less than 16 bytes stay valid.
    ///
    /// # Safety
    ///
    /// `points` must be null or valid for reads of `num` vectors for `'a`.
    pub unsafe fn points_f32<'a>(&self) -> Option<&'a [f32]> {
        vec3_lanes(self.points, self.num)
    }

    /// Normals as a float slice. See [`Self::points_f32`].
    ///
    /// # Safety
    ///
    /// Same as [`Self::points_f32`] for `normals`.
    pub unsafe fn normals_f32<'a>(&self) -> Option<&'a [f32]> {
        vec3_lanes(self.normals, self.num)
    }

    /// Tangents as a float slice. See [`Self::points_f32`].
    ///
    /// # Safety
    ///
    /// Same as [`Self::points_f32`] for `tangents`.
    pub unsafe fn tangents_f32<'a>(&self) -> Option<&'a [f32]> {
        vec3_lanes(self.tangents, self.num)
    }

    /// Packed colors.
    ///
    /// # Safety
    ///
    /// `colors` must be null or valid for reads of `num` values for `'a`.
    pub unsafe fn colors<'a>(&self) -> Option<&'a [u32]> {
        raw_slice(self.colors.cast_const(), self.num)
    }

    /// The UV layer table.
    ///
    /// # Safety
    ///
    /// `tvarray` must be null or valid for reads of `num_tex` entries for `'a`.
    pub unsafe fn tex_arrays<'a>(&self) -> &'a [TexVertArray] {
        raw_slice(self.tvarray.cast_const(), self.num_tex).unwrap_or(&[])
    }
}

impl Default for VertexData {
    fn default() -> Self {
        Self::empty()
    }
}

impl TexVertArray {
    /// The layer's floats, `num * width` of them. `None` when the array is
    /// null or the width is outside 1..=4.
    ///
    /// # Safety
    ///
    /// `array` must be null or valid for reads of `num * width` floats for `'a`.
    pub unsafe fn floats<'a>(&self, num: usize) -> Option<&'a [f32]> {
        if !(1..=4).contains(&self.width) {
            return None;
        }
        raw_slice(self.array.cast_const().cast::<f32>(), num * self.width)
    }
}

unsafe fn vec3_lanes<'a>(ptr: *const Vec3, num: usize) -> Option<&'a [f32]> {
    raw_slice(ptr.cast::<f32>(), num * 4)
}

unsafe fn raw_slice<'a, T>(ptr: *const T, len: usize) -> Option<&'a [T]> {
    if ptr.is_null() {
        None
    } else {
        Some(std::slice::from_raw_parts(ptr, len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_descriptor() {
        let data = VertexData::empty();
        unsafe {
            assert!(data.points_f32().is_none());
            assert!(data.colors().is_none());
            assert!(data.tex_arrays().is_empty());
        }
    }

    #[test]
    fn test_reads_through_pointers() {
        let mut points = vec![Vec3::new(1.0, 2.0, 3.0), Vec3::new(4.0, 5.0, 6.0)];
        let mut uv = vec![0.25f32, 0.75, 0.5, 1.0];
        let mut table = [TexVertArray {
            width: 2,
            array: uv.as_mut_ptr().cast(),
        }];
        let data = VertexData {
            num: 2,
            points: points.as_mut_ptr(),
            num_tex: 1,
            tvarray: table.as_mut_ptr(),
            ..VertexData::empty()
        };

        unsafe {
            let lanes = data.points_f32().unwrap();
            assert_eq!(lanes.len(), 8);
            assert_eq!(&lanes[4..7], &[4.0, 5.0, 6.0]);
            let layers = data.tex_arrays();
            assert_eq!(layers[0].floats(data.num).unwrap(), &[0.25, 0.75, 0.5, 1.0]);
        }
    }

    #[test]
    fn test_invalid_width_rejected() {
        let mut uv = vec![0.0f32; 10];
        let entry = TexVertArray {
            width: 5,
            array: uv.as_mut_ptr().cast(),
        };
        assert!(unsafe { entry.floats(2) }.is_none());
        assert!(unsafe { TexVertArray::null().floats(2) }.is_none());
    }
}
