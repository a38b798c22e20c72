//! Over-aligned, zero-initialized heap storage.
//!
//! [`AlignedBuffer<T>`] owns a single allocation whose base address satisfies
//! an alignment stricter than `align_of::<T>()`. Vertex attribute arrays use
//! it so every array starts on a 16-byte boundary regardless of element type
//! (packed `u32` colors included).
//!
//! The allocation is released in `Drop`, so early returns and `?` on partially
//! built state never leak.
//!
//! # Example
//!
//! ```
//! use vbmirror_core::aligned::AlignedBuffer;
//!
//! let mut colors = AlignedBuffer::<u32>::try_zeroed(64).unwrap();
//! assert_eq!(colors.as_ptr() as usize % 16, 0);
//! colors[3] = 0xff00ff00;
//! assert!(colors.iter().filter(|&&c| c != 0).count() == 1);
//! ```

use std::alloc::{self, Layout};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use bytemuck::Pod;
use thiserror::Error;

/// Default alignment for vertex attribute storage.
pub const DEFAULT_ALIGNMENT: usize = 16;

/// Errors from aligned allocation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// The requested length and alignment do not form a valid layout.
    #[error("invalid layout: {len} elements at alignment {align}")]
    LayoutOverflow { len: usize, align: usize },
    /// The global allocator returned null.
    #[error("allocation of {bytes} bytes failed")]
    AllocationFailed { bytes: usize },
}

/// An owning, zero-initialized, over-aligned array of `T`.
///
/// Zero-length buffers never touch the allocator and use a dangling pointer.
pub struct AlignedBuffer<T: Pod> {
    ptr: NonNull<T>,
    len: usize,
    layout: Layout,
}

impl<T: Pod> AlignedBuffer<T> {
    /// An empty buffer. Does not allocate.
    pub fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            len: 0,
            layout: Layout::new::<[T; 0]>(),
        }
    }

    /// Allocate `len` zeroed elements at [`DEFAULT_ALIGNMENT`].
    pub fn try_zeroed(len: usize) -> Result<Self, AllocError> {
        Self::try_zeroed_with_alignment(len, DEFAULT_ALIGNMENT)
    }

    /// Allocate `len` zeroed elements at `align` (raised to `align_of::<T>()`
    /// if smaller).
    ///
    /// # Errors
    ///
    /// Returns [`AllocError::LayoutOverflow`] if `align` is not a power of two
    /// or the byte size overflows, and [`AllocError::AllocationFailed`] if the
    /// allocator is out of memory.
    pub fn try_zeroed_with_alignment(len: usize, align: usize) -> Result<Self, AllocError> {
        let align = align.max(std::mem::align_of::<T>());
        let layout = std::mem::size_of::<T>()
            .checked_mul(len)
            .and_then(|bytes| Layout::from_size_align(bytes, align).ok())
            .ok_or(AllocError::LayoutOverflow { len, align })?;

        if layout.size() == 0 {
            return Ok(Self {
                ptr: NonNull::dangling(),
                len,
                layout,
            });
        }

        // SAFETY: layout has a non-zero size. T is Pod, so all-zero bytes are a
        // valid value for every element.
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(raw.cast::<T>()).ok_or(AllocError::AllocationFailed {
            bytes: layout.size(),
        })?;

        Ok(Self { ptr, len, layout })
    }

    /// Allocate a new buffer with the same length, alignment and contents.
    pub fn try_clone(&self) -> Result<Self, AllocError> {
        let mut copy = Self::try_zeroed_with_alignment(self.len, self.layout.align())?;
        copy.copy_from_slice(self);
        Ok(copy)
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Alignment of the base address in bytes.
    pub fn alignment(&self) -> usize {
        self.layout.align()
    }

    /// Base pointer, without creating an intermediate reference.
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable base pointer, without creating an intermediate reference.
    ///
    /// Pointers handed to external consumers should come from here so they
    /// stay valid across later slice borrows.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Set every element back to zero.
    pub fn zero(&mut self) {
        bytemuck::fill_zeroes(self.as_mut_slice());
    }

    /// Borrow as a slice.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: ptr is valid for len initialized elements (or dangling with
        // len 0) for as long as self is borrowed.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    /// Borrow as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as above, and &mut self guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T: Pod> Default for AlignedBuffer<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Pod> Deref for AlignedBuffer<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: Pod> DerefMut for AlignedBuffer<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Pod> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            // SAFETY: ptr was returned by alloc_zeroed with this exact layout
            // and is freed only here.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), self.layout) };
        }
    }
}

impl<T: Pod> fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("align", &self.layout.align())
            .finish()
    }
}

// SAFETY: AlignedBuffer uniquely owns its allocation, like Box<[T]>.
unsafe impl<T: Pod + Send> Send for AlignedBuffer<T> {}
unsafe impl<T: Pod + Sync> Sync for AlignedBuffer<T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec3, Vec4};

    #[test]
    fn test_alignment_and_zeroing() {
        let buffer = AlignedBuffer::<u32>::try_zeroed(1000).unwrap();
        assert_eq!(buffer.as_ptr() as usize % DEFAULT_ALIGNMENT, 0);
        assert_eq!(buffer.alignment(), DEFAULT_ALIGNMENT);
        assert!(buffer.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_vector_buffers() {
        let positions = AlignedBuffer::<Vec3>::try_zeroed(17).unwrap();
        let uvs = AlignedBuffer::<Vec4>::try_zeroed(17).unwrap();
        assert_eq!(positions.len(), 17);
        assert!(positions.iter().all(|p| *p == Vec3::ZERO));
        assert!(uvs.iter().all(|uv| *uv == Vec4::ZERO));
    }

    #[test]
    fn test_zero_length() {
        let buffer = AlignedBuffer::<Vec3>::try_zeroed(0).unwrap();
        assert!(buffer.is_empty());
        assert!(buffer.as_slice().is_empty());
        let copy = buffer.try_clone().unwrap();
        assert!(copy.is_empty());
        assert!(AlignedBuffer::<u32>::empty().is_empty());
    }

    #[test]
    fn test_larger_alignment() {
        let buffer = AlignedBuffer::<u8>::try_zeroed_with_alignment(3, 64).unwrap();
        assert_eq!(buffer.as_ptr() as usize % 64, 0);
    }

    #[test]
    fn test_invalid_alignment() {
        let err = AlignedBuffer::<u8>::try_zeroed_with_alignment(3, 24).unwrap_err();
        assert_eq!(err, AllocError::LayoutOverflow { len: 3, align: 24 });
    }

    #[test]
    fn test_size_overflow() {
        let err = AlignedBuffer::<Vec4>::try_zeroed(usize::MAX).unwrap_err();
        assert!(matches!(err, AllocError::LayoutOverflow { .. }));
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = AlignedBuffer::<u32>::try_zeroed(8).unwrap();
        original[2] = 7;
        let copy = original.try_clone().unwrap();
        original[2] = 9;
        assert_eq!(copy[2], 7);
        assert_ne!(copy.as_ptr(), original.as_ptr());
    }

    #[test]
    fn test_zero_resets_contents() {
        let mut buffer = AlignedBuffer::<u32>::try_zeroed(4).unwrap();
        buffer.fill(5);
        buffer.zero();
        assert!(buffer.iter().all(|&c| c == 0));
    }
}
