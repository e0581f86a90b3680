//! Aligned read buffers
//!
//! Each worker owns exactly one buffer for the whole run. The allocation is
//! aligned so the same buffer works for buffered and O_DIRECT reads.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};

/// Memory-aligned, zero-initialised buffer
///
/// This buffer ensures proper alignment (typically 512 or 4096 bytes)
/// required by O_DIRECT file operations.
pub struct AlignedBuffer {
    ptr: *mut u8,
    size: usize,
    layout: Layout,
}

impl AlignedBuffer {
    /// Create a new aligned buffer with the specified size and alignment
    ///
    /// # Panics
    /// Panics if alignment is not a power of 2 or if size is zero
    pub fn new(size: usize, alignment: usize) -> Self {
        assert!(alignment.is_power_of_two(), "Alignment must be a power of 2");
        assert!(size > 0, "Buffer size must be greater than 0");

        let layout = Layout::from_size_align(size, alignment)
            .expect("Invalid layout parameters");

        // SAFETY: layout has a non-zero size
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            handle_alloc_error(layout);
        }

        AlignedBuffer { ptr, size, layout }
    }

    /// Buffer sized for one chunk, aligned for O_DIRECT when requested
    pub fn for_chunk(chunk_size: usize, direct: bool) -> Self {
        let alignment = if direct { 4096 } else { 512 };
        Self::new(chunk_size, alignment)
    }

    /// Get the buffer as a slice
    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is a live allocation of `size` initialised bytes
        unsafe { std::slice::from_raw_parts(self.ptr, self.size) }
    }

    /// Get the buffer as a mutable slice
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr is a live allocation of `size` initialised bytes, uniquely borrowed
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.size) }
    }

    /// Get the size of the buffer in bytes
    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// First 8 bytes interpreted as a little-endian `u64`
    ///
    /// Returns 0 for buffers shorter than 8 bytes.
    #[inline]
    pub fn leading_u64(&self) -> u64 {
        match self.as_slice().get(..8) {
            Some(word) => {
                let mut bytes = [0u8; 8];
                bytes.copy_from_slice(word);
                u64::from_le_bytes(bytes)
            }
            None => 0,
        }
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated with exactly this layout
        unsafe {
            dealloc(self.ptr, self.layout);
        }
    }
}

// AlignedBuffer is Send because it owns its memory
unsafe impl Send for AlignedBuffer {}
