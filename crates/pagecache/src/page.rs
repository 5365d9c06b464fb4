//! Page-aligned buffers and the page metadata stored in each cache slot.

use std::alloc::{Layout, alloc_zeroed, dealloc};
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;
use std::slice;

/// A zero-initialized, `align`-aligned heap buffer that owns its memory.
///
/// Modeled on the allocation-aware page buffer used by reference page
/// caches that require OS-alignment for unbuffered I/O: one allocation per
/// slot, reused in place across evictions rather than freed and
/// reallocated.
pub struct AlignedBuffer {
    ptr: NonNull<u8>,
    layout: Layout,
}

// The buffer is exclusively owned by whichever `Page` holds it; it is never
// aliased across threads without that owner's synchronization.
unsafe impl Send for AlignedBuffer {}

impl AlignedBuffer {
    /// Allocates `size` zeroed bytes aligned to `align`. Returns `None` on
    /// allocation failure, mapped by callers to `OUT_OF_MEMORY`.
    pub fn new(size: usize, align: usize) -> Option<Self> {
        let layout = Layout::from_size_align(size, align).ok()?;
        let ptr = if layout.size() == 0 {
            NonNull::dangling()
        } else {
            NonNull::new(unsafe { alloc_zeroed(layout) })?
        };
        Some(Self { ptr, layout })
    }
}

impl Deref for AlignedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl DerefMut for AlignedBuffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.layout.size())
            .finish()
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        if self.layout.size() != 0 {
            unsafe { dealloc(self.ptr.as_ptr(), self.layout) };
        }
    }
}

/// One logical page-aligned block of file data, plus the clock-algorithm
/// bookkeeping for the slot it occupies.
#[derive(Debug)]
pub struct Page {
    /// Byte offset in the file; a multiple of the page size.
    pub offset: u64,
    /// Length of `data`. Always the page size once populated.
    pub size: usize,
    /// Exclusively owned, page-aligned buffer.
    pub data: AlignedBuffer,
    /// Set on every write through the cache; cleared by a successful flush.
    pub dirty: bool,
    /// Clock second-chance bit; set on every hit, cleared by the sweeping
    /// hand.
    pub referenced: bool,
}
