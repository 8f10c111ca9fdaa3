use std::alloc::{self, Layout};
use std::ptr::{self, NonNull};

use thiserror::Error;

use super::{AllocStrategy, LeakReport, Site};

/// Misuse of the memory API detected at a free or reallocate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryViolation {
    /// Double free, or a block this tracker never handed out.
    #[error("block {address:#x} is not a live allocation (at {site})")]
    UnknownBlock { address: usize, site: Site },

    #[error("block {address:#x} freed with {given:?}, allocated with {recorded:?} (at {site})")]
    LayoutMismatch {
        address: usize,
        recorded: Layout,
        given: Layout,
        site: Site,
    },
}

/// Failure of a tracked reallocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("out of memory: {size} bytes requested at {site}")]
    OutOfMemory { size: usize, site: Site },

    #[error(transparent)]
    Violation(#[from] MemoryViolation),
}

/// Owned heap block handed out by a [`MemoryTracker`].
///
/// A block has no destructor: it must go back through
/// [`MemoryTracker::free`], and one that never does is reported as a leak.
#[derive(Debug)]
pub struct Block {
    ptr: NonNull<u8>,
    layout: Layout,
    len: usize,
}

impl Block {
    /// Rebuilds a block from [`into_raw_parts`](Self::into_raw_parts).
    ///
    /// # Safety
    ///
    /// `ptr`, `layout` and `len` must come from one `into_raw_parts` call,
    /// and the memory must not have been freed since.
    pub unsafe fn from_raw_parts(ptr: NonNull<u8>, layout: Layout, len: usize) -> Self {
        Self { ptr, layout, len }
    }

    /// Pointer, allocation layout and requested length.
    pub fn into_raw_parts(self) -> (NonNull<u8>, Layout, usize) {
        (self.ptr, self.layout, self.len)
    }

    #[inline]
    pub fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn address(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Requested size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Layout of the underlying allocation.
    #[inline]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Views the block as bytes.
    ///
    /// # Safety
    ///
    /// The first `len()` bytes must have been initialized, e.g. by
    /// `allocate_zeroed`, `duplicate_str` or explicit writes.
    pub unsafe fn as_slice(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

/// Allocation front end with a compile-time bookkeeping strategy.
///
/// All memory comes from the system allocator. Zero-sized requests are
/// served with a one-byte allocation so every block has a unique address.
#[derive(Debug, Default)]
pub struct MemoryTracker<S> {
    strategy: S,
}

impl<S: AllocStrategy> MemoryTracker<S> {
    pub const fn new(strategy: S) -> Self {
        Self { strategy }
    }

    /// Whether this tracker records allocations.
    #[inline]
    pub const fn is_tracking(&self) -> bool {
        S::TRACKING
    }

    pub fn allocate(&self, layout: Layout, site: Site) -> Option<Block> {
        self.alloc_with(layout, site, false)
    }

    pub fn allocate_zeroed(&self, layout: Layout, site: Site) -> Option<Block> {
        self.alloc_with(layout, site, true)
    }

    fn alloc_with(&self, layout: Layout, site: Site, zeroed: bool) -> Option<Block> {
        let real = padded(layout)?;
        // SAFETY: `real` has a non-zero size.
        let raw = unsafe {
            if zeroed {
                alloc::alloc_zeroed(real)
            } else {
                alloc::alloc(real)
            }
        };
        let ptr = NonNull::new(raw)?;

        self.strategy
            .record(ptr.as_ptr() as usize, layout.size(), real, site);
        Some(Block {
            ptr,
            layout: real,
            len: layout.size(),
        })
    }

    /// Copies `s` into a fresh tracked block.
    pub fn duplicate_str(&self, s: &str, site: Site) -> Option<Block> {
        let block = self.allocate(Layout::for_value(s.as_bytes()), site)?;
        // SAFETY: the block holds at least `s.len()` writable bytes and cannot
        // overlap a borrowed `str`.
        unsafe { ptr::copy_nonoverlapping(s.as_ptr(), block.as_ptr(), s.len()) };
        Some(block)
    }

    /// Resizes `block` in place or by moving it; contents are preserved up to
    /// the smaller size.
    ///
    /// On error `block` is left untouched. The record stays live throughout,
    /// so a concurrent [`report`](Self::report) never misses the block.
    pub fn reallocate(
        &self,
        block: &mut Block,
        new_size: usize,
        site: Site,
    ) -> Result<(), MemoryError> {
        let old = block.layout;
        let new_layout = Layout::from_size_align(new_size, old.align())
            .ok()
            .and_then(padded)
            .ok_or(MemoryError::OutOfMemory { size: new_size, site })?;

        let moved = self.strategy.relocate(block, site, || {
            // SAFETY: `relocate` only calls this once `block` is known live
            // with layout `old` (when tracking); the new size is non-zero and
            // fits `isize`.
            let raw = unsafe { alloc::realloc(block.as_ptr(), old, new_layout.size()) };
            NonNull::new(raw).map(|ptr| Block {
                ptr,
                layout: new_layout,
                len: new_size,
            })
        })?;

        *block = moved.ok_or(MemoryError::OutOfMemory { size: new_size, site })?;
        Ok(())
    }

    /// Returns `block` to the system allocator.
    ///
    /// A violation leaves the memory allocated; freeing an address the
    /// tracker cannot vouch for is never safe.
    pub fn free(&self, block: Block, site: Site) -> Result<(), MemoryViolation> {
        self.strategy.release(block.address(), block.layout, site)?;
        // SAFETY: the block came from `alloc_with`/`reallocate` with this
        // layout and, being owned, has not been freed yet.
        unsafe { alloc::dealloc(block.as_ptr(), block.layout) };
        Ok(())
    }

    /// Snapshot of live allocations. Does not modify the table.
    pub fn report(&self) -> LeakReport {
        LeakReport::new(S::TRACKING, self.strategy.live())
    }
}

fn padded(layout: Layout) -> Option<Layout> {
    Layout::from_size_align(layout.size().max(1), layout.align()).ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use crate::memory::{Passthrough, Tracking};

    fn bytes(n: usize) -> Layout {
        Layout::array::<u8>(n).unwrap()
    }

    // ── tracking ──────────────────────────────────────────────────────────

    #[test]
    fn report_is_empty_after_all_frees() {
        let t = MemoryTracker::new(Tracking::new());
        let a = t.allocate(bytes(16), crate::here!()).unwrap();
        let b = t.allocate_zeroed(bytes(64), crate::here!()).unwrap();
        let c = t.duplicate_str("lumen", crate::here!()).unwrap();

        t.free(b, crate::here!()).unwrap();
        t.free(a, crate::here!()).unwrap();
        t.free(c, crate::here!()).unwrap();

        assert!(t.report().is_clean());
    }

    #[test]
    fn omitted_free_is_reported_with_its_call_site() {
        let t = MemoryTracker::new(Tracking::new());
        let kept = t.allocate(bytes(8), crate::here!()).unwrap();
        let leak_line = line!() + 1;
        let leaked = t.allocate(bytes(24), Site::caller()).unwrap();
        t.free(kept, crate::here!()).unwrap();

        let report = t.report();
        assert_eq!(report.leaks().len(), 1);
        let leak = &report.leaks()[0];
        assert_eq!(leak.address, leaked.address());
        assert_eq!(leak.size, 24);
        assert_eq!(leak.site.line, leak_line);
        assert!(leak.site.file.ends_with("tracker.rs"));

        t.free(leaked, crate::here!()).unwrap();
    }

    #[test]
    fn report_is_idempotent() {
        let t = MemoryTracker::new(Tracking::new());
        let block = t.allocate(bytes(4), crate::here!()).unwrap();

        assert_eq!(t.report(), t.report());
        t.free(block, crate::here!()).unwrap();
    }

    #[test]
    fn double_free_is_detected() {
        let t = MemoryTracker::new(Tracking::new());
        let block = t.allocate(bytes(32), crate::here!()).unwrap();
        let (ptr, layout, len) = block.into_raw_parts();

        // SAFETY: parts come straight from `into_raw_parts`.
        t.free(unsafe { Block::from_raw_parts(ptr, layout, len) }, crate::here!())
            .unwrap();
        let again = unsafe { Block::from_raw_parts(ptr, layout, len) };
        let err = t.free(again, crate::here!()).unwrap_err();
        assert!(matches!(err, MemoryViolation::UnknownBlock { .. }));
        assert!(err.to_string().contains("tracker.rs"));
    }

    #[test]
    fn foreign_block_is_not_freed() {
        let ours = MemoryTracker::new(Tracking::new());
        let theirs = MemoryTracker::new(Tracking::new());
        let block = theirs.allocate(bytes(8), crate::here!()).unwrap();
        let (ptr, layout, len) = block.into_raw_parts();

        let err = ours
            .free(unsafe { Block::from_raw_parts(ptr, layout, len) }, crate::here!())
            .unwrap_err();
        assert!(matches!(err, MemoryViolation::UnknownBlock { .. }));

        // Still live (and freeable) in its own tracker.
        assert_eq!(theirs.report().leaks().len(), 1);
        theirs
            .free(unsafe { Block::from_raw_parts(ptr, layout, len) }, crate::here!())
            .unwrap();
    }

    #[test]
    fn reallocate_moves_the_record_and_keeps_contents() {
        let t = MemoryTracker::new(Tracking::new());
        let mut block = t.duplicate_str("abcd", crate::here!()).unwrap();

        t.reallocate(&mut block, 4096, crate::here!()).unwrap();
        assert_eq!(block.len(), 4096);
        // SAFETY: only the first four bytes are read, and they were copied.
        assert_eq!(unsafe { &block.as_slice()[..4] }, b"abcd");

        let report = t.report();
        assert_eq!(report.leaks().len(), 1);
        assert_eq!(report.leaks()[0].address, block.address());
        assert_eq!(report.leaks()[0].size, 4096);

        t.free(block, crate::here!()).unwrap();
        assert!(t.report().is_clean());
    }

    #[test]
    fn zero_sized_requests_get_distinct_blocks() {
        let t = MemoryTracker::new(Tracking::new());
        let a = t.allocate(bytes(0), crate::here!()).unwrap();
        let b = t.duplicate_str("", crate::here!()).unwrap();

        assert!(a.is_empty());
        assert_ne!(a.address(), b.address());
        t.free(a, crate::here!()).unwrap();
        t.free(b, crate::here!()).unwrap();
    }

    #[test]
    fn zero_sized_block_keeps_its_length_through_raw_parts() {
        let t = MemoryTracker::new(Tracking::new());
        let block = t.allocate(bytes(0), crate::here!()).unwrap();
        let (ptr, layout, len) = block.into_raw_parts();
        assert_eq!(layout.size(), 1);

        // SAFETY: parts come straight from `into_raw_parts`.
        let block = unsafe { Block::from_raw_parts(ptr, layout, len) };
        assert_eq!(block.len(), 0);
        assert!(block.is_empty());
        assert_eq!(t.report().leaks()[0].size, block.len());
        t.free(block, crate::here!()).unwrap();
    }

    #[test]
    fn reallocate_of_a_freed_block_is_rejected_untouched() {
        let t = MemoryTracker::new(Tracking::new());
        let block = t.allocate(bytes(16), crate::here!()).unwrap();
        let (ptr, layout, len) = block.into_raw_parts();
        // SAFETY: parts come straight from `into_raw_parts`.
        t.free(unsafe { Block::from_raw_parts(ptr, layout, len) }, crate::here!())
            .unwrap();

        let mut stale = unsafe { Block::from_raw_parts(ptr, layout, len) };
        let err = t.reallocate(&mut stale, 64, crate::here!()).unwrap_err();
        assert!(matches!(err, MemoryError::Violation(MemoryViolation::UnknownBlock { .. })));
        assert_eq!(stale.address(), ptr.as_ptr() as usize);
        assert_eq!(stale.len(), 16);
        assert!(t.report().is_clean());
    }

    #[test]
    fn report_never_misses_a_block_being_reallocated() {
        let t = Arc::new(MemoryTracker::new(Tracking::new()));
        let block = t.allocate(bytes(8), crate::here!()).unwrap();
        let (ptr, layout, len) = block.into_raw_parts();
        let parts = (ptr.as_ptr() as usize, layout, len);

        let mover = {
            let t = Arc::clone(&t);
            thread::spawn(move || {
                let (address, layout, len) = parts;
                let ptr = NonNull::new(address as *mut u8).unwrap();
                // SAFETY: rebuilt from the parts taken above, still live.
                let mut block = unsafe { Block::from_raw_parts(ptr, layout, len) };
                for n in 0..500 {
                    t.reallocate(&mut block, 8 + (n % 7) * 512, crate::here!())
                        .unwrap();
                }
                let (ptr, layout, len) = block.into_raw_parts();
                (ptr.as_ptr() as usize, layout, len)
            })
        };

        while !mover.is_finished() {
            assert_eq!(t.report().leaks().len(), 1);
        }

        let (address, layout, len) = mover.join().unwrap();
        let ptr = NonNull::new(address as *mut u8).unwrap();
        t.free(unsafe { Block::from_raw_parts(ptr, layout, len) }, crate::here!())
            .unwrap();
        assert!(t.report().is_clean());
    }

    #[test]
    fn concurrent_traffic_is_tracked_consistently() {
        let t = Arc::new(MemoryTracker::new(Tracking::new()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let t = Arc::clone(&t);
                thread::spawn(move || {
                    let mut blocks = Vec::new();
                    for n in 0..200 {
                        blocks.push(t.allocate(bytes(n + i), crate::here!()).unwrap());
                    }
                    // Leave exactly one block per thread behind.
                    let keep = blocks.pop().unwrap();
                    for b in blocks {
                        t.free(b, crate::here!()).unwrap();
                    }
                    let (ptr, layout, len) = keep.into_raw_parts();
                    (ptr.as_ptr() as usize, layout, len)
                })
            })
            .collect();

        let kept: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(t.report().leaks().len(), 8);

        for (address, layout, len) in kept {
            let ptr = NonNull::new(address as *mut u8).unwrap();
            t.free(unsafe { Block::from_raw_parts(ptr, layout, len) }, crate::here!())
                .unwrap();
        }
        assert!(t.report().is_clean());
    }

    // ── passthrough ───────────────────────────────────────────────────────

    #[test]
    fn passthrough_allocates_without_bookkeeping() {
        let t = MemoryTracker::new(Passthrough::new());
        let mut block = t.duplicate_str("hello", crate::here!()).unwrap();
        t.reallocate(&mut block, 10, crate::here!()).unwrap();

        // SAFETY: first five bytes were copied by `duplicate_str`.
        assert_eq!(unsafe { &block.as_slice()[..5] }, b"hello");
        assert!(!t.is_tracking());
        assert!(t.report().leaks().is_empty());

        t.free(block, crate::here!()).unwrap();
    }
}
