//! Tracked heap allocation.
//!
//! [`MemoryTracker`] is generic over an [`AllocStrategy`]: [`Tracking`]
//! records every live block with its call site, [`Passthrough`] forwards to
//! the system allocator with no bookkeeping. The process-wide tracker behind
//! the free functions below picks its strategy with the `leak-tracking` cargo
//! feature, and the engine reports leaks through it as its last shutdown step.
//!
//! Violations detected by the free functions (double free, foreign block,
//! mismatched layout) assert in debug builds. Release builds log them and
//! leave the memory allocated.
//!
//! Tests for the process-wide tracker only run with the feature on:
//! `cargo test -p lumen-engine --features leak-tracking`.

mod report;
mod site;
mod strategy;
mod tracker;

use std::alloc::Layout;

pub use report::LeakReport;
pub use site::Site;
pub use strategy::{AllocStrategy, AllocationRecord, Passthrough, Tracking};
pub use tracker::{Block, MemoryError, MemoryTracker, MemoryViolation};

#[cfg(feature = "leak-tracking")]
pub type ActiveStrategy = Tracking;

#[cfg(not(feature = "leak-tracking"))]
pub type ActiveStrategy = Passthrough;

static GLOBAL: MemoryTracker<ActiveStrategy> = MemoryTracker::new(ActiveStrategy::new());

/// The process-wide tracker.
pub fn global() -> &'static MemoryTracker<ActiveStrategy> {
    &GLOBAL
}

#[track_caller]
pub fn allocate(layout: Layout) -> Option<Block> {
    global().allocate(layout, Site::caller())
}

#[track_caller]
pub fn allocate_zeroed(layout: Layout) -> Option<Block> {
    global().allocate_zeroed(layout, Site::caller())
}

#[track_caller]
pub fn duplicate_str(s: &str) -> Option<Block> {
    global().duplicate_str(s, Site::caller())
}

#[track_caller]
pub fn reallocate(block: &mut Block, new_size: usize) -> Result<(), MemoryError> {
    let result = global().reallocate(block, new_size, Site::caller());
    if let Err(MemoryError::Violation(v)) = &result {
        contract_violation(v);
    }
    result
}

#[track_caller]
pub fn free(block: Block) {
    if let Err(v) = global().free(block, Site::caller()) {
        contract_violation(&v);
    }
}

/// Logs the process-wide leak report and returns it.
pub fn report() -> LeakReport {
    let report = global().report();
    report.emit();
    report
}

fn contract_violation(v: &MemoryViolation) {
    debug_assert!(false, "memory contract violated: {v}");
    log::error!("memory contract violated: {v}; block left allocated");
}

#[cfg(all(test, feature = "leak-tracking"))]
mod tests {
    use super::*;

    /// Each violation test takes an alignment no other test uses, so a
    /// reused address can never match a live block's layout.
    fn odd_layout(align: usize) -> Layout {
        Layout::from_size_align(24, align).unwrap()
    }

    fn leaked_at(line: u32) -> usize {
        report()
            .leaks()
            .iter()
            .filter(|r| r.site.line == line && r.site.file.ends_with("mod.rs"))
            .count()
    }

    #[test]
    fn global_tracker_records_call_sites() {
        assert!(global().is_tracking());

        let freed_line = line!() + 1;
        let freed = allocate(Layout::new::<[u64; 4]>()).unwrap();
        let kept_line = line!() + 1;
        let kept = duplicate_str("still here").unwrap();

        free(freed);
        assert_eq!(leaked_at(freed_line), 0);
        assert_eq!(leaked_at(kept_line), 1);

        free(kept);
        assert_eq!(leaked_at(kept_line), 0);
    }

    #[test]
    fn reallocate_reports_the_new_site_and_size() {
        let mut block = allocate_zeroed(Layout::array::<u8>(4).unwrap()).unwrap();
        let moved_line = line!() + 1;
        reallocate(&mut block, 300).unwrap();

        let report = report();
        let record = report
            .leaks()
            .iter()
            .find(|r| r.address == block.address())
            .unwrap();
        assert_eq!(record.size, 300);
        assert_eq!(record.site.line, moved_line);

        free(block);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "memory contract violated")]
    fn double_free_asserts_in_debug() {
        let block = allocate(odd_layout(256)).unwrap();
        let (ptr, layout, len) = block.into_raw_parts();

        // SAFETY: parts come straight from `into_raw_parts`; the second
        // rebuild is rejected before any memory is touched.
        free(unsafe { Block::from_raw_parts(ptr, layout, len) });
        free(unsafe { Block::from_raw_parts(ptr, layout, len) });
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "memory contract violated")]
    fn reallocating_a_freed_block_asserts_in_debug() {
        let block = allocate(odd_layout(512)).unwrap();
        let (ptr, layout, len) = block.into_raw_parts();

        // SAFETY: as above; the stale block is rejected untouched.
        free(unsafe { Block::from_raw_parts(ptr, layout, len) });
        let mut stale = unsafe { Block::from_raw_parts(ptr, layout, len) };
        let _ = reallocate(&mut stale, 64);
    }
}

#[cfg(all(test, not(feature = "leak-tracking")))]
mod passthrough_tests {
    use super::*;

    #[test]
    fn global_tracker_forwards_without_a_table() {
        assert!(!global().is_tracking());

        let mut block = duplicate_str("abc").unwrap();
        reallocate(&mut block, 16).unwrap();
        free(block);

        let report = report();
        assert!(!report.is_tracking());
        assert!(report.leaks().is_empty());
    }
}
