use std::alloc::Layout;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{Block, MemoryViolation, Site};

/// One live allocation known to a tracking strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    pub address: usize,
    /// Bytes requested by the caller.
    pub size: usize,
    /// Layout handed to the system allocator.
    pub layout: Layout,
    pub site: Site,
    /// Allocation order within the owning tracker.
    pub sequence: u64,
}

/// Bookkeeping policy of a [`MemoryTracker`](super::MemoryTracker).
///
/// The tracker calls `record` after every successful allocation and
/// `release` before handing memory back to the system allocator. `release`
/// is the only place a contract violation can be detected.
pub trait AllocStrategy: Send + Sync {
    /// Whether this strategy keeps a record table.
    const TRACKING: bool;

    fn record(&self, address: usize, size: usize, layout: Layout, site: Site);

    /// Removes and returns the record for `address`.
    ///
    /// Errors when the address is unknown or `layout` differs from the one
    /// it was allocated with. Strategies without a table return `Ok(None)`.
    fn release(
        &self,
        address: usize,
        layout: Layout,
        site: Site,
    ) -> Result<Option<AllocationRecord>, MemoryViolation>;

    /// Moves the record of `block` to the block `resize` returns.
    ///
    /// `resize` runs with the table held, so a concurrent [`live`](Self::live)
    /// sees either the old block or the new one. When it returns `None` the
    /// record is left as it was.
    fn relocate<F>(
        &self,
        block: &Block,
        site: Site,
        resize: F,
    ) -> Result<Option<Block>, MemoryViolation>
    where
        F: FnOnce() -> Option<Block>;

    /// Snapshot of live records ordered by allocation sequence.
    fn live(&self) -> Vec<AllocationRecord>;
}

/// Forwards straight to the system allocator. No state, no lock.
#[derive(Debug, Default, Copy, Clone)]
pub struct Passthrough;

impl Passthrough {
    pub const fn new() -> Self {
        Passthrough
    }
}

impl AllocStrategy for Passthrough {
    const TRACKING: bool = false;

    #[inline(always)]
    fn record(&self, _address: usize, _size: usize, _layout: Layout, _site: Site) {}

    #[inline(always)]
    fn release(
        &self,
        _address: usize,
        _layout: Layout,
        _site: Site,
    ) -> Result<Option<AllocationRecord>, MemoryViolation> {
        Ok(None)
    }

    #[inline(always)]
    fn relocate<F>(
        &self,
        _block: &Block,
        _site: Site,
        resize: F,
    ) -> Result<Option<Block>, MemoryViolation>
    where
        F: FnOnce() -> Option<Block>,
    {
        Ok(resize())
    }

    fn live(&self) -> Vec<AllocationRecord> {
        Vec::new()
    }
}

#[derive(Debug)]
struct Table {
    records: BTreeMap<usize, AllocationRecord>,
    next_sequence: u64,
}

impl Table {
    fn insert(&mut self, address: usize, size: usize, layout: Layout, site: Site) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let record = AllocationRecord {
            address,
            size,
            layout,
            site,
            sequence,
        };
        if let Some(stale) = self.records.insert(address, record) {
            log::error!(
                "memory: address {address:#x} handed out twice (previous from {})",
                stale.site
            );
        }
    }

    /// Errors unless `address` is live with exactly `layout`.
    fn check(&self, address: usize, layout: Layout, site: Site) -> Result<(), MemoryViolation> {
        let Some(record) = self.records.get(&address) else {
            return Err(MemoryViolation::UnknownBlock { address, site });
        };
        if record.layout != layout {
            return Err(MemoryViolation::LayoutMismatch {
                address,
                recorded: record.layout,
                given: layout,
                site,
            });
        }
        Ok(())
    }
}

/// Records every live allocation with its call site.
///
/// The table sits behind a mutex, so any thread may allocate or free.
#[derive(Debug)]
pub struct Tracking {
    table: Mutex<Table>,
}

impl Tracking {
    pub const fn new() -> Self {
        Self {
            table: Mutex::new(Table {
                records: BTreeMap::new(),
                next_sequence: 0,
            }),
        }
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Tracking {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocStrategy for Tracking {
    const TRACKING: bool = true;

    fn record(&self, address: usize, size: usize, layout: Layout, site: Site) {
        self.table().insert(address, size, layout, site);
    }

    fn release(
        &self,
        address: usize,
        layout: Layout,
        site: Site,
    ) -> Result<Option<AllocationRecord>, MemoryViolation> {
        let mut table = self.table();
        table.check(address, layout, site)?;
        Ok(table.records.remove(&address))
    }

    fn relocate<F>(
        &self,
        block: &Block,
        site: Site,
        resize: F,
    ) -> Result<Option<Block>, MemoryViolation>
    where
        F: FnOnce() -> Option<Block>,
    {
        let mut table = self.table();
        table.check(block.address(), block.layout(), site)?;

        let Some(moved) = resize() else {
            return Ok(None);
        };
        table.records.remove(&block.address());
        table.insert(moved.address(), moved.len(), moved.layout(), site);
        Ok(Some(moved))
    }

    fn live(&self) -> Vec<AllocationRecord> {
        let mut live: Vec<_> = self.table().records.values().cloned().collect();
        live.sort_by_key(|r| r.sequence);
        live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(size: usize) -> Layout {
        Layout::from_size_align(size, 8).unwrap()
    }

    #[test]
    fn tracking_release_removes_the_record() {
        let t = Tracking::new();
        t.record(0x1000, 16, layout(16), crate::here!());

        let rec = t.release(0x1000, layout(16), crate::here!()).unwrap().unwrap();
        assert_eq!(rec.size, 16);
        assert!(t.live().is_empty());
    }

    #[test]
    fn tracking_rejects_unknown_and_mismatched_frees() {
        let t = Tracking::new();
        t.record(0x2000, 32, layout(32), crate::here!());

        assert!(matches!(
            t.release(0x3000, layout(32), crate::here!()),
            Err(MemoryViolation::UnknownBlock { address: 0x3000, .. })
        ));
        assert!(matches!(
            t.release(0x2000, layout(64), crate::here!()),
            Err(MemoryViolation::LayoutMismatch { address: 0x2000, .. })
        ));
        // Rejected frees leave the record in place.
        assert_eq!(t.live().len(), 1);
    }

    #[test]
    fn live_is_ordered_by_sequence() {
        let t = Tracking::new();
        t.record(0x9000, 1, layout(1), crate::here!());
        t.record(0x1000, 2, layout(2), crate::here!());

        let live = t.live();
        assert_eq!(live[0].address, 0x9000);
        assert_eq!(live[1].address, 0x1000);
        assert!(live[0].sequence < live[1].sequence);
    }

    #[test]
    fn passthrough_keeps_nothing() {
        let p = Passthrough::new();
        p.record(0x1000, 16, layout(16), crate::here!());
        assert_eq!(p.release(0x1000, layout(16), crate::here!()), Ok(None));
        assert!(p.live().is_empty());
    }
}
