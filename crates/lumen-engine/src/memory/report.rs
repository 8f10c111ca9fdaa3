use std::fmt;

use super::AllocationRecord;

/// Live allocations at the moment of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeakReport {
    tracking: bool,
    leaks: Vec<AllocationRecord>,
}

impl LeakReport {
    pub(crate) fn new(tracking: bool, leaks: Vec<AllocationRecord>) -> Self {
        Self { tracking, leaks }
    }

    /// `false` when built without leak tracking; such a report is always empty.
    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    #[inline]
    pub fn is_clean(&self) -> bool {
        self.leaks.is_empty()
    }

    /// Leaked allocations, oldest first.
    #[inline]
    pub fn leaks(&self) -> &[AllocationRecord] {
        &self.leaks
    }

    pub fn leaked_bytes(&self) -> usize {
        self.leaks.iter().map(|l| l.size).sum()
    }

    /// Logs the report: one `warn` line per leak, or a single `info` line.
    pub fn emit(&self) {
        if !self.tracking {
            log::debug!("memory: leak tracking disabled");
            return;
        }
        if self.leaks.is_empty() {
            log::info!("memory: no leaks");
            return;
        }
        for leak in &self.leaks {
            log::warn!(
                "memory: leaked {} bytes at {:#x}, allocated at {}",
                leak.size,
                leak.address,
                leak.site
            );
        }
        log::warn!(
            "memory: {} leak(s), {} bytes total",
            self.leaks.len(),
            self.leaked_bytes()
        );
    }
}

impl fmt::Display for LeakReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.tracking {
            return f.write_str("leak tracking disabled");
        }
        if self.leaks.is_empty() {
            return f.write_str("no leaks");
        }
        for leak in &self.leaks {
            writeln!(f, "{:#x}: {} bytes, {}", leak.address, leak.size, leak.site)?;
        }
        write!(f, "{} leak(s), {} bytes", self.leaks.len(), self.leaked_bytes())
    }
}
