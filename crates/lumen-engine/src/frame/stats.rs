use std::fmt;

/// Running totals of frame outcomes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames submitted and presented.
    pub presented: u64,
    /// Frames dropped because no output target could be acquired.
    pub skipped: u64,
    /// Frames whose submission failed and were discarded.
    pub discarded: u64,
}

impl FrameStats {
    #[inline]
    pub fn total(&self) -> u64 {
        self.presented + self.skipped + self.discarded
    }
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames ({} presented, {} skipped, {} discarded)",
            self.total(),
            self.presented,
            self.skipped,
            self.discarded
        )
    }
}
