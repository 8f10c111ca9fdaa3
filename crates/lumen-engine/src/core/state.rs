use crate::coords::ViewportMapper;

/// Lifecycle phase of an [`Engine`](super::Engine).
///
/// Phases only move forward:
/// `Uninitialized -> Initializing -> Running -> ShuttingDown -> Terminated`.
/// A failed init skips `Running`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum Phase {
    Uninitialized,
    Initializing,
    Running,
    ShuttingDown,
    Terminated,
}

/// Mutable runtime state owned by the engine.
#[derive(Debug, Clone)]
pub struct EngineState {
    /// True from a successful init until shutdown is requested or a fatal
    /// error occurs. Never goes back to true.
    pub(crate) is_running: bool,

    /// Timestamp of the last frame boundary, in time-source ticks.
    pub(crate) last_frame_timestamp: u64,

    /// Seconds between the two most recent frame boundaries.
    pub(crate) delta_time: f64,

    pub(crate) frame_index: u64,

    pub(crate) viewport: ViewportMapper,
}

impl EngineState {
    pub(crate) fn new() -> Self {
        Self {
            is_running: false,
            last_frame_timestamp: 0,
            delta_time: 0.0,
            frame_index: 0,
            viewport: ViewportMapper::new(1, 1),
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    #[inline]
    pub fn last_frame_timestamp(&self) -> u64 {
        self.last_frame_timestamp
    }

    #[inline]
    pub fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Index of the most recently ticked frame.
    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Logical/output sizes, letterbox bars and render scale.
    #[inline]
    pub fn viewport(&self) -> &ViewportMapper {
        &self.viewport
    }
}
