use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic tick source used by [`FrameClock`](super::FrameClock).
///
/// Timestamps are raw ticks; `frequency()` ticks make one second.
pub trait TimeSource {
    fn now(&self) -> u64;

    fn frequency(&self) -> u64;

    /// Suspends the calling thread (or simulates it) for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Wall-clock source backed by `std::time::Instant`, in nanoseconds.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    epoch: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { epoch: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicClock {
    #[inline]
    fn now(&self) -> u64 {
        // u64 nanoseconds overflow after ~584 years of uptime.
        self.epoch.elapsed().as_nanos() as u64
    }

    #[inline]
    fn frequency(&self) -> u64 {
        1_000_000_000
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Deterministic, manually stepped time source.
///
/// Clones share the same timeline, so a host (or test) can keep a handle and
/// advance time while the engine owns another. `sleep` advances the timeline
/// instead of blocking.
#[derive(Debug, Clone)]
pub struct ManualClock {
    inner: Rc<ManualInner>,
}

#[derive(Debug)]
struct ManualInner {
    ticks: Cell<u64>,
    frequency: u64,
    slept: Cell<Duration>,
}

impl ManualClock {
    /// Creates a clock at tick zero with the given ticks-per-second.
    pub fn new(frequency: u64) -> Self {
        assert!(frequency > 0, "ManualClock frequency must be non-zero");
        Self {
            inner: Rc::new(ManualInner {
                ticks: Cell::new(0),
                frequency,
                slept: Cell::new(Duration::ZERO),
            }),
        }
    }

    /// Millisecond-resolution clock.
    pub fn millis() -> Self {
        Self::new(1_000)
    }

    pub fn advance(&self, duration: Duration) {
        let ticks = (duration.as_secs_f64() * self.inner.frequency as f64).round() as u64;
        self.inner.ticks.set(self.inner.ticks.get().saturating_add(ticks));
    }

    /// Jumps to an absolute tick, possibly backwards.
    pub fn set_ticks(&self, ticks: u64) {
        self.inner.ticks.set(ticks);
    }

    pub fn ticks(&self) -> u64 {
        self.inner.ticks.get()
    }

    /// Total time requested through `sleep`.
    pub fn total_slept(&self) -> Duration {
        self.inner.slept.get()
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> u64 {
        self.inner.ticks.get()
    }

    fn frequency(&self) -> u64 {
        self.inner.frequency
    }

    fn sleep(&self, duration: Duration) {
        self.inner.slept.set(self.inner.slept.get() + duration);
        self.advance(duration);
    }
}
