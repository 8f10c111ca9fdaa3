use std::time::Duration;

use super::{MonotonicClock, TimeSource};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds elapsed since the previous tick. Never negative.
    pub dt: f64,

    /// Raw timestamp taken at the tick, in source ticks.
    pub now: u64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots and pacing frames.
///
/// The first `tick()` after construction or [`reset`](Self::reset) reports a
/// zero delta; it only establishes the baseline. A clock rollback clamps the
/// delta to zero.
#[derive(Debug, Clone)]
pub struct FrameClock<T = MonotonicClock> {
    source: T,
    last: u64,
    tick_start: u64,
    primed: bool,
    target_fps: u32,
    frame_index: u64,
}

impl<T: TimeSource> FrameClock<T> {
    /// Creates a clock; `target_fps == 0` disables pacing.
    pub fn new(source: T, target_fps: u32) -> Self {
        let now = source.now();
        Self {
            source,
            last: now,
            tick_start: now,
            primed: false,
            target_fps,
            frame_index: 0,
        }
    }

    /// Re-captures the baseline. The next tick reports `dt == 0`.
    ///
    /// Called right after the host's load step so asset setup time never
    /// leaks into the first frame.
    pub fn reset(&mut self) {
        let now = self.source.now();
        self.last = now;
        self.tick_start = now;
        self.primed = false;
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = self.source.now();

        let dt = if !self.primed {
            self.primed = true;
            0.0
        } else if now < self.last {
            log::warn!(
                "frame clock went backwards by {} ticks; clamping delta to zero",
                self.last - now
            );
            0.0
        } else {
            (now - self.last) as f64 / self.source.frequency() as f64
        };

        self.last = now;
        self.tick_start = now;

        let ft = FrameTime {
            dt,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }

    /// Sleeps away whatever remains of the frame budget when a cap is set.
    ///
    /// Returns the requested sleep, if any.
    pub fn end_frame(&mut self) -> Option<Duration> {
        if self.target_fps == 0 {
            return None;
        }

        let budget = 1.0 / self.target_fps as f64;
        let ticks = self.source.now().saturating_sub(self.tick_start);
        let elapsed = ticks as f64 / self.source.frequency() as f64;
        let remaining = budget - elapsed;
        if remaining <= 0.0 {
            return None;
        }

        let pause = Duration::from_secs_f64(remaining);
        self.source.sleep(pause);
        Some(pause)
    }

    #[inline]
    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    #[inline]
    pub fn set_target_fps(&mut self, fps: u32) {
        self.target_fps = fps;
    }

    /// Timestamp of the most recent tick (or reset), in source ticks.
    #[inline]
    pub fn last_timestamp(&self) -> u64 {
        self.last
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameClock<MonotonicClock> {
    fn default() -> Self {
        Self::new(MonotonicClock::new(), 0)
    }
}
