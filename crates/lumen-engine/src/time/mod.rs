//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per engine, fed by a `TimeSource`
//! - `tick()` at the top of every frame, `end_frame()` after presentation
//! - `ManualClock` for headless hosts and deterministic tests

mod frame_clock;
mod source;

pub use frame_clock::{FrameClock, FrameTime};
pub use source::{ManualClock, MonotonicClock, TimeSource};
