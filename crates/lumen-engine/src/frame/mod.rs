//! Frame resource session.
//!
//! One [`FrameSession`] spans one frame's GPU work: acquire target, record
//! draw commands through a [`Canvas`], then submit + present or discard.

mod draw;
mod session;
mod stats;

pub use draw::{DrawCmd, DrawItem, DrawList};
pub use session::{Canvas, FrameSession};
pub use stats::FrameStats;
