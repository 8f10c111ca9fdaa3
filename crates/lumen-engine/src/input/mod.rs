//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! The window runtime translates platform events into [`Event`]s.

mod state;
mod types;

pub use state::InputState;
pub use types::{ButtonState, Event, Key, MouseButton};
