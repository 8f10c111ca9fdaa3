//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, and wires them to the engine and
//! the GPU layer.

mod display;
mod runtime;
mod translate;

pub use display::Display;
pub use runtime::Runtime;
