//! Lumen engine crate.
//!
//! Runtime core of a 2D application engine: the [`core::Engine`] lifecycle
//! state machine, frame pacing ([`time`]), logical-to-physical mapping with
//! letterboxing ([`coords`]), per-frame GPU sessions ([`frame`]) and tracked
//! heap allocation ([`memory`]). [`window::Runtime`] drives it from a winit
//! event loop on top of wgpu.

pub mod core;
pub mod coords;
pub mod device;
pub mod frame;
pub mod input;
pub mod logging;
pub mod memory;
pub mod render;
pub mod time;
pub mod window;
