//! Engine lifecycle.
//!
//! [`Engine`] is the state machine the platform runtime drives; hosts talk to
//! it through an [`EngineConfig`] and its [`Callbacks`].

mod app;
mod config;
mod engine;
mod state;

pub use app::{AppResult, Callbacks};
pub use config::{ConfigError, EngineConfig, WindowConfig, DEFAULT_TARGET_FPS};
pub use engine::Engine;
pub use state::{EngineState, Phase};
