use thiserror::Error;
use winit::dpi::LogicalSize;

use crate::coords::Color;
use crate::device::GpuInit;

use super::app::Callbacks;

/// Frame-rate cap applied when the host does not choose one.
pub const DEFAULT_TARGET_FPS: u32 = if cfg!(feature = "fps-cap") { 60 } else { 0 };

/// Window creation parameters.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
        }
    }
}

/// Host-supplied configuration, consumed once by `Engine::init`.
#[derive(Debug)]
pub struct EngineConfig {
    pub window: WindowConfig,

    /// Fixed logical canvas the host draws into, as `(width, height)`.
    pub logical_size: (u32, u32),

    /// Frames per second cap; 0 disables pacing.
    pub target_fps: u32,

    pub gpu: GpuInit,

    /// Clear color of the content area.
    pub clear_color: Color,

    /// Fill color of the letterbox/pillarbox bars.
    pub letterbox_color: Color,

    pub callbacks: Callbacks,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            logical_size: (1280, 720),
            target_fps: DEFAULT_TARGET_FPS,
            gpu: GpuInit::default(),
            clear_color: Color::rgb(0.08, 0.08, 0.10),
            letterbox_color: Color::BLACK,
            callbacks: Callbacks::default(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    pub fn with_window_size(mut self, width: f64, height: f64) -> Self {
        self.window.initial_size = LogicalSize::new(width, height);
        self
    }

    pub fn with_logical_size(mut self, width: u32, height: u32) -> Self {
        self.logical_size = (width, height);
        self
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn with_gpu(mut self, gpu: GpuInit) -> Self {
        self.gpu = gpu;
        self
    }

    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_letterbox_color(mut self, color: Color) -> Self {
        self.letterbox_color = color;
        self
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Checks every field the engine relies on.
    ///
    /// `Engine::init` runs this before it applies anything from the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (w, h) = self.logical_size;
        if w == 0 || h == 0 {
            return Err(ConfigError::ZeroLogicalSize { width: w, height: h });
        }

        let win = self.window.initial_size;
        if !(win.width.is_finite() && win.height.is_finite() && win.width > 0.0 && win.height > 0.0)
        {
            return Err(ConfigError::BadWindowSize {
                width: win.width,
                height: win.height,
            });
        }

        if !self.clear_color.is_finite() {
            return Err(ConfigError::NonFiniteColor("clear_color"));
        }
        if !self.letterbox_color.is_finite() {
            return Err(ConfigError::NonFiniteColor("letterbox_color"));
        }

        Ok(())
    }
}

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("logical size must be non-zero, got {width}x{height}")]
    ZeroLogicalSize { width: u32, height: u32 },

    #[error("window size must be positive and finite, got {width}x{height}")]
    BadWindowSize { width: f64, height: f64 },

    #[error("{0} has a non-finite component")]
    NonFiniteColor(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn zero_logical_size_is_rejected() {
        let cfg = EngineConfig::new().with_logical_size(320, 0);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::ZeroLogicalSize { width: 320, height: 0 })
        );
    }

    #[test]
    fn bad_window_size_is_rejected() {
        let cfg = EngineConfig::new().with_window_size(f64::NAN, 480.0);
        assert!(matches!(cfg.validate(), Err(ConfigError::BadWindowSize { .. })));
    }

    #[test]
    fn non_finite_colors_are_rejected() {
        let cfg = EngineConfig::new().with_letterbox_color(Color::rgb(0.0, f32::NAN, 0.0));
        assert_eq!(cfg.validate(), Err(ConfigError::NonFiniteColor("letterbox_color")));
    }

    #[test]
    fn default_fps_follows_the_cap_feature() {
        let expected = if cfg!(feature = "fps-cap") { 60 } else { 0 };
        assert_eq!(EngineConfig::default().target_fps, expected);
    }
}
