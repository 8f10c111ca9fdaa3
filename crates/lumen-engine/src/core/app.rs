use std::fmt;

use crate::frame::Canvas;

/// Outcome of a lifecycle hook.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppResult {
    /// Keep running; call the hook again.
    Continue,
    /// Orderly shutdown; the process exits successfully.
    Success,
    /// Fatal error; the process exits with failure.
    Failure,
}

impl AppResult {
    /// `true` for `Success` and `Failure`.
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != AppResult::Continue
    }
}

type LoadFn = Box<dyn FnOnce()>;
type UpdateFn = Box<dyn FnMut(f64)>;
type DrawFn = Box<dyn FnMut(&mut Canvas<'_>)>;
type UnloadFn = Box<dyn FnOnce()>;

/// Host lifecycle callbacks.
///
/// Every slot is optional; an empty slot is skipped. `load` and `unload` run
/// at most once, so they are `FnOnce`.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) load: Option<LoadFn>,
    pub(crate) update: Option<UpdateFn>,
    pub(crate) draw: Option<DrawFn>,
    pub(crate) unload: Option<UnloadFn>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs once after the device exists and before the first frame.
    pub fn on_load(mut self, f: impl FnOnce() + 'static) -> Self {
        self.load = Some(Box::new(f));
        self
    }

    /// Runs every frame with the elapsed seconds since the previous frame.
    pub fn on_update(mut self, f: impl FnMut(f64) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Runs every frame with an open drawing surface.
    pub fn on_draw(mut self, f: impl FnMut(&mut Canvas<'_>) + 'static) -> Self {
        self.draw = Some(Box::new(f));
        self
    }

    /// Runs once during shutdown, before engine resources are released.
    pub fn on_unload(mut self, f: impl FnOnce() + 'static) -> Self {
        self.unload = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("load", &self.load.is_some())
            .field("update", &self.update.is_some())
            .field("draw", &self.draw.is_some())
            .field("unload", &self.unload.is_some())
            .finish()
    }
}
