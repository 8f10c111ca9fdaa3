use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::WindowId;

use crate::core::{AppResult, Engine, EngineConfig};
use crate::time::MonotonicClock;

use super::display::Display;
use super::translate::translate;

/// Entry point for the platform runtime.
///
/// Owns the winit event loop and drives one [`Engine`] through its hooks.
pub struct Runtime;

impl Runtime {
    /// Runs the host until it quits.
    ///
    /// `setup` is called once, when the platform is ready for a window.
    /// Returns `Err` when the engine finished with [`AppResult::Failure`].
    pub fn run<S>(setup: S) -> Result<()>
    where
        S: FnOnce() -> Option<EngineConfig> + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState {
            setup: Some(Box::new(setup)),
            engine: Engine::new(MonotonicClock::new()),
            status: AppResult::Continue,
        };

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        // The loop can end without `exiting` on some platforms.
        state.engine.quit();

        match state.status {
            AppResult::Failure => anyhow::bail!("engine terminated with failure"),
            AppResult::Continue | AppResult::Success => Ok(()),
        }
    }
}

type SetupFn = Box<dyn FnOnce() -> Option<EngineConfig>>;

struct RuntimeState {
    setup: Option<SetupFn>,
    engine: Engine<Display>,
    status: AppResult,
}

impl RuntimeState {
    fn finish(&mut self, event_loop: &ActiveEventLoop, status: AppResult) {
        if status.is_terminal() {
            self.status = status;
            event_loop.exit();
        }
    }
}

impl ApplicationHandler for RuntimeState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // Only the first resume initializes; later ones keep the display.
        let Some(setup) = self.setup.take() else {
            return;
        };

        let status = self
            .engine
            .init(setup, |window, gpu| Display::open(event_loop, window, gpu));
        self.finish(event_loop, status);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::RedrawRequested = event {
            let status = self.engine.iterate();
            self.finish(event_loop, status);
            return;
        }

        let Some(ev) = self
            .engine
            .device()
            .and_then(|d| d.with_window(|w| translate(w, &event)))
        else {
            return;
        };

        let status = self.engine.on_event(&ev);
        self.finish(event_loop, status);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        if let Some(display) = self.engine.device() {
            display.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.engine.quit();
    }
}
