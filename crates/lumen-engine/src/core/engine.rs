use winit::dpi::PhysicalSize;

use crate::coords::{Color, ViewportMapper};
use crate::device::{FrameError, GpuDevice, GpuInit};
use crate::frame::{FrameSession, FrameStats};
use crate::input::{Event, InputState};
use crate::memory::{self, LeakReport};
use crate::time::{FrameClock, MonotonicClock, TimeSource};

use super::app::{AppResult, Callbacks};
use super::config::{EngineConfig, WindowConfig};
use super::state::{EngineState, Phase};

/// The runtime core: lifecycle, frame pacing and per-frame GPU sessions.
///
/// The platform runtime drives it through four hooks:
/// [`init`](Self::init) once, [`iterate`](Self::iterate) once per tick,
/// [`on_event`](Self::on_event) per platform event and [`quit`](Self::quit)
/// once at shutdown. Everything runs on the calling thread.
pub struct Engine<D: GpuDevice, T: TimeSource = MonotonicClock> {
    phase: Phase,
    state: EngineState,
    clock: FrameClock<T>,

    callbacks: Callbacks,
    clear_color: Color,
    letterbox_color: Color,

    device: Option<D>,
    input: InputState,
    stats: FrameStats,

    /// Status reported once the engine stops running.
    exit: AppResult,
    loaded: bool,
    leak_report: Option<LeakReport>,
}

impl<D: GpuDevice, T: TimeSource> Engine<D, T> {
    pub fn new(time: T) -> Self {
        Self {
            phase: Phase::Uninitialized,
            state: EngineState::new(),
            clock: FrameClock::new(time, 0),
            callbacks: Callbacks::default(),
            clear_color: Color::BLACK,
            letterbox_color: Color::BLACK,
            device: None,
            input: InputState::default(),
            stats: FrameStats::default(),
            exit: AppResult::Continue,
            loaded: false,
            leak_report: None,
        }
    }

    /// Runs host setup, creates the device, loads and reveals the window.
    ///
    /// `setup` returning `None` or an invalid config is fatal, as is a failure
    /// in `open`. On `Failure` the engine never reaches `Running`; `quit()`
    /// is still safe to call.
    pub fn init<S, O>(&mut self, setup: S, open: O) -> AppResult
    where
        S: FnOnce() -> Option<EngineConfig>,
        O: FnOnce(&WindowConfig, GpuInit) -> anyhow::Result<D>,
    {
        if self.phase != Phase::Uninitialized {
            log::error!("init called in phase {:?}; ignoring", self.phase);
            return AppResult::Failure;
        }
        self.phase = Phase::Initializing;

        let Some(config) = setup() else {
            log::error!("fatal: setup returned no configuration");
            return self.fail_init();
        };
        if let Err(e) = config.validate() {
            log::error!("fatal: invalid configuration: {e}");
            return self.fail_init();
        }

        let EngineConfig {
            window,
            logical_size: (lw, lh),
            target_fps,
            gpu,
            clear_color,
            letterbox_color,
            callbacks,
        } = config;

        self.state.viewport = ViewportMapper::new(lw, lh);
        self.clock.set_target_fps(target_fps);
        self.clear_color = clear_color;
        self.letterbox_color = letterbox_color;
        self.callbacks = callbacks;

        let mut device = match open(&window, gpu) {
            Ok(d) => d,
            Err(e) => {
                log::error!("fatal: failed to create window/device: {e:#}");
                return self.fail_init();
            }
        };

        let size = device.output_size();
        self.state.viewport.set_output_size(size.width, size.height);

        if let Some(load) = self.callbacks.load.take() {
            load();
        }
        self.loaded = true;

        // Load time never counts as frame time.
        self.clock.reset();
        self.state.last_frame_timestamp = self.clock.last_timestamp();

        device.show();
        self.device = Some(device);

        self.state.is_running = true;
        self.phase = Phase::Running;

        log::info!(
            "engine running: logical {lw}x{lh}, output {}x{}, target fps {}",
            size.width,
            size.height,
            if target_fps == 0 { "uncapped".to_string() } else { target_fps.to_string() }
        );

        AppResult::Continue
    }

    fn fail_init(&mut self) -> AppResult {
        self.state.is_running = false;
        self.exit = AppResult::Failure;
        AppResult::Failure
    }

    /// Runs one frame: tick, update, draw inside a frame session, pace.
    ///
    /// Returns a terminal status once the engine has stopped running.
    pub fn iterate(&mut self) -> AppResult {
        match self.phase {
            Phase::Uninitialized => {
                log::error!("iterate called before init");
                return AppResult::Failure;
            }
            Phase::Running if self.state.is_running => {}
            _ => return self.exit,
        }

        let ft = self.clock.tick();
        self.state.delta_time = ft.dt;
        self.state.last_frame_timestamp = ft.now;
        self.state.frame_index = ft.frame_index;

        if let Some(update) = self.callbacks.update.as_mut() {
            update(ft.dt);
        }

        let Some(device) = self.device.as_mut() else {
            log::error!("fatal: running without a device");
            self.fail(AppResult::Failure);
            return AppResult::Failure;
        };

        let outcome = match FrameSession::begin(
            device,
            &self.state.viewport,
            self.clear_color,
            self.letterbox_color,
        ) {
            Err(e) => Err((e, FrameStage::Acquire)),
            Ok(mut session) => {
                if let Some(draw) = self.callbacks.draw.as_mut() {
                    let mut canvas = session.canvas();
                    draw(&mut canvas);
                }
                session.end().map_err(|e| (e, FrameStage::Submit))
            }
        };

        match outcome {
            Ok(()) => self.stats.presented += 1,
            Err((e, stage)) => self.frame_failed(e, stage),
        }

        self.clock.end_frame();
        AppResult::Continue
    }

    fn frame_failed(&mut self, err: FrameError, stage: FrameStage) {
        match stage {
            FrameStage::Acquire => self.stats.skipped += 1,
            FrameStage::Submit => self.stats.discarded += 1,
        }

        if err.is_fatal() {
            log::error!("fatal: {err}; requesting shutdown");
            self.fail(AppResult::Failure);
            return;
        }

        match (&err, stage) {
            (FrameError::TargetUnavailable(_), FrameStage::Acquire) => {
                log::debug!("frame {} skipped: {err}", self.state.frame_index)
            }
            _ => log::warn!("frame {} dropped: {err}", self.state.frame_index),
        }
    }

    /// Dispatches one platform event.
    pub fn on_event(&mut self, ev: &Event) -> AppResult {
        if self.phase != Phase::Running || !self.state.is_running {
            return self.status();
        }

        match *ev {
            Event::QuitRequested => self.request_quit(),
            Event::Resized { width, height }
            | Event::ScaleFactorChanged { width, height, .. } => self.resize(width, height),
            _ => {}
        }

        self.input.apply(ev, &self.state.viewport);
        self.status()
    }

    fn resize(&mut self, width: u32, height: u32) {
        if let Some(device) = self.device.as_mut() {
            device.resize(PhysicalSize::new(width, height));
        }
        if self.state.viewport.set_output_size(width, height) {
            log::debug!(
                "viewport: output {width}x{height}, scale {:.3}, {} bar(s)",
                self.state.viewport.scale(),
                self.state.viewport.letterbox().len()
            );
        }
    }

    /// Asks the engine to stop after the current frame; the next
    /// `iterate` reports `Success`.
    ///
    /// Ignored before `init`: an engine that never started has no status
    /// to settle yet.
    pub fn request_quit(&mut self) {
        if self.phase == Phase::Uninitialized {
            log::warn!("quit requested before init; ignoring");
            return;
        }
        if self.state.is_running {
            log::info!("quit requested");
        }
        self.fail(AppResult::Success);
    }

    fn fail(&mut self, status: AppResult) {
        self.state.is_running = false;
        // The first terminal status wins.
        if self.exit == AppResult::Continue {
            self.exit = status;
        }
    }

    /// Tears the engine down: unload, release the device, drop callbacks,
    /// then report leaks. Idempotent.
    pub fn quit(&mut self) {
        if matches!(self.phase, Phase::ShuttingDown | Phase::Terminated) {
            return;
        }
        let started = self.phase != Phase::Uninitialized;
        self.phase = Phase::ShuttingDown;
        self.fail(AppResult::Success);

        if self.loaded {
            if let Some(unload) = self.callbacks.unload.take() {
                unload();
            }
        }

        self.device = None;
        self.callbacks = Callbacks::default();

        if started {
            log::info!("engine stopped ({:?}): {}", self.exit, self.stats);
        }
        self.phase = Phase::Terminated;

        if started {
            self.leak_report = Some(memory::report());
        }
    }

    /// `Continue` while running, otherwise the terminal status.
    pub fn status(&self) -> AppResult {
        if self.state.is_running {
            AppResult::Continue
        } else if self.phase == Phase::Uninitialized {
            AppResult::Failure
        } else {
            self.exit
        }
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    #[inline]
    pub fn state(&self) -> &EngineState {
        &self.state
    }

    #[inline]
    pub fn viewport(&self) -> &ViewportMapper {
        &self.state.viewport
    }

    #[inline]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Leak report taken as the last step of `quit`.
    pub fn leak_report(&self) -> Option<&LeakReport> {
        self.leak_report.as_ref()
    }

    #[inline]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    #[inline]
    pub fn target_fps(&self) -> u32 {
        self.clock.target_fps()
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.clock.set_target_fps(fps);
    }

    #[inline]
    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    #[inline]
    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.device.as_mut()
    }
}

impl<D: GpuDevice, T: TimeSource> Drop for Engine<D, T> {
    fn drop(&mut self) {
        if self.phase != Phase::Uninitialized {
            self.quit();
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum FrameStage {
    Acquire,
    Submit,
}
