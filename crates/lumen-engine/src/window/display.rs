use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::core::WindowConfig;
use crate::device::{FrameError, FramePacket, Gpu, GpuDevice, GpuFrame, GpuInit};
use crate::render::QuadRenderer;

/// The engine's window together with the GPU context bound to it.
///
/// The surface borrows the window, so both live in one self-referencing
/// value and drop together (GPU first).
#[self_referencing]
pub struct Display {
    renderer: QuadRenderer,

    pub(crate) window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

impl Display {
    /// Creates the window hidden and initializes the GPU for it.
    ///
    /// The window is revealed through [`GpuDevice::show`] once the host has
    /// loaded.
    pub fn open(
        event_loop: &ActiveEventLoop,
        config: &WindowConfig,
        init: GpuInit,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(config.initial_size)
            .with_visible(false);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        DisplayTryBuilder {
            renderer: QuadRenderer::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, init)),
        }
        .try_build()
        .context("GPU initialization failed for window")
    }

    pub fn request_redraw(&self) {
        self.with_window(|w| w.request_redraw());
    }
}

impl GpuDevice for Display {
    type Frame = GpuFrame;

    fn acquire_frame(&mut self) -> Result<GpuFrame, FrameError> {
        self.with_gpu(|gpu| gpu.begin_frame())
    }

    fn submit_frame(
        &mut self,
        frame: GpuFrame,
        packet: &FramePacket<'_>,
    ) -> Result<(), FrameError> {
        self.with_mut(|fields| {
            fields.window.pre_present_notify();
            fields.gpu.submit(frame, fields.renderer, packet)
        })
    }

    fn discard_frame(&mut self, frame: GpuFrame) {
        // Dropping an unpresented surface texture hands it back to the swapchain.
        drop(frame);
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.with_gpu_mut(|gpu| gpu.resize(size));
        self.request_redraw();
    }

    fn output_size(&self) -> PhysicalSize<u32> {
        self.with_gpu(|gpu| gpu.size())
    }

    fn show(&mut self) {
        self.with_window(|w| {
            w.set_visible(true);
            w.focus_window();
            w.request_redraw();
        });
    }
}
