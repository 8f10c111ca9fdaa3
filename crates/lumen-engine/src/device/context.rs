use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::render::{EncodeCtx, QuadRenderer};

use super::surface;
use super::{FrameError, FramePacket, GpuFrame, GpuInit};

/// wgpu device and swapchain for one window.
///
/// The surface borrows the window for `'w`; [`Display`](crate::window::Display)
/// keeps both in one value. Frames are acquired with [`begin_frame`](Self::begin_frame)
/// and finished with [`submit`](Self::submit) (or dropped to discard).
pub struct Gpu<'w> {
    // Kept alive for the surface's sake.
    _instance: wgpu::Instance,
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    /// Physical pixels; may be zero while minimized, unlike `config`.
    size: PhysicalSize<u32>,
    /// Raised by wgpu's device-lost callback.
    lost: Arc<AtomicBool>,
}

impl<'w> Gpu<'w> {
    /// Picks an adapter for `window` and configures its surface.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let GpuInit {
            backends,
            power_preference,
            prefer_srgb,
            present_mode,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("lumen-engine device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let lost = Arc::new(AtomicBool::new(false));
        {
            let lost = Arc::clone(&lost);
            device.set_device_lost_callback(move |reason, message| {
                if matches!(reason, wgpu::DeviceLostReason::Destroyed) {
                    log::debug!("wgpu device destroyed: {message}");
                } else {
                    log::error!("wgpu device lost ({reason:?}): {message}");
                }
                lost.store(true, Ordering::Release);
            });
        }

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, prefer_srgb)
            .context("no supported surface formats")?;

        let alpha_mode = surface::choose_alpha_mode(&surface_caps, alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        let info = adapter.get_info();
        log::info!(
            "gpu ready: {} ({:?}), surface {:?} {}x{}",
            info.name,
            info.backend,
            format,
            config.width,
            config.height
        );

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            size,
            lost,
        })
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Zero sizes are recorded but leave the surface configuration alone.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
    }

    /// Acquires the next swapchain texture plus a fresh encoder.
    ///
    /// Surface errors are classified through `map_surface_error`; a lost or
    /// outdated surface is reconfigured before returning.
    pub fn begin_frame(&self) -> Result<GpuFrame, FrameError> {
        self.check_device()?;
        if self.size.width == 0 || self.size.height == 0 {
            return Err(FrameError::TargetUnavailable("surface has zero size".into()));
        }

        let surface_texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(err) => {
                let action = surface::map_surface_error(
                    &self.surface,
                    &self.device,
                    &self.config,
                    self.size,
                    &err,
                );
                return Err((action, err).into());
            }
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("lumen frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Encodes `packet` with `renderer`, submits, and presents the frame.
    ///
    /// If the device was lost the frame is dropped unpresented.
    pub fn submit(
        &self,
        mut frame: GpuFrame,
        renderer: &mut QuadRenderer,
        packet: &FramePacket<'_>,
    ) -> Result<(), FrameError> {
        self.check_device()?;

        renderer.encode(
            &mut EncodeCtx {
                device: &self.device,
                queue: &self.queue,
                encoder: &mut frame.encoder,
                view: &frame.view,
                format: self.config.format,
                output: self.size,
            },
            packet,
        );

        self.queue.submit(std::iter::once(frame.encoder.finish()));
        drop(frame.view);

        self.check_device()?;
        frame.surface_texture.present();
        Ok(())
    }

    fn check_device(&self) -> Result<(), FrameError> {
        if self.lost.load(Ordering::Acquire) {
            return Err(FrameError::DeviceLost("wgpu device is no longer usable".into()));
        }
        Ok(())
    }
}
