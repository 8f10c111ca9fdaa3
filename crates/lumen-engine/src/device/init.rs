/// GPU preferences supplied by the host through `EngineConfig::gpu`.
///
/// Everything here is a preference: unsupported surface options fall back to
/// what the adapter offers (see `device::surface`).
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Backends wgpu may pick an adapter from.
    pub backends: wgpu::Backends,

    pub power_preference: wgpu::PowerPreference,

    /// Use an sRGB swapchain format when the surface offers one.
    pub prefer_srgb: bool,

    /// `Fifo` waits for vblank and is always available.
    pub present_mode: wgpu::PresentMode,

    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Frames the presentation engine may queue ahead (a hint).
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            backends: wgpu::Backends::all(),
            power_preference: wgpu::PowerPreference::HighPerformance,
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}

impl GpuInit {
    /// Vsync on maps to `Fifo`; off prefers `AutoNoVsync`, which wgpu
    /// resolves to `Immediate` or `Mailbox` where available.
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.present_mode = if vsync {
            wgpu::PresentMode::Fifo
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        self
    }

    pub fn with_backends(mut self, backends: wgpu::Backends) -> Self {
        self.backends = backends;
        self
    }

    /// Prefers an integrated adapter, e.g. for laptops on battery.
    pub fn low_power(mut self) -> Self {
        self.power_preference = wgpu::PowerPreference::LowPower;
        self
    }

    /// Restricts device limits to what WebGL2-class hardware guarantees.
    pub fn with_downlevel_limits(mut self) -> Self {
        self.required_limits = wgpu::Limits::downlevel_webgl2_defaults();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_portable() {
        let init = GpuInit::default();
        assert_eq!(init.present_mode, wgpu::PresentMode::Fifo);
        assert!(init.required_features.is_empty());
        assert!(init.prefer_srgb);
    }

    #[test]
    fn builders_override_single_fields() {
        let init = GpuInit::default()
            .with_vsync(false)
            .low_power()
            .with_backends(wgpu::Backends::VULKAN);

        assert_eq!(init.present_mode, wgpu::PresentMode::AutoNoVsync);
        assert_eq!(init.power_preference, wgpu::PowerPreference::LowPower);
        assert_eq!(init.backends, wgpu::Backends::VULKAN);
        assert_eq!(init.desired_maximum_frame_latency, 2);
    }
}
