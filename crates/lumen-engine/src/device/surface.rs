use winit::dpi::PhysicalSize;

use super::SurfaceErrorAction;

const SRGB_FORMATS: [wgpu::TextureFormat; 2] = [
    wgpu::TextureFormat::Bgra8UnormSrgb,
    wgpu::TextureFormat::Rgba8UnormSrgb,
];

/// Picks the swapchain format: a common sRGB one when asked for and offered,
/// otherwise the surface's first (preferred) format.
pub(crate) fn choose_surface_format(
    caps: &wgpu::SurfaceCapabilities,
    prefer_srgb: bool,
) -> Option<wgpu::TextureFormat> {
    let srgb = if prefer_srgb {
        SRGB_FORMATS.into_iter().find(|f| caps.formats.contains(f))
    } else {
        None
    };
    srgb.or_else(|| caps.formats.first().copied())
}

pub(crate) fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

fn has_area(size: PhysicalSize<u32>) -> bool {
    size.width > 0 && size.height > 0
}

/// Records `new_size` and reconfigures the surface for it.
///
/// A minimized window reports 0x0, which wgpu cannot configure; the surface
/// then keeps its previous configuration until a usable size arrives.
pub(crate) fn apply_resize(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &mut wgpu::SurfaceConfiguration,
    size: &mut PhysicalSize<u32>,
    new_size: PhysicalSize<u32>,
) {
    *size = new_size;
    if has_area(new_size) {
        (config.width, config.height) = (new_size.width, new_size.height);
        surface.configure(device, config);
    }
}

/// Classifies a failed texture acquisition, reconfiguring when that can help.
pub(crate) fn map_surface_error(
    surface: &wgpu::Surface,
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    err: &wgpu::SurfaceError,
) -> SurfaceErrorAction {
    use wgpu::SurfaceError as E;

    match err {
        E::Lost | E::Outdated => {
            if has_area(size) {
                surface.configure(device, config);
            }
            SurfaceErrorAction::Reconfigured
        }
        E::OutOfMemory => SurfaceErrorAction::Fatal,
        E::Timeout | E::Other => SurfaceErrorAction::SkipFrame,
    }
}
