use crate::coords::Color;
use crate::frame::DrawItem;

/// Represents a single acquired wgpu frame.
///
/// This object is short-lived and must be finalized promptly. Holding the surface
/// texture prevents acquisition of subsequent frames.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Everything a device needs to encode one frame.
///
/// All geometry is in physical pixels.
#[derive(Debug, Clone, Copy)]
pub struct FramePacket<'a> {
    /// Color the render pass clears to.
    pub clear: Color,

    /// Draw items in submission order.
    pub items: &'a [DrawItem],
}
