use winit::dpi::PhysicalSize;

/// Everything a renderer touches while encoding one frame.
///
/// Borrowed from the GPU context and the acquired frame for the duration of
/// a single `encode` call.
pub struct EncodeCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    /// Swapchain view the frame pass renders into.
    pub view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    /// Output size in physical pixels.
    pub output: PhysicalSize<u32>,
}

impl EncodeCtx<'_> {
    /// Output size as floats, never below one pixel per axis.
    #[inline]
    pub fn output_f32(&self) -> [f32; 2] {
        [
            (self.output.width as f32).max(1.0),
            (self.output.height as f32).max(1.0),
        ]
    }
}
