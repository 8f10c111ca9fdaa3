use winit::dpi::PhysicalSize;

use super::{FrameError, FramePacket};

/// Boundary between the engine core and the windowing/GPU collaborator.
///
/// The core never touches wgpu or winit directly; it acquires an opaque
/// per-frame target, hands back the recorded packet, and reacts to
/// [`FrameError`]s. Every acquired frame must be returned through exactly one
/// of `submit_frame` or `discard_frame`.
pub trait GpuDevice {
    /// Recording context + output target for one frame.
    type Frame;

    /// Acquires the next output target and a fresh recording context.
    fn acquire_frame(&mut self) -> Result<Self::Frame, FrameError>;

    /// Encodes `packet` into a render pass over `frame`, submits it and presents.
    ///
    /// On error the frame is released without presenting.
    fn submit_frame(&mut self, frame: Self::Frame, packet: &FramePacket<'_>)
        -> Result<(), FrameError>;

    /// Releases `frame` without presenting anything.
    fn discard_frame(&mut self, frame: Self::Frame);

    /// Reconfigures the output after a platform resize.
    fn resize(&mut self, size: PhysicalSize<u32>);

    /// Current drawable size in physical pixels.
    fn output_size(&self) -> PhysicalSize<u32>;

    /// Reveals the output window and gives it input focus.
    fn show(&mut self) {}
}
