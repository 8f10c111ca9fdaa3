//! GPU device + surface management.
//!
//! This module is responsible for:
//! - the [`GpuDevice`] boundary the engine core renders through
//! - per-frame error classification ([`FrameError`])
//! - the wgpu implementation: Instance/Adapter/Device/Queue, Surface
//!   configuration, frame acquisition and presentation

mod backend;
mod context;
mod error;
mod frame;
mod init;
mod surface;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::GpuDevice;
pub use context::Gpu;
pub use error::{FrameError, SurfaceErrorAction};
pub use frame::{FramePacket, GpuFrame};
pub use init::GpuInit;
