//! Coordinate and geometry types shared by the frame session and renderers.
//!
//! Canonical CPU space:
//! - Origin top-left
//! - +X right, +Y down
//! - Host draw calls are in logical pixels (the configured logical resolution);
//!   everything handed to the GPU layer is in physical pixels.

mod color;
mod letterbox;
mod rect;
mod vec2;
mod viewport;

pub use color::Color;
pub use letterbox::{Letterbox, MAX_BARS};
pub use rect::Rect;
pub use vec2::Vec2;
pub use viewport::ViewportMapper;
