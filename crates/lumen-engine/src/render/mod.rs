//! GPU rendering for recorded frame packets.
//!
//! Convention:
//! - packet geometry arrives in physical pixels (top-left origin, +Y down)
//! - the vertex shader converts to NDC using an output-size uniform
//! - colors are premultiplied on upload

mod ctx;
mod quad;

pub use ctx::EncodeCtx;
pub use quad::QuadRenderer;
