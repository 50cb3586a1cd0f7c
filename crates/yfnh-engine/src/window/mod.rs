//! Window + event pumping.
//!
//! Owns the `winit` EventLoop and Window and wires them to the GPU layer.
//! The frame loop drives events itself (see [`WinitDisplay`]), so the event
//! loop is pumped rather than run.

mod display;

pub use display::{WinitDisplay, WinitPlatform};
