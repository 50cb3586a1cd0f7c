//! yfnh engine crate.
//!
//! Owns the frame loop, the timing and projection helpers it depends on, and
//! the winit + wgpu platform used by the game binary.

pub mod config;
pub mod core;
pub mod device;
pub mod error;
pub mod gfx;
pub mod logging;
pub mod projection;
pub mod text;
pub mod time;
pub mod window;
