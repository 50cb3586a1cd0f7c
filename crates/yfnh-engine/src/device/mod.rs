//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain) and depth buffer
//! - turning fixed-function commands into frames ([`GpuBackend`])

mod backend;
mod gpu;
mod init;
mod surface;

pub use backend::GpuBackend;
pub use gpu::{Gpu, GpuFrame, SurfaceErrorAction, DEPTH_FORMAT};
pub use init::GpuInit;
