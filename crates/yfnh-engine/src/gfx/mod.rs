//! Graphics capability layer.
//!
//! Everything above this module issues fixed-function style commands through
//! [`GraphicsBackend`]. Two implementations exist:
//! - [`RecordingBackend`]: headless, logs calls, used by tests and replays
//! - `device::GpuBackend`: wgpu-backed, used by the real application
//!
//! Both keep a [`FixedFunctionState`] so matrix and capability semantics are
//! defined in exactly one place.

mod backend;
mod color;
mod recording;
mod state;

pub use backend::{
    BlendFactor, Capability, ClearMask, DepthFunc, Face, FontId, GraphicsBackend, Mat4,
    MatrixMode, ShadeModel, TextStyle,
};
pub use color::Color;
pub use recording::{Call, RecordingBackend};
pub use state::{FixedFunctionState, MODELVIEW_STACK_DEPTH, PROJECTION_STACK_DEPTH};
