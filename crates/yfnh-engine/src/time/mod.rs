//! Time subsystem.
//!
//! - [`Clock`]: millisecond delta and frame-rate readings over an injected [`Timer`]
//! - [`FramePacer`]: the end-of-frame blocking wait that holds the loop to a target rate
//!
//! Nothing here is global; the frame driver owns one clock for its lifetime.

mod clock;
mod manual;
mod pacer;
mod timer;

pub use clock::Clock;
pub use manual::ManualTimer;
pub use pacer::FramePacer;
pub use timer::{SystemTimer, Timer};
