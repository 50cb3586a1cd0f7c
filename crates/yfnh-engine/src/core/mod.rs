//! Frame loop and the contracts it drives.
//!
//! [`FrameDriver`] owns the loop. Everything it calls out to sits behind a
//! trait defined here ([`Platform`]/[`Display`] for the window,
//! [`World`]/[`Player`]/[`Camera`] for the simulation, [`Overlay`] for
//! screen-space drawing), so the loop can be exercised headless.

mod driver;
mod hooks;
mod platform;

pub use driver::{DriverPhase, FrameDriver};
pub use hooks::{Camera, Overlay, Player, Session, World};
pub use platform::{Display, Platform};
