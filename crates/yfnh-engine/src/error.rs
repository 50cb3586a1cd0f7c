//! Engine error kinds.
//!
//! There are exactly two families:
//! - [`InitError`]: setup failed; the frame loop must never be entered.
//! - [`FrameError`]: a frame could not complete; the loop stops and the error
//!   propagates to the caller. Frames are never retried.

use thiserror::Error;

/// Fatal failure while bringing the system up.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to create display: {0}")]
    Display(String),

    #[error("failed to create graphics context: {0}")]
    Graphics(String),

    #[error("high-resolution timer unavailable")]
    Timer,

    #[error("failed to load overlay font: {0}")]
    Font(String),

    #[error("frame driver was already initialized")]
    AlreadyInitialized,
}

/// Unrecoverable failure inside a render or update pass.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("frame driver is not running")]
    NotRunning,

    #[error("matrix stack overflow (depth limit {0})")]
    MatrixStackOverflow(usize),

    #[error("matrix stack underflow")]
    MatrixStackUnderflow,

    #[error("surface error: {0}")]
    Surface(String),

    #[error("collaborator failed: {0}")]
    Collaborator(String),
}
