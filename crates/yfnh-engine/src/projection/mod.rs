//! Perspective/orthographic projection switching.

mod manager;

pub use manager::ProjectionManager;
