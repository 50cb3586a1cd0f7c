//! Font loading and glyph rendering for the wgpu backend.

mod atlas;
mod font_system;
mod renderer;

pub use font_system::FontSystem;
pub(crate) use renderer::{GlyphRun, TextRenderer};
