use nalgebra::Matrix4;

use crate::error::{FrameError, InitError};

use super::color::Color;

/// Column-major 4x4 matrix, OpenGL layout.
pub type Mat4 = Matrix4<f32>;

/// Server-side capabilities that can be toggled on a backend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Capability {
    Texture2d,
    Normalize,
    RescaleNormal,
    Blend,
    DepthTest,
    Lighting,
    CullFace,
    ColorMaterial,
}

impl Capability {
    pub const COUNT: usize = 8;

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Which matrix stack subsequent matrix operations edit.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MatrixMode {
    Projection,
    ModelView,
}

/// Buffers cleared by [`GraphicsBackend::clear`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ClearMask {
    pub color: bool,
    pub depth: bool,
}

impl ClearMask {
    pub const COLOR_DEPTH: Self = Self { color: true, depth: true };
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DepthFunc {
    Less,
    LessEqual,
    Always,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Face {
    Front,
    Back,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShadeModel {
    Flat,
    Smooth,
}

/// Opaque handle to a font loaded through [`GraphicsBackend::load_font`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FontId(pub(crate) usize);

/// Per-draw text parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TextStyle {
    /// Pixel size (em height).
    pub size: f32,
    pub color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self { size: 16.0, color: Color::white() }
    }
}

/// Minimal fixed-function style graphics capability surface.
///
/// The frame loop, the projection manager and the collaborators only talk to
/// the GPU through this trait, so any of them can run against a recording
/// backend with no window or device.
///
/// Matrix semantics follow the classic fixed-function pipeline: one stack per
/// [`MatrixMode`], edits apply to the top of the stack selected by the current
/// mode, and `draw_text` positions are transformed by projection × model/view.
pub trait GraphicsBackend {
    fn enable(&mut self, cap: Capability);
    fn disable(&mut self, cap: Capability);
    fn is_enabled(&self, cap: Capability) -> bool;

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor);
    fn depth_func(&mut self, func: DepthFunc);
    fn cull_face(&mut self, face: Face);
    fn shade_model(&mut self, model: ShadeModel);
    fn color_material(&mut self, face: Face);
    fn clear_color(&mut self, color: Color);
    fn clear_depth(&mut self, depth: f32);

    fn matrix_mode(&mut self, mode: MatrixMode);
    fn current_matrix_mode(&self) -> MatrixMode;
    fn load_identity(&mut self);
    fn load_matrix(&mut self, m: &Mat4);
    fn mult_matrix(&mut self, m: &Mat4);
    fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32);
    /// Copies the top of the `mode` stack into `out`, reusing its storage.
    fn read_matrix(&self, mode: MatrixMode, out: &mut Mat4);
    fn push_matrix(&mut self) -> Result<(), FrameError>;
    fn pop_matrix(&mut self) -> Result<(), FrameError>;

    fn clear(&mut self, mask: ClearMask);

    /// Parses a TrueType/OpenType font for later `draw_text` calls.
    fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, InitError>;
    /// Draws `text` with its top-left corner at (`x`, `y`) in current matrix space.
    fn draw_text(
        &mut self,
        font: FontId,
        x: f32,
        y: f32,
        text: &str,
        style: TextStyle,
    ) -> Result<(), FrameError>;

    /// Matches the drawable to a new window size in physical pixels.
    fn resize(&mut self, width: u32, height: u32);

    /// Finishes the frame and hands it to the display.
    fn present(&mut self) -> Result<(), FrameError>;
}
