use crate::error::{FrameError, InitError};

use super::backend::{
    BlendFactor, Capability, ClearMask, DepthFunc, Face, FontId, GraphicsBackend, Mat4,
    MatrixMode, ShadeModel, TextStyle,
};
use super::color::Color;
use super::state::FixedFunctionState;

/// One call observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Enable(Capability),
    Disable(Capability),
    MatrixMode(MatrixMode),
    LoadIdentity,
    LoadMatrix(Mat4),
    MultMatrix(Mat4),
    Ortho([f32; 6]),
    PushMatrix,
    PopMatrix,
    Clear(ClearMask),
    LoadFont,
    DrawText { font: FontId, x: f32, y: f32, text: String },
    Resize(u32, u32),
    Present,
}

/// Headless backend that tracks pipeline state and logs every state-changing call.
///
/// Fixed rendering parameters (blend function, depth function, ...) are only
/// tracked in [`RecordingBackend::state`]; the log keeps to the calls whose
/// ordering matters to the frame loop.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    state: FixedFunctionState,
    calls: Vec<Call>,
    fonts: usize,
    frames: u64,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FixedFunctionState {
        &self.state
    }

    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Drops the log, keeping pipeline state.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of `present` calls so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Texts drawn since the log was last cleared, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.calls.iter().filter_map(|c| match c {
            Call::DrawText { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl GraphicsBackend for RecordingBackend {
    fn enable(&mut self, cap: Capability) {
        self.state.set_enabled(cap, true);
        self.calls.push(Call::Enable(cap));
    }

    fn disable(&mut self, cap: Capability) {
        self.state.set_enabled(cap, false);
        self.calls.push(Call::Disable(cap));
    }

    fn is_enabled(&self, cap: Capability) -> bool {
        self.state.is_enabled(cap)
    }

    fn blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.state.set_blend_func(src, dst);
    }

    fn depth_func(&mut self, func: DepthFunc) {
        self.state.set_depth_func(func);
    }

    fn cull_face(&mut self, face: Face) {
        self.state.set_cull_face(face);
    }

    fn shade_model(&mut self, model: ShadeModel) {
        self.state.set_shade_model(model);
    }

    fn color_material(&mut self, face: Face) {
        self.state.set_color_material(face);
    }

    fn clear_color(&mut self, color: Color) {
        self.state.set_clear_color(color);
    }

    fn clear_depth(&mut self, depth: f32) {
        self.state.set_clear_depth(depth);
    }

    fn matrix_mode(&mut self, mode: MatrixMode) {
        self.state.set_matrix_mode(mode);
        self.calls.push(Call::MatrixMode(mode));
    }

    fn current_matrix_mode(&self) -> MatrixMode {
        self.state.matrix_mode()
    }

    fn load_identity(&mut self) {
        self.state.load_identity();
        self.calls.push(Call::LoadIdentity);
    }

    fn load_matrix(&mut self, m: &Mat4) {
        self.state.load_matrix(m);
        self.calls.push(Call::LoadMatrix(*m));
    }

    fn mult_matrix(&mut self, m: &Mat4) {
        self.state.mult_matrix(m);
        self.calls.push(Call::MultMatrix(*m));
    }

    fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.state.ortho(left, right, bottom, top, near, far);
        self.calls.push(Call::Ortho([left, right, bottom, top, near, far]));
    }

    fn read_matrix(&self, mode: MatrixMode, out: &mut Mat4) {
        out.copy_from(self.state.matrix(mode));
    }

    fn push_matrix(&mut self) -> Result<(), FrameError> {
        self.state.push()?;
        self.calls.push(Call::PushMatrix);
        Ok(())
    }

    fn pop_matrix(&mut self) -> Result<(), FrameError> {
        self.state.pop()?;
        self.calls.push(Call::PopMatrix);
        Ok(())
    }

    fn clear(&mut self, mask: ClearMask) {
        self.calls.push(Call::Clear(mask));
    }

    fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, InitError> {
        if bytes.is_empty() {
            return Err(InitError::Font("empty font data".to_string()));
        }
        let id = FontId(self.fonts);
        self.fonts += 1;
        self.calls.push(Call::LoadFont);
        Ok(id)
    }

    fn draw_text(
        &mut self,
        font: FontId,
        x: f32,
        y: f32,
        text: &str,
        _style: TextStyle,
    ) -> Result<(), FrameError> {
        if font.0 >= self.fonts {
            return Err(FrameError::Collaborator(format!("unknown font {font:?}")));
        }
        self.calls.push(Call::DrawText { font, x, y, text: text.to_string() });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.calls.push(Call::Resize(width, height));
    }

    fn present(&mut self) -> Result<(), FrameError> {
        self.frames += 1;
        self.calls.push(Call::Present);
        Ok(())
    }
}
