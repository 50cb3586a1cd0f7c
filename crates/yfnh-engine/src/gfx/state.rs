use nalgebra::{Point3, Vector3};

use crate::error::FrameError;

use super::backend::{BlendFactor, Capability, DepthFunc, Face, Mat4, MatrixMode, ShadeModel};
use super::color::Color;

/// Minimum depths the fixed-function pipeline guarantees.
pub const MODELVIEW_STACK_DEPTH: usize = 32;
pub const PROJECTION_STACK_DEPTH: usize = 2;

/// CPU-side model of fixed-function pipeline state.
///
/// Both the recording backend and the wgpu backend keep one of these; the
/// wgpu backend reads the combined transform when it turns text draws into
/// glyph quads.
///
/// Invariant: neither matrix stack is ever empty.
#[derive(Debug, Clone)]
pub struct FixedFunctionState {
    mode: MatrixMode,
    projection: Vec<Mat4>,
    modelview: Vec<Mat4>,
    enabled: [bool; Capability::COUNT],
    blend: (BlendFactor, BlendFactor),
    depth_func: DepthFunc,
    cull_face: Face,
    shade_model: ShadeModel,
    color_material: Face,
    clear_color: Color,
    clear_depth: f32,
}

impl Default for FixedFunctionState {
    fn default() -> Self {
        let mut projection = Vec::with_capacity(PROJECTION_STACK_DEPTH);
        projection.push(Mat4::identity());
        let mut modelview = Vec::with_capacity(MODELVIEW_STACK_DEPTH);
        modelview.push(Mat4::identity());

        Self {
            mode: MatrixMode::ModelView,
            projection,
            modelview,
            enabled: [false; Capability::COUNT],
            blend: (BlendFactor::One, BlendFactor::Zero),
            depth_func: DepthFunc::Less,
            cull_face: Face::Back,
            shade_model: ShadeModel::Smooth,
            color_material: Face::Front,
            clear_color: Color::new(0.0, 0.0, 0.0, 0.0),
            clear_depth: 1.0,
        }
    }
}

impl FixedFunctionState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── capabilities ──────────────────────────────────────────────────────

    pub fn set_enabled(&mut self, cap: Capability, on: bool) {
        self.enabled[cap.index()] = on;
    }

    pub fn is_enabled(&self, cap: Capability) -> bool {
        self.enabled[cap.index()]
    }

    pub fn set_blend_func(&mut self, src: BlendFactor, dst: BlendFactor) {
        self.blend = (src, dst);
    }

    pub fn blend_func(&self) -> (BlendFactor, BlendFactor) {
        self.blend
    }

    pub fn set_depth_func(&mut self, func: DepthFunc) {
        self.depth_func = func;
    }

    pub fn depth_func(&self) -> DepthFunc {
        self.depth_func
    }

    pub fn set_cull_face(&mut self, face: Face) {
        self.cull_face = face;
    }

    pub fn cull_face(&self) -> Face {
        self.cull_face
    }

    pub fn set_shade_model(&mut self, model: ShadeModel) {
        self.shade_model = model;
    }

    pub fn shade_model(&self) -> ShadeModel {
        self.shade_model
    }

    pub fn set_color_material(&mut self, face: Face) {
        self.color_material = face;
    }

    pub fn color_material(&self) -> Face {
        self.color_material
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    pub fn set_clear_depth(&mut self, depth: f32) {
        self.clear_depth = depth.clamp(0.0, 1.0);
    }

    pub fn clear_depth(&self) -> f32 {
        self.clear_depth
    }

    // ── matrices ──────────────────────────────────────────────────────────

    pub fn set_matrix_mode(&mut self, mode: MatrixMode) {
        self.mode = mode;
    }

    pub fn matrix_mode(&self) -> MatrixMode {
        self.mode
    }

    fn stack(&self, mode: MatrixMode) -> &Vec<Mat4> {
        match mode {
            MatrixMode::Projection => &self.projection,
            MatrixMode::ModelView => &self.modelview,
        }
    }

    fn active_stack_mut(&mut self) -> (&mut Vec<Mat4>, usize) {
        match self.mode {
            MatrixMode::Projection => (&mut self.projection, PROJECTION_STACK_DEPTH),
            MatrixMode::ModelView => (&mut self.modelview, MODELVIEW_STACK_DEPTH),
        }
    }

    fn top_mut(&mut self) -> &mut Mat4 {
        let (stack, _) = self.active_stack_mut();
        // Stacks are never empty: `pop` refuses to remove the last entry.
        let last = stack.len() - 1;
        &mut stack[last]
    }

    /// Top of the `mode` stack.
    pub fn matrix(&self, mode: MatrixMode) -> &Mat4 {
        let stack = self.stack(mode);
        &stack[stack.len() - 1]
    }

    pub fn stack_depth(&self, mode: MatrixMode) -> usize {
        self.stack(mode).len()
    }

    pub fn load_identity(&mut self) {
        self.top_mut().fill_with_identity();
    }

    pub fn load_matrix(&mut self, m: &Mat4) {
        self.top_mut().copy_from(m);
    }

    pub fn mult_matrix(&mut self, m: &Mat4) {
        let top = self.top_mut();
        *top *= m;
    }

    /// Multiplies the active matrix by a `glOrtho`-style projection.
    ///
    /// Degenerate volumes are ignored with a warning, leaving the matrix unchanged.
    pub fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        if left == right || bottom == top || near == far {
            log::warn!(
                "ignoring degenerate ortho volume l={left} r={right} b={bottom} t={top} n={near} f={far}"
            );
            return;
        }
        let m = Mat4::new_orthographic(left, right, bottom, top, near, far);
        self.mult_matrix(&m);
    }

    pub fn push(&mut self) -> Result<(), FrameError> {
        let (stack, limit) = self.active_stack_mut();
        if stack.len() >= limit {
            return Err(FrameError::MatrixStackOverflow(limit));
        }
        let top = stack[stack.len() - 1];
        stack.push(top);
        Ok(())
    }

    pub fn pop(&mut self) -> Result<(), FrameError> {
        let (stack, _) = self.active_stack_mut();
        if stack.len() <= 1 {
            return Err(FrameError::MatrixStackUnderflow);
        }
        stack.pop();
        Ok(())
    }

    /// Projection × model/view.
    pub fn combined(&self) -> Mat4 {
        self.matrix(MatrixMode::Projection) * self.matrix(MatrixMode::ModelView)
    }

    /// Maps a point through the combined transform into normalized device coordinates.
    ///
    /// Returns `None` when the point lands on or behind the eye plane (`w <= 0`).
    pub fn to_ndc(&self, x: f32, y: f32, z: f32) -> Option<Vector3<f32>> {
        let clip = self.combined() * Point3::new(x, y, z).to_homogeneous();
        if clip.w <= f32::EPSILON {
            return None;
        }
        Some(clip.xyz() / clip.w)
    }
}
