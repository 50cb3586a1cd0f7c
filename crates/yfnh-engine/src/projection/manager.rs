use crate::core::Camera;
use crate::error::FrameError;
use crate::gfx::{GraphicsBackend, Mat4, MatrixMode};

/// Owns the perspective and orthographic projection snapshots and brackets
/// overlay drawing with the matrix-mode switches between them.
///
/// Every frame is entered with the perspective projection active and the
/// model/view stack selected. [`ProjectionManager::begin_overlay`] and
/// [`ProjectionManager::end_overlay`] must be called in pairs and leave that
/// state intact.
///
/// The snapshots are allocated once and overwritten in place on capture.
#[derive(Debug, Clone)]
pub struct ProjectionManager {
    perspective: Mat4,
    orthographic: Mat4,
}

impl Default for ProjectionManager {
    fn default() -> Self {
        Self {
            perspective: Mat4::identity(),
            orthographic: Mat4::identity(),
        }
    }
}

impl ProjectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn perspective(&self) -> &Mat4 {
        &self.perspective
    }

    pub fn orthographic(&self) -> &Mat4 {
        &self.orthographic
    }

    /// Stores the backend's active projection as the perspective snapshot.
    ///
    /// The camera must already have applied its perspective transform.
    pub fn capture_perspective(&mut self, gfx: &mut dyn GraphicsBackend) {
        gfx.read_matrix(MatrixMode::Projection, &mut self.perspective);
    }

    /// Builds the screen-space projection for a `width` × `height` surface.
    ///
    /// Maps (0, 0) to the top-left corner and (`width`, `height`) to the
    /// bottom-right, near/far = (1, -1). On return the perspective snapshot is
    /// the active projection again and model/view mode is selected.
    pub fn capture_orthographic(&mut self, gfx: &mut dyn GraphicsBackend, width: u32, height: u32) {
        gfx.matrix_mode(MatrixMode::Projection);
        gfx.load_identity();
        gfx.ortho(0.0, width as f32, height as f32, 0.0, 1.0, -1.0);
        gfx.read_matrix(MatrixMode::Projection, &mut self.orthographic);
        gfx.load_matrix(&self.perspective);
        gfx.matrix_mode(MatrixMode::ModelView);

        log::debug!("captured overlay projection for {width}x{height}");
    }

    /// Switches to screen space and saves the scene's model/view transform.
    pub fn begin_overlay(&self, gfx: &mut dyn GraphicsBackend) -> Result<(), FrameError> {
        gfx.matrix_mode(MatrixMode::Projection);
        gfx.load_matrix(&self.orthographic);
        gfx.matrix_mode(MatrixMode::ModelView);
        gfx.push_matrix()?;
        gfx.load_identity();
        Ok(())
    }

    /// Restores the scene's model/view transform and perspective projection,
    /// then lets the camera re-apply its current transform.
    pub fn end_overlay(
        &self,
        gfx: &mut dyn GraphicsBackend,
        camera: &dyn Camera,
    ) -> Result<(), FrameError> {
        gfx.pop_matrix()?;
        gfx.matrix_mode(MatrixMode::Projection);
        gfx.load_matrix(&self.perspective);
        gfx.matrix_mode(MatrixMode::ModelView);
        camera.apply_perspective_transform(gfx);
        Ok(())
    }
}
