use winit::dpi::PhysicalSize;

use crate::error::{FrameError, InitError};
use crate::gfx::{
    BlendFactor, Capability, ClearMask, Color, DepthFunc, Face, FixedFunctionState, FontId,
    GraphicsBackend, Mat4, MatrixMode, ShadeModel, TextStyle,
};
use crate::text::{FontSystem, GlyphRun, TextRenderer};

use super::gpu::{Gpu, SurfaceErrorAction};

/// [`GraphicsBackend`] that renders through wgpu.
///
/// Pipeline state lives in a [`FixedFunctionState`]; commands are queued
/// during the frame and encoded on [`GraphicsBackend::present`]. Text
/// positions are resolved through the current projection × model/view when
/// `draw_text` is called, exactly like immediate-mode drawing would.
pub struct GpuBackend {
    gpu: Gpu,
    state: FixedFunctionState,
    fonts: FontSystem,
    text: TextRenderer,

    pending_clear: ClearMask,
    runs: Vec<GlyphRun>,
    run_text: String,
}

impl GpuBackend {
    pub fn new(gpu: Gpu) -> Self {
        let text = TextRenderer::new(gpu.device(), gpu.surface_format());
        Self {
            gpu,
            state: FixedFunctionState::new(),
            fonts: FontSystem::new(),
            text,
            pending_clear: ClearMask { color: false, depth: false },
            runs: Vec::new(),
            run_text: String::new(),
        }
    }

    fn discard_frame(&mut self) {
        self.pending_clear = ClearMask { color: false, depth: false };
        self.runs.clear();
        self.run_text.clear();
    }
}

/// Maps normalized device coordinates to y-down window pixels.
pub(crate) fn ndc_to_pixels(ndc_x: f32, ndc_y: f32, width: f32, height: f32) -> [f32; 2] {
    [(ndc_x + 1.0) * 0.5 * width, (1.0 - ndc_y) * 0.5 * height]
}

fn to_wgpu_color(c: Color) -> wgpu::Color {
    wgpu::Color {
        r: f64::from(c.r),
        g: f64::from(c.g),
        b: f64::from(c.b),
        a: f64::from(c.a),
    }
}

impl GraphicsBackend for GpuBackend {
    fn enable(&mut self, cap: Capability) {
        self.state.set_enabled(cap, true);
    }

    fn disable(&mut self, cap: Capability) {
        self.state.set_enabled(cap, false);
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
    }

    fn current_matrix_mode(&self) -> MatrixMode {
        self.state.matrix_mode()
    }

    fn load_identity(&mut self) {
        self.state.load_identity();
    }

    fn load_matrix(&mut self, m: &Mat4) {
        self.state.load_matrix(m);
    }

    fn mult_matrix(&mut self, m: &Mat4) {
        self.state.mult_matrix(m);
    }

    fn ortho(&mut self, left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) {
        self.state.ortho(left, right, bottom, top, near, far);
    }

    fn read_matrix(&self, mode: MatrixMode, out: &mut Mat4) {
        out.copy_from(self.state.matrix(mode));
    }

    fn push_matrix(&mut self) -> Result<(), FrameError> {
        self.state.push()
    }

    fn pop_matrix(&mut self) -> Result<(), FrameError> {
        self.state.pop()
    }

    fn clear(&mut self, mask: ClearMask) {
        if mask.color {
            // Anything queued so far would be painted over.
            self.runs.clear();
            self.run_text.clear();
        }
        self.pending_clear.color |= mask.color;
        self.pending_clear.depth |= mask.depth;
    }

    fn load_font(&mut self, bytes: &[u8]) -> Result<FontId, InitError> {
        self.fonts.load_font(bytes)
    }

    fn draw_text(
        &mut self,
        font: FontId,
        x: f32,
        y: f32,
        text: &str,
        style: TextStyle,
    ) -> Result<(), FrameError> {
        if self.fonts.get(font).is_none() {
            return Err(FrameError::Collaborator(format!("unknown font {font:?}")));
        }
        if text.is_empty() {
            return Ok(());
        }

        let Some(ndc) = self.state.to_ndc(x, y, 0.0) else {
            log::trace!("text {text:?} at ({x}, {y}) is behind the eye, skipped");
            return Ok(());
        };

        let size = self.gpu.size();
        let start = self.run_text.len();
        self.run_text.push_str(text);
        self.runs.push(GlyphRun {
            font,
            origin: ndc_to_pixels(ndc.x, ndc.y, size.width as f32, size.height as f32),
            size: style.size,
            color: style.color.premultiplied(),
            text: start..self.run_text.len(),
        });
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        let size = self.gpu.size();
        if (size.width, size.height) != (width, height) {
            log::debug!("surface resized to {width}x{height}");
            self.gpu.resize(PhysicalSize::new(width, height));
        }
    }

    fn present(&mut self) -> Result<(), FrameError> {
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            // Minimized: nothing to draw into.
            self.discard_frame();
            return Ok(());
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                let msg = err.to_string();
                let action = self.gpu.handle_surface_error(err);
                self.discard_frame();
                return match action {
                    SurfaceErrorAction::Fatal => Err(FrameError::Surface(msg)),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => {
                        log::debug!("frame skipped: {msg} ({action:?})");
                        Ok(())
                    }
                };
            }
        };

        let color_load = if self.pending_clear.color {
            wgpu::LoadOp::Clear(to_wgpu_color(self.state.clear_color()))
        } else {
            wgpu::LoadOp::Load
        };
        let depth_load = if self.pending_clear.depth {
            wgpu::LoadOp::Clear(self.state.clear_depth())
        } else {
            wgpu::LoadOp::Load
        };

        {
            let _pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("yfnh clear pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: self.gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        let size = self.gpu.size();
        self.text.render(
            self.gpu.device(),
            self.gpu.queue(),
            &mut frame.encoder,
            &frame.view,
            [size.width as f32, size.height as f32],
            &self.fonts,
            &self.runs,
            &self.run_text,
        );

        self.gpu.submit(frame);
        self.discard_frame();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_corners_map_to_window_corners() {
        assert_eq!(ndc_to_pixels(-1.0, 1.0, 1280.0, 720.0), [0.0, 0.0]);
        assert_eq!(ndc_to_pixels(1.0, -1.0, 1280.0, 720.0), [1280.0, 720.0]);
        assert_eq!(ndc_to_pixels(0.0, 0.0, 1280.0, 720.0), [640.0, 360.0]);
    }

    #[test]
    fn overlay_ortho_round_trips_to_the_same_pixel() {
        let mut state = FixedFunctionState::new();
        state.set_matrix_mode(MatrixMode::Projection);
        state.ortho(0.0, 1280.0, 720.0, 0.0, 1.0, -1.0);
        state.set_matrix_mode(MatrixMode::ModelView);

        let ndc = state.to_ndc(100.0, 50.0, 0.0).unwrap();
        let px = ndc_to_pixels(ndc.x, ndc.y, 1280.0, 720.0);
        assert!((px[0] - 100.0).abs() < 1e-3, "{px:?}");
        assert!((px[1] - 50.0).abs() < 1e-3, "{px:?}");
    }
}
