use std::cell::RefCell;
use std::fmt::Write as _;

use yfnh_engine::core::{Overlay, Player};
use yfnh_engine::error::{FrameError, InitError};
use yfnh_engine::gfx::{Color, FontId, GraphicsBackend, TextStyle};

use crate::player::Explorer;

const CROSSHAIR_SIZE: f32 = 24.0;
const MENU_SIZE: f32 = 32.0;
const DEBUG_SIZE: f32 = 16.0;
const DEBUG_LINE_HEIGHT: f32 = 20.0;
const MARGIN: f32 = 10.0;

/// Screen-space text: crosshair, pause menu and debug readout.
pub struct Hud {
    font_bytes: Vec<u8>,
    font: Option<FontId>,
    viewport: (f32, f32),
    // Reused for every formatted line.
    line: RefCell<String>,
}

impl Hud {
    pub fn new(font_bytes: Vec<u8>) -> Self {
        Self {
            font_bytes,
            font: None,
            viewport: (0.0, 0.0),
            line: RefCell::new(String::with_capacity(64)),
        }
    }

    fn font(&self) -> Result<FontId, FrameError> {
        self.font
            .ok_or_else(|| FrameError::Collaborator("hud font not loaded".to_string()))
    }

    fn centre(&self) -> (f32, f32) {
        (self.viewport.0 * 0.5, self.viewport.1 * 0.5)
    }
}

/// Writes the frame-rate readout, `--` when no time has elapsed.
pub(crate) fn write_fps(out: &mut String, fps: Option<f32>) {
    out.push_str("FPS: ");
    match fps {
        Some(fps) => {
            let _ = write!(out, "{fps:.0}");
        }
        None => out.push_str("--"),
    }
}

impl Overlay<Explorer> for Hud {
    fn load(
        &mut self,
        gfx: &mut dyn GraphicsBackend,
        viewport: (u32, u32),
    ) -> Result<(), InitError> {
        let font = gfx.load_font(&self.font_bytes)?;
        self.font = Some(font);
        self.viewport = (viewport.0 as f32, viewport.1 as f32);
        // The backend keeps its own parsed copy.
        self.font_bytes = Vec::new();
        log::info!("hud ready ({}x{})", viewport.0, viewport.1);
        Ok(())
    }

    fn draw_crosshair(&self, gfx: &mut dyn GraphicsBackend) -> Result<(), FrameError> {
        let (cx, cy) = self.centre();
        let style = TextStyle { size: CROSSHAIR_SIZE, color: Color::white() };
        gfx.draw_text(
            self.font()?,
            cx - CROSSHAIR_SIZE * 0.25,
            cy - CROSSHAIR_SIZE * 0.5,
            "+",
            style,
        )
    }

    fn draw_pause_menu(
        &self,
        gfx: &mut dyn GraphicsBackend,
        player: &Explorer,
    ) -> Result<(), FrameError> {
        let font = self.font()?;
        let (cx, cy) = self.centre();

        let title = TextStyle { size: MENU_SIZE, color: Color::white() };
        gfx.draw_text(font, cx - MENU_SIZE * 1.5, cy * 0.5, "Paused", title)?;

        let p = player.position();
        let mut line = self.line.borrow_mut();
        line.clear();
        let _ = write!(line, "at {:.1}, {:.1}, {:.1}", p.x, p.y, p.z);
        let detail = TextStyle { size: DEBUG_SIZE, color: Color::new(0.8, 0.8, 0.8, 1.0) };
        gfx.draw_text(font, cx - MENU_SIZE * 1.5, cy * 0.5 + MENU_SIZE + MARGIN, &line, detail)
    }

    fn draw_debug_menu(
        &self,
        gfx: &mut dyn GraphicsBackend,
        player: &Explorer,
        fps: Option<f32>,
    ) -> Result<(), FrameError> {
        let font = self.font()?;
        let style = TextStyle { size: DEBUG_SIZE, color: Color::new(1.0, 1.0, 0.0, 1.0) };
        let mut line = self.line.borrow_mut();

        line.clear();
        write_fps(&mut line, fps);
        gfx.draw_text(font, MARGIN, MARGIN, &line, style)?;

        let p = player.position();
        line.clear();
        let _ = write!(line, "X: {:.2}  Y: {:.2}  Z: {:.2}", p.x, p.y, p.z);
        gfx.draw_text(font, MARGIN, MARGIN + DEBUG_LINE_HEIGHT, &line, style)
    }
}
