mod hud;
mod player;
mod session;
mod world;

use anyhow::{Context, Result};

use yfnh_engine::config::LoopConfig;
use yfnh_engine::core::FrameDriver;
use yfnh_engine::logging::{init_logging, LoggingConfig};
use yfnh_engine::window::WinitPlatform;

use crate::hud::Hud;
use crate::session::DemoSession;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = LoopConfig::default();
    let session = DemoSession::default();
    let hud = Hud::new(load_font());
    let mut driver = FrameDriver::new(config, WinitPlatform::new(), session, hud)
        .context("failed to create frame driver")?;

    if let Err(err) = driver.initialize() {
        log::error!("initialization failed: {err}");
        return Err(err).context("failed to initialize");
    }

    let result = driver.run_loop();
    driver.shutdown();
    result.context("frame loop stopped")
}

/// Reads the first overlay font found in the usual system locations.
///
/// An empty result makes initialization fail with a font error.
fn load_font() -> Vec<u8> {
    [
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
    .unwrap_or_default()
}
