//! Startup configuration.

/// Window/context parameters handed to the platform when the display is created.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub resizable: bool,
    pub vsync: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            title: "Your Future Needs Help PreAlpha v0.01".to_string(),
            resizable: false,
            vsync: true,
        }
    }
}

impl WindowConfig {
    /// Width / height; 1.0 for a degenerate height.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Frame-loop parameters. Fixed once the driver is constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopConfig {
    pub window: WindowConfig,
    /// Target iterations per second for the end-of-frame pacing wait.
    pub update_rate: u32,
    /// Hide and confine the cursor while the window is focused.
    pub grab_cursor: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            update_rate: 80,
            grab_cursor: true,
        }
    }
}

impl LoopConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.window.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.window.vsync = vsync;
        self
    }

    pub fn with_update_rate(mut self, rate: u32) -> Self {
        self.update_rate = rate;
        self
    }

    pub fn with_grab_cursor(mut self, grab: bool) -> Self {
        self.grab_cursor = grab;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_window() {
        let cfg = LoopConfig::default();
        assert_eq!(cfg.update_rate, 80);
        assert_eq!((cfg.window.width, cfg.window.height), (1280, 720));
        assert!(cfg.window.vsync);
        assert!(!cfg.window.resizable);
    }

    #[test]
    fn aspect_guards_zero_height() {
        let mut w = WindowConfig::default();
        assert!((w.aspect() - 16.0 / 9.0).abs() < 1e-6);
        w.height = 0;
        assert_eq!(w.aspect(), 1.0);
    }

    #[test]
    fn builders_override_fields() {
        let cfg = LoopConfig::default()
            .with_title("t")
            .with_size(640, 480)
            .with_update_rate(60)
            .with_vsync(false)
            .with_grab_cursor(false);
        assert_eq!(cfg.window.title, "t");
        assert_eq!((cfg.window.width, cfg.window.height), (640, 480));
        assert_eq!(cfg.update_rate, 60);
        assert!(!cfg.window.vsync);
        assert!(!cfg.grab_cursor);
    }
}
