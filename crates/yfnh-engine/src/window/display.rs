use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use crate::config::WindowConfig;
use crate::core::{Display, Platform};
use crate::device::{Gpu, GpuBackend, GpuInit};
use crate::error::InitError;
use crate::time::FramePacer;

/// Pumps allowed while waiting for the platform to hand out the window.
const OPEN_ATTEMPTS: u32 = 100;
const OPEN_POLL: Duration = Duration::from_millis(10);

/// Opens a winit window with a wgpu context.
#[derive(Debug, Clone, Default)]
pub struct WinitPlatform;

impl WinitPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Platform for WinitPlatform {
    type Display = WinitDisplay;
    type Graphics = GpuBackend;

    fn open(&mut self, config: &WindowConfig) -> Result<(WinitDisplay, GpuBackend), InitError> {
        let mut event_loop =
            EventLoop::new().map_err(|e| InitError::Display(format!("event loop: {e}")))?;

        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(f64::from(config.width), f64::from(config.height)))
            .with_resizable(config.resizable);

        let mut handler = DisplayHandler::new(attributes);
        let window = wait_for_window(&mut event_loop, &mut handler)?;

        let init = GpuInit::default().with_vsync(config.vsync);
        let gpu = pollster::block_on(Gpu::new(window, init))
            .map_err(|e| InitError::Graphics(format!("{e:#}")))?;

        let size = gpu.size();
        log::info!(
            "display open: {:?} {}x{} (vsync {})",
            config.title,
            size.width,
            size.height,
            config.vsync
        );

        let display = WinitDisplay {
            event_loop,
            handler,
            pacer: FramePacer::new(),
            destroyed: false,
        };
        Ok((display, GpuBackend::new(gpu)))
    }
}

fn wait_for_window(
    event_loop: &mut EventLoop<()>,
    handler: &mut DisplayHandler,
) -> Result<Arc<Window>, InitError> {
    for _ in 0..OPEN_ATTEMPTS {
        let status = event_loop.pump_app_events(Some(OPEN_POLL), handler);

        if let Some(err) = handler.create_error.take() {
            return Err(InitError::Display(err));
        }
        if let Some(window) = &handler.window {
            return Ok(Arc::clone(window));
        }
        if let PumpStatus::Exit(code) = status {
            return Err(InitError::Display(format!(
                "event loop exited with code {code} before the window opened"
            )));
        }
    }
    Err(InitError::Display("window was not created in time".to_string()))
}

/// A winit window whose events are pumped once per frame.
pub struct WinitDisplay {
    event_loop: EventLoop<()>,
    handler: DisplayHandler,
    pacer: FramePacer,
    destroyed: bool,
}

impl Display for WinitDisplay {
    fn close_requested(&mut self) -> bool {
        if self.destroyed {
            return true;
        }
        if let PumpStatus::Exit(code) =
            self.event_loop.pump_app_events(Some(Duration::ZERO), &mut self.handler)
        {
            log::debug!("event loop exited with code {code}");
            self.handler.close_requested = true;
        }
        self.handler.close_requested
    }

    fn sync_to(&mut self, rate: u32) {
        self.pacer.sync(rate);
    }

    fn size(&self) -> (u32, u32) {
        (self.handler.size.width, self.handler.size.height)
    }

    fn set_cursor_grabbed(&mut self, grabbed: bool) {
        self.handler.cursor_grabbed = grabbed;
        if let Some(window) = &self.handler.window {
            apply_cursor_grab(window, grabbed);
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        if let Some(window) = self.handler.window.take() {
            apply_cursor_grab(&window, false);
            window.set_visible(false);
        }
        log::info!("display destroyed");
    }
}

struct DisplayHandler {
    attributes: WindowAttributes,
    window: Option<Arc<Window>>,
    create_error: Option<String>,
    /// Latest drawable size reported by the platform, physical pixels.
    size: PhysicalSize<u32>,
    close_requested: bool,
    cursor_grabbed: bool,
}

impl DisplayHandler {
    fn new(attributes: WindowAttributes) -> Self {
        Self {
            attributes,
            window: None,
            create_error: None,
            size: PhysicalSize::new(0, 0),
            close_requested: false,
            cursor_grabbed: false,
        }
    }

    fn on_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.close_requested = true;
            }
            // Most platforms drop the grab when focus leaves.
            WindowEvent::Focused(true) if self.cursor_grabbed => {
                if let Some(window) = &self.window {
                    apply_cursor_grab(window, true);
                }
            }
            WindowEvent::Resized(size) => {
                log::debug!("window resized to {}x{}", size.width, size.height);
                self.size = *size;
            }
            // The physical size changes with the scale; a Resized may not follow.
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    self.size = window.inner_size();
                }
                log::debug!(
                    "scale factor {scale_factor}, drawable now {}x{}",
                    self.size.width,
                    self.size.height
                );
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for DisplayHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        match event_loop.create_window(self.attributes.clone()) {
            Ok(window) => {
                self.size = window.inner_size();
                self.window = Some(Arc::new(window));
            }
            Err(e) => {
                log::error!("failed to create window: {e}");
                self.create_error = Some(e.to_string());
            }
        }
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.on_window_event(&event);
    }
}

fn apply_cursor_grab(window: &Window, grabbed: bool) {
    window.set_cursor_visible(!grabbed);
    let result = if grabbed {
        window
            .set_cursor_grab(CursorGrabMode::Confined)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked))
    } else {
        window.set_cursor_grab(CursorGrabMode::None)
    };
    if let Err(e) = result {
        log::warn!("failed to set cursor grab to {grabbed}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> DisplayHandler {
        DisplayHandler::new(Window::default_attributes())
    }

    #[test]
    fn resize_events_update_the_reported_size() {
        let mut h = handler();
        h.on_window_event(&WindowEvent::Resized(PhysicalSize::new(1920, 1080)));
        assert_eq!(h.size, PhysicalSize::new(1920, 1080));

        // Minimized.
        h.on_window_event(&WindowEvent::Resized(PhysicalSize::new(0, 0)));
        assert_eq!(h.size, PhysicalSize::new(0, 0));
        assert!(!h.close_requested);
    }

    #[test]
    fn close_and_destroy_events_request_close() {
        let mut h = handler();
        h.on_window_event(&WindowEvent::Focused(true));
        assert!(!h.close_requested);
        h.on_window_event(&WindowEvent::CloseRequested);
        assert!(h.close_requested);

        let mut h = handler();
        h.on_window_event(&WindowEvent::Destroyed);
        assert!(h.close_requested);
    }
}
