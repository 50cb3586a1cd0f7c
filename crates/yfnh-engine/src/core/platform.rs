use crate::config::WindowConfig;
use crate::error::InitError;
use crate::gfx::GraphicsBackend;

/// An open window and its event source.
pub trait Display {
    /// Processes pending window events and reports whether the user asked to close.
    fn close_requested(&mut self) -> bool;

    /// Blocks until the next frame slot for `rate` frames per second.
    fn sync_to(&mut self, rate: u32);

    /// Drawable size in physical pixels.
    fn size(&self) -> (u32, u32);

    /// Hides and confines the cursor, or releases it.
    fn set_cursor_grabbed(&mut self, grabbed: bool);

    /// Releases the window. Further calls are no-ops.
    fn destroy(&mut self);
}

/// Creates the display and its graphics context together.
pub trait Platform {
    type Display: Display;
    type Graphics: GraphicsBackend;

    fn open(
        &mut self,
        config: &WindowConfig,
    ) -> Result<(Self::Display, Self::Graphics), InitError>;
}
