use nalgebra::Point3;

use crate::error::{FrameError, InitError};
use crate::gfx::GraphicsBackend;

/// View/projection owner of a player.
pub trait Camera {
    /// Loads the camera's perspective projection.
    ///
    /// Must leave model/view mode selected; the frame fails otherwise.
    fn apply_perspective_transform(&self, gfx: &mut dyn GraphicsBackend);
}

/// The controllable first-person entity.
pub trait Player {
    type Camera: Camera;

    /// Advances player state by one frame.
    fn player_update(&mut self);

    /// Re-derives the view transform from the current position and
    /// orientation and multiplies it onto the (identity) model/view matrix.
    fn camera_update(&mut self, gfx: &mut dyn GraphicsBackend);

    fn camera(&self) -> &Self::Camera;

    fn position(&self) -> Point3<f32>;

    /// Whether the debug overlay is shown.
    fn debug_menu(&self) -> bool;
}

/// The simulated world. Generic over its member type so the player can be
/// registered without the world owning it.
pub trait World<M> {
    /// Registers `member` with the world.
    fn add(&mut self, member: &mut M);

    /// Places a registered member at `position`.
    fn move_to(&mut self, member: &mut M, position: Point3<f32>);

    /// Advances world state by one frame.
    fn update(&mut self);

    fn paused(&self) -> bool;
}

/// Screen-space drawing hook.
///
/// Draw methods receive shared references to simulation state and must not
/// block. They run with the orthographic projection active, so coordinates
/// are window pixels with a top-left origin.
pub trait Overlay<P> {
    /// Loads font resources. Called once during initialization with the
    /// drawable size the orthographic projection was built for.
    fn load(
        &mut self,
        gfx: &mut dyn GraphicsBackend,
        viewport: (u32, u32),
    ) -> Result<(), InitError>;

    fn draw_crosshair(&self, gfx: &mut dyn GraphicsBackend) -> Result<(), FrameError>;

    fn draw_pause_menu(&self, gfx: &mut dyn GraphicsBackend, player: &P) -> Result<(), FrameError>;

    /// `fps` is `None` when no time elapsed since the previous reading.
    fn draw_debug_menu(
        &self,
        gfx: &mut dyn GraphicsBackend,
        player: &P,
        fps: Option<f32>,
    ) -> Result<(), FrameError>;
}

/// Factory for the world/player pair a driver runs.
pub trait Session {
    type Player: Player;
    type World: World<Self::Player>;

    fn create_world(&mut self) -> Self::World;

    /// `aspect` is the display's width / height.
    fn create_player(&mut self, aspect: f32) -> Self::Player;

    fn spawn_position(&self) -> Point3<f32>;
}
