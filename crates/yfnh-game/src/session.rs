use nalgebra::Point3;

use yfnh_engine::core::Session;

use crate::player::Explorer;
use crate::world::{Bounds, Level};

/// Vertical field of view of the player camera, degrees.
pub const FIELD_OF_VIEW: f32 = 70.0;

/// Builds the demo level and its explorer.
#[derive(Debug, Clone)]
pub struct DemoSession {
    pub spawn: Point3<f32>,
    pub bounds: Bounds,
    pub debug_menu: bool,
}

impl Default for DemoSession {
    fn default() -> Self {
        Self {
            spawn: Point3::new(5.0, 5.0, 5.0),
            bounds: Bounds::default(),
            debug_menu: cfg!(debug_assertions),
        }
    }
}

impl Session for DemoSession {
    type Player = Explorer;
    type World = Level;

    fn create_world(&mut self) -> Level {
        Level::new(self.bounds)
    }

    fn create_player(&mut self, aspect: f32) -> Explorer {
        Explorer::new(aspect, FIELD_OF_VIEW).with_debug_menu(self.debug_menu)
    }

    fn spawn_position(&self) -> Point3<f32> {
        self.spawn
    }
}
