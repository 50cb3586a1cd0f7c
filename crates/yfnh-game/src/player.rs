use nalgebra::{Matrix4, Point3, Rotation3, Vector3};

use yfnh_engine::core::{Camera, Player};
use yfnh_engine::gfx::{GraphicsBackend, Mat4, MatrixMode};

const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 1000.0;

/// Perspective camera that looks out from the player's eyes.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstPersonCamera {
    /// Vertical field of view, degrees.
    fov: f32,
    aspect: f32,
    position: Point3<f32>,
    /// Radians around +Y.
    yaw: f32,
    /// Radians around +X.
    pitch: f32,
}

impl FirstPersonCamera {
    pub fn new(aspect: f32, fov: f32) -> Self {
        Self {
            fov,
            // The projection is undefined for a zero or negative aspect.
            aspect: if aspect > f32::EPSILON { aspect } else { 1.0 },
            position: Point3::origin(),
            yaw: 0.0,
            pitch: 0.0,
        }
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Matrix4::new_perspective(self.aspect, self.fov.to_radians(), NEAR_PLANE, FAR_PLANE)
    }

    /// World-to-eye transform: pitch, then yaw, then translate by -position.
    pub fn view_matrix(&self) -> Mat4 {
        let pitch = Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch);
        let yaw = Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw);
        pitch.to_homogeneous()
            * yaw.to_homogeneous()
            * Matrix4::new_translation(&-self.position.coords)
    }
}

impl Camera for FirstPersonCamera {
    fn apply_perspective_transform(&self, gfx: &mut dyn GraphicsBackend) {
        gfx.matrix_mode(MatrixMode::Projection);
        gfx.load_identity();
        gfx.mult_matrix(&self.projection_matrix());
        gfx.matrix_mode(MatrixMode::ModelView);
    }
}

/// The demo player: a free-floating observer.
#[derive(Debug, Clone)]
pub struct Explorer {
    position: Point3<f32>,
    /// Units per frame.
    velocity: Vector3<f32>,
    camera: FirstPersonCamera,
    debug_menu: bool,
}

impl Explorer {
    pub fn new(aspect: f32, fov: f32) -> Self {
        Self {
            position: Point3::origin(),
            velocity: Vector3::zeros(),
            camera: FirstPersonCamera::new(aspect, fov),
            debug_menu: false,
        }
    }

    pub fn with_debug_menu(mut self, on: bool) -> Self {
        self.debug_menu = on;
        self
    }

    /// Sets the position directly. Only the world moves its members.
    pub(crate) fn place(&mut self, position: Point3<f32>) {
        self.position = position;
    }
}

impl Player for Explorer {
    type Camera = FirstPersonCamera;

    fn player_update(&mut self) {
        self.position += self.velocity;
    }

    fn camera_update(&mut self, gfx: &mut dyn GraphicsBackend) {
        self.camera.position = self.position;
        gfx.mult_matrix(&self.camera.view_matrix());
    }

    fn camera(&self) -> &FirstPersonCamera {
        &self.camera
    }

    fn position(&self) -> Point3<f32> {
        self.position
    }

    fn debug_menu(&self) -> bool {
        self.debug_menu
    }
}
