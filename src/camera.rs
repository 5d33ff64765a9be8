use glam::{Mat4, Vec3};

use crate::config::GameConfig;
use crate::render::CameraParams;

/// Radians per second applied by the keyboard look actions.
const KEY_LOOK_RATE: f32 = 2.0;

/// Third-person orbit camera that follows the cat.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraController {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub height: f32,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub sensitivity: f32,
    pub fov: f32,
    pub min_height: f32,
    position: Vec3,
    target: Vec3,
}

impl CameraController {
    pub fn new(config: &GameConfig) -> Self {
        let mut camera = Self {
            yaw: 0.0,
            pitch: 0.35,
            distance: config.camera_distance,
            height: config.camera_height,
            min_pitch: config.camera_min_pitch,
            max_pitch: config.camera_max_pitch,
            sensitivity: config.camera_sensitivity,
            fov: config.camera_fov,
            min_height: 0.5,
            position: Vec3::ZERO,
            target: Vec3::ZERO,
        };
        camera.pitch = camera.pitch.clamp(camera.min_pitch, camera.max_pitch);
        camera.follow(Vec3::ZERO);
        camera
    }

    /// Applies mouse motion in pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw -= dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(self.min_pitch, self.max_pitch);
    }

    /// Applies keyboard look, each axis in `-1..=1`.
    pub fn rotate_by_keys(&mut self, yaw_axis: f32, pitch_axis: f32, dt: f32) {
        self.yaw += yaw_axis * KEY_LOOK_RATE * dt;
        self.pitch =
            (self.pitch + pitch_axis * KEY_LOOK_RATE * dt).clamp(self.min_pitch, self.max_pitch);
    }

    /// Recomputes the orbit position around `player`.
    pub fn follow(&mut self, player: Vec3) {
        self.target = player + Vec3::Y * self.height;
        let offset = Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            self.pitch.cos() * self.yaw.cos(),
        ) * self.distance;
        let mut position = self.target + offset;
        position.y = position.y.max(self.min_height);
        self.position = position;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Horizontal direction the camera looks along.
    pub fn forward_xz(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    pub fn right_xz(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    pub fn params(&self, aspect: f32) -> CameraParams {
        let view = Mat4::look_at_rh(self.position, self.target, Vec3::Y);
        let projection =
            Mat4::perspective_rh_gl(self.fov.to_radians(), aspect.max(0.01), 0.1, 300.0);
        CameraParams {
            view_proj: projection * view,
            position: self.position,
        }
    }
}
