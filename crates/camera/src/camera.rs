use crate::delta::CameraDelta;
use glam::{Mat4, Vec3};
use meshrig_common::CameraConfig;

/// Free-fly perspective camera. Angles are stored in degrees.
///
/// Orientation vectors are recomputed eagerly whenever yaw or pitch change,
/// so reads never see stale `front`/`right`/`up`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    yaw: f32,
    pitch: f32,
    fov: f32,
    aspect: f32,
}

impl Camera {
    pub const PITCH_LIMIT: f32 = 89.0;
    pub const FOV_MIN: f32 = 1.0;
    pub const FOV_MAX: f32 = 90.0;
    pub const NEAR: f32 = 0.01;
    pub const FAR: f32 = 100.0;
    pub const WORLD_UP: Vec3 = Vec3::Y;

    /// Camera at `position` looking down -Z with a 45 degree field of view.
    pub fn new(position: Vec3, aspect: f32) -> Self {
        let mut camera = Self {
            position,
            front: -Vec3::Z,
            up: Vec3::Y,
            right: Vec3::X,
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
            aspect: if aspect.is_finite() && aspect > 0.0 {
                aspect
            } else {
                1.0
            },
        };
        camera.update_vectors();
        camera
    }

    /// Camera placed per `config` for a `width` x `height` viewport.
    pub fn from_config(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self::new(Vec3::from_array(config.position), 1.0);
        camera.set_aspect_ratio(width, height);
        camera.set_yaw_pitch(config.yaw, config.pitch);
        camera.set_fov(config.fov);
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Set orientation. Pitch is clamped to the limit, never wrapped.
    /// Non-finite input leaves the orientation unchanged.
    pub fn set_yaw_pitch(&mut self, yaw: f32, pitch: f32) {
        if !yaw.is_finite() || !pitch.is_finite() {
            tracing::warn!("ignoring non-finite camera orientation ({yaw}, {pitch})");
            return;
        }
        self.yaw = yaw;
        self.pitch = pitch.clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.update_vectors();
    }

    /// Add to yaw and pitch.
    pub fn rotate(&mut self, yaw: f32, pitch: f32) {
        self.set_yaw_pitch(self.yaw + yaw, self.pitch + pitch);
    }

    /// Set the field of view, clamped to `[FOV_MIN, FOV_MAX]`.
    pub fn set_fov(&mut self, fov: f32) {
        if fov.is_finite() {
            self.fov = fov.clamp(Self::FOV_MIN, Self::FOV_MAX);
        }
    }

    /// Add `delta` to the field of view, clamped.
    pub fn zoom(&mut self, delta: f32) {
        self.set_fov(self.fov + delta);
    }

    /// Track a viewport resize. A zero dimension counts as one pixel.
    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    /// Move along `front`, `up` and `cross(front, up)`, then rotate and zoom.
    pub fn apply(&mut self, delta: &CameraDelta) {
        if delta.has_translation() {
            let lateral = self.front.cross(self.up).normalize();
            self.position +=
                self.front * delta.forward + self.up * delta.up + lateral * delta.lateral;
        }
        if delta.has_rotation() {
            self.rotate(delta.yaw, delta.pitch);
        }
        if delta.zoom != 0.0 {
            self.zoom(delta.zoom);
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// OpenGL clip-space perspective (depth in [-1, 1]).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, Self::NEAR, Self::FAR)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(Self::WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0), 800.0 / 600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn default_looks_down_negative_z() {
        let cam = Camera::default();
        assert!((cam.front() - Vec3::new(0.0, 0.0, -1.0)).length() < EPS);
        assert!((cam.right() - Vec3::X).length() < EPS);
        assert!((cam.up() - Vec3::Y).length() < EPS);
    }

    #[test]
    fn pitch_clamps_instead_of_wrapping() {
        let mut cam = Camera::default();
        cam.rotate(0.0, -500.0);
        assert_eq!(cam.pitch(), -89.0);
        cam.rotate(0.0, 1000.0);
        assert_eq!(cam.pitch(), 89.0);
        // Up never inverts at the limit.
        assert!(cam.up().y > 0.0);
    }

    #[test]
    fn pitch_stays_bounded_over_many_steps() {
        let mut cam = Camera::default();
        for step in 0..1000 {
            let delta = if step % 3 == 0 { -37.5 } else { 23.0 };
            cam.rotate(delta * 0.5, delta);
            assert!(cam.pitch() >= -Camera::PITCH_LIMIT && cam.pitch() <= Camera::PITCH_LIMIT);
            assert!((cam.front().length() - 1.0).abs() < 1e-4);
        }
    }

    #[test]
    fn fov_stays_bounded() {
        let mut cam = Camera::default();
        for _ in 0..200 {
            cam.zoom(-3.0);
            assert!(cam.fov() >= Camera::FOV_MIN);
        }
        assert_eq!(cam.fov(), Camera::FOV_MIN);
        cam.zoom(1_000.0);
        assert_eq!(cam.fov(), Camera::FOV_MAX);
    }

    #[test]
    fn zero_height_viewport_keeps_aspect_finite() {
        let mut cam = Camera::default();
        cam.set_aspect_ratio(1280, 0);
        assert_eq!(cam.aspect_ratio(), 1280.0);
        cam.set_aspect_ratio(0, 0);
        assert_eq!(cam.aspect_ratio(), 1.0);
        assert!(cam.projection_matrix().is_finite());
    }

    #[test]
    fn view_matrix_maps_position_to_origin() {
        let cam = Camera::new(Vec3::new(1.0, 2.0, 3.0), 1.0);
        let p = cam.view_matrix().transform_point3(cam.position());
        assert!(p.length() < EPS);
        // A point ahead of the camera lands on the -Z view axis.
        let ahead = cam.view_matrix().transform_point3(cam.position() + cam.front());
        assert!((ahead - Vec3::new(0.0, 0.0, -1.0)).length() < EPS);
    }

    #[test]
    fn apply_moves_along_camera_axes() {
        let mut cam = Camera::new(Vec3::ZERO, 1.0);
        cam.apply(&CameraDelta {
            forward: 2.0,
            up: 1.0,
            lateral: 0.5,
            ..CameraDelta::ZERO
        });
        // front = -Z, up = +Y, cross(front, up) = +X
        assert!((cam.position() - Vec3::new(0.5, 1.0, -2.0)).length() < EPS);
    }

    #[test]
    fn apply_rotates_and_zooms() {
        let mut cam = Camera::default();
        cam.apply(&CameraDelta {
            yaw: 90.0,
            pitch: 10.0,
            zoom: -5.0,
            ..CameraDelta::ZERO
        });
        assert_eq!(cam.yaw(), 0.0);
        assert_eq!(cam.pitch(), 10.0);
        assert_eq!(cam.fov(), 40.0);
        assert!(cam.front().x > 0.9);
    }

    #[test]
    fn non_finite_orientation_ignored() {
        let mut cam = Camera::default();
        cam.set_yaw_pitch(f32::NAN, 0.0);
        assert_eq!(cam.yaw(), -90.0);
        cam.set_fov(f32::INFINITY);
        assert_eq!(cam.fov(), 45.0);
    }

    #[test]
    fn from_config_applies_clamps() {
        let config = CameraConfig {
            position: [1.0, 0.0, 0.0],
            yaw: 0.0,
            pitch: 120.0,
            fov: 0.0,
        };
        let cam = Camera::from_config(&config, 1920, 1080);
        assert_eq!(cam.pitch(), 89.0);
        assert_eq!(cam.fov(), 1.0);
        assert!((cam.aspect_ratio() - 16.0 / 9.0).abs() < EPS);
    }
}
