use glam::{Mat4, Vec3};
use meshrig_common::SceneConfig;

/// Model transform that rotates about a fixed axis at a constant rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    axis: Vec3,
    degrees_per_second: f32,
}

impl Spin {
    /// A zero or non-finite axis falls back to +Y.
    pub fn new(axis: Vec3, degrees_per_second: f32) -> Self {
        let axis = axis.try_normalize().unwrap_or(Vec3::Y);
        let degrees_per_second = if degrees_per_second.is_finite() {
            degrees_per_second
        } else {
            0.0
        };
        Self {
            axis,
            degrees_per_second,
        }
    }

    pub fn still() -> Self {
        Self::new(Vec3::Y, 0.0)
    }

    pub fn from_config(scene: &SceneConfig) -> Self {
        Self::new(Vec3::from_array(scene.spin_axis), scene.spin_degrees_per_second)
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    pub fn model(&self, elapsed: f64) -> Mat4 {
        // Wrap before narrowing so long sessions keep precision.
        let degrees = (elapsed * f64::from(self.degrees_per_second)).rem_euclid(360.0);
        Mat4::from_axis_angle(self.axis, (degrees as f32).to_radians())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_is_identity() {
        assert_eq!(Spin::still().model(12.5), Mat4::IDENTITY);
    }

    #[test]
    fn quarter_turn_after_two_seconds() {
        let spin = Spin::new(Vec3::Y, 45.0);
        let p = spin.model(2.0).transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn degenerate_axis_falls_back() {
        assert_eq!(Spin::new(Vec3::ZERO, 10.0).axis(), Vec3::Y);
        let spin = Spin::from_config(&SceneConfig::default());
        assert!((spin.axis().length() - 1.0).abs() < 1e-6);
    }
}
