/// Change to apply to a [`Camera`](crate::Camera) for one update.
///
/// Translation amounts are along the camera's own axes at the moment the
/// delta is applied: `forward` along `front`, `up` along `up`, `lateral`
/// along `cross(front, up)`. Angles are in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraDelta {
    pub forward: f32,
    pub up: f32,
    pub lateral: f32,
    pub yaw: f32,
    pub pitch: f32,
    /// Added to the field of view.
    pub zoom: f32,
}

impl CameraDelta {
    pub const ZERO: Self = Self {
        forward: 0.0,
        up: 0.0,
        lateral: 0.0,
        yaw: 0.0,
        pitch: 0.0,
        zoom: 0.0,
    };

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    pub fn has_translation(&self) -> bool {
        self.forward != 0.0 || self.up != 0.0 || self.lateral != 0.0
    }

    pub fn has_rotation(&self) -> bool {
        self.yaw != 0.0 || self.pitch != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_zero() {
        assert!(CameraDelta::default().is_zero());
    }

    #[test]
    fn classifies_components() {
        let d = CameraDelta {
            yaw: 1.0,
            ..CameraDelta::ZERO
        };
        assert!(d.has_rotation());
        assert!(!d.has_translation());
        assert!(!d.is_zero());
    }
}
