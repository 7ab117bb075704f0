use crate::keys::{FrameInput, Key};
use glam::Vec2;
use meshrig_camera::CameraDelta;
use meshrig_common::{InputConfig, MovementPolicy};

/// Turns frame input into a [`CameraDelta`].
///
/// Bindings: Space / LeftShift move along `front`, W / S along `up`,
/// A / D along `cross(front, up)`. Cursor X drives yaw, cursor Y drives
/// pitch inverted (screen Y grows downward), scroll drives zoom.
#[derive(Debug, Clone)]
pub struct InputMapper {
    speed: f32,
    sensitivity: f32,
    zoom_sensitivity: f32,
    policy: MovementPolicy,
    first_sample: bool,
    had_focus: bool,
    last_cursor: Vec2,
}

impl InputMapper {
    pub fn new(config: &InputConfig) -> Self {
        Self {
            speed: config.speed,
            sensitivity: config.sensitivity,
            zoom_sensitivity: config.zoom_sensitivity,
            policy: config.movement,
            first_sample: true,
            had_focus: false,
            last_cursor: Vec2::ZERO,
        }
    }

    pub fn policy(&self) -> MovementPolicy {
        self.policy
    }

    /// Cursor capture was (re)acquired: the next sample only records a position.
    pub fn reacquire(&mut self) {
        self.first_sample = true;
    }

    pub fn update(&mut self, input: &FrameInput) -> CameraDelta {
        if !input.focused {
            self.had_focus = false;
            return CameraDelta::ZERO;
        }
        if !self.had_focus {
            self.had_focus = true;
            self.first_sample = true;
        }

        if self.first_sample {
            self.first_sample = false;
            self.last_cursor = input.cursor;
            tracing::trace!("cursor acquired at {}", input.cursor);
            return CameraDelta::ZERO;
        }

        let step = match self.policy {
            MovementPolicy::PerTick => self.speed,
            MovementPolicy::PerSecond => self.speed * input.dt.max(0.0),
        };
        let keys = &input.keyboard;
        let moved = input.cursor - self.last_cursor;
        self.last_cursor = input.cursor;

        CameraDelta {
            forward: keys.axis(Key::Space, Key::LeftShift) * step,
            up: keys.axis(Key::W, Key::S) * step,
            lateral: keys.axis(Key::A, Key::D) * step,
            yaw: moved.x * self.sensitivity,
            pitch: -moved.y * self.sensitivity,
            zoom: -input.scroll * self.zoom_sensitivity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::KeyboardState;

    fn focused(cursor: Vec2, keys: &[Key]) -> FrameInput {
        FrameInput {
            keyboard: KeyboardState::with(keys),
            cursor,
            ..FrameInput::default()
        }
    }

    fn primed(config: &InputConfig) -> InputMapper {
        let mut mapper = InputMapper::new(config);
        mapper.update(&focused(Vec2::ZERO, &[]));
        mapper
    }

    #[test]
    fn unfocused_input_is_ignored() {
        let mut mapper = primed(&InputConfig::default());
        let input = FrameInput {
            focused: false,
            scroll: 3.0,
            ..focused(Vec2::new(500.0, 500.0), &[Key::W, Key::Space, Key::A])
        };
        assert!(mapper.update(&input).is_zero());
    }

    #[test]
    fn first_sample_only_records_cursor() {
        let mut mapper = InputMapper::new(&InputConfig::default());
        let first = mapper.update(&focused(Vec2::new(400.0, 300.0), &[]));
        assert!(first.is_zero());

        let second = mapper.update(&focused(Vec2::new(410.0, 295.0), &[]));
        assert!((second.yaw - 2.0).abs() < 1e-6);
        assert!((second.pitch - 1.0).abs() < 1e-6);
    }

    #[test]
    fn reacquire_rearms_first_sample() {
        let mut mapper = primed(&InputConfig::default());
        mapper.reacquire();
        assert!(mapper.update(&focused(Vec2::new(900.0, 900.0), &[])).is_zero());
        let next = mapper.update(&focused(Vec2::new(901.0, 900.0), &[]));
        assert!(next.yaw > 0.0);
    }

    #[test]
    fn regaining_focus_rearms_first_sample() {
        let mut mapper = primed(&InputConfig::default());
        let lost = FrameInput {
            focused: false,
            ..FrameInput::default()
        };
        mapper.update(&lost);
        // Cursor jumped while unfocused; no spurious rotation.
        assert!(mapper.update(&focused(Vec2::new(640.0, 10.0), &[])).is_zero());
    }

    #[test]
    fn keys_map_to_camera_axes_per_tick() {
        let config = InputConfig::default();
        let mut mapper = primed(&config);
        let delta = mapper.update(&focused(Vec2::ZERO, &[Key::Space, Key::S, Key::A]));
        assert_eq!(delta.forward, config.speed);
        assert_eq!(delta.up, -config.speed);
        assert_eq!(delta.lateral, config.speed);
        assert!(!delta.has_rotation());
    }

    #[test]
    fn per_second_policy_scales_by_dt() {
        let config = InputConfig {
            speed: 2.0,
            movement: MovementPolicy::PerSecond,
            ..InputConfig::default()
        };
        let mut mapper = primed(&config);
        let input = FrameInput {
            dt: 0.5,
            ..focused(Vec2::ZERO, &[Key::LeftShift])
        };
        assert_eq!(mapper.update(&input).forward, -1.0);
    }

    #[test]
    fn scroll_up_narrows_fov() {
        let mut mapper = primed(&InputConfig::default());
        let input = FrameInput {
            scroll: 2.0,
            ..focused(Vec2::ZERO, &[])
        };
        assert_eq!(mapper.update(&input).zoom, -2.0);
    }
}
