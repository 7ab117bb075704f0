use glam::Vec2;
use std::collections::BTreeSet;

/// Keys the rig reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    W,
    A,
    S,
    D,
    Space,
    LeftShift,
    Escape,
}

/// Set of keys held down at the moment of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardState {
    down: BTreeSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot with exactly `keys` held.
    pub fn with(keys: &[Key]) -> Self {
        Self {
            down: keys.iter().copied().collect(),
        }
    }

    pub fn press(&mut self, key: Key) {
        self.down.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.down.remove(&key);
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down.contains(&key)
    }

    /// +1 when only `positive` is held, -1 when only `negative` is, else 0.
    pub fn axis(&self, positive: Key, negative: Key) -> f32 {
        match (self.is_down(positive), self.is_down(negative)) {
            (true, false) => 1.0,
            (false, true) => -1.0,
            _ => 0.0,
        }
    }

    /// Drop every held key, e.g. when focus is lost.
    pub fn clear(&mut self) {
        self.down.clear();
    }
}

/// Everything the window reported for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameInput {
    pub keyboard: KeyboardState,
    /// Absolute cursor position in window pixels, Y growing downward.
    pub cursor: Vec2,
    /// Vertical scroll since the previous frame.
    pub scroll: f32,
    pub focused: bool,
    /// New framebuffer size, if it changed this frame.
    pub resized: Option<(u32, u32)>,
    /// The window asked to close.
    pub close_requested: bool,
    /// Seconds since the previous frame.
    pub dt: f32,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            keyboard: KeyboardState::new(),
            cursor: Vec2::ZERO,
            scroll: 0.0,
            focused: true,
            resized: None,
            close_requested: false,
            dt: 0.0,
        }
    }
}

impl FrameInput {
    /// Close was requested by the window, or Escape is held while focused.
    pub fn wants_exit(&self) -> bool {
        self.close_requested || (self.focused && self.keyboard.is_down(Key::Escape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_cancels_when_both_held() {
        let keys = KeyboardState::with(&[Key::W, Key::S]);
        assert_eq!(keys.axis(Key::W, Key::S), 0.0);
        let keys = KeyboardState::with(&[Key::S]);
        assert_eq!(keys.axis(Key::W, Key::S), -1.0);
    }

    #[test]
    fn press_release() {
        let mut keys = KeyboardState::new();
        keys.press(Key::Space);
        assert!(keys.is_down(Key::Space));
        keys.release(Key::Space);
        assert!(!keys.is_down(Key::Space));
    }

    #[test]
    fn escape_only_exits_when_focused() {
        let mut input = FrameInput {
            keyboard: KeyboardState::with(&[Key::Escape]),
            ..FrameInput::default()
        };
        assert!(input.wants_exit());
        input.focused = false;
        assert!(!input.wants_exit());
        input.close_requested = true;
        assert!(input.wants_exit());
    }
}
