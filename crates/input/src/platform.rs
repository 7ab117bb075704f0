//! winit adapter: accumulates window events into one [`FrameInput`] per frame.

use crate::keys::{FrameInput, Key, KeyboardState};
use glam::Vec2;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Pixels per scroll "line" for touchpads that report pixel deltas.
const PIXELS_PER_LINE: f64 = 40.0;

pub fn key_from_code(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

/// Event sink owned by the window loop.
#[derive(Debug, Clone)]
pub struct EventCollector {
    keyboard: KeyboardState,
    cursor: Vec2,
    scroll: f32,
    focused: bool,
    resized: Option<(u32, u32)>,
    close_requested: bool,
}

impl Default for EventCollector {
    fn default() -> Self {
        Self {
            keyboard: KeyboardState::new(),
            cursor: Vec2::ZERO,
            scroll: 0.0,
            focused: true,
            resized: None,
            close_requested: false,
        }
    }
}

impl EventCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => self.key(*code, *state),
            WindowEvent::CursorMoved { position, .. } => self.cursor_moved(*position),
            WindowEvent::MouseWheel { delta, .. } => self.scrolled(*delta),
            WindowEvent::Focused(focused) => self.focus_changed(*focused),
            WindowEvent::Resized(size) => self.resized(*size),
            WindowEvent::CloseRequested => self.close_requested = true,
            _ => {}
        }
    }

    pub fn key(&mut self, code: KeyCode, state: ElementState) {
        let Some(key) = key_from_code(code) else {
            return;
        };
        match state {
            ElementState::Pressed => self.keyboard.press(key),
            ElementState::Released => self.keyboard.release(key),
        }
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        self.cursor = Vec2::new(position.x as f32, position.y as f32);
    }

    pub fn scrolled(&mut self, delta: MouseScrollDelta) {
        self.scroll += match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
        };
    }

    /// Key releases are not delivered while unfocused, so held keys are dropped.
    pub fn focus_changed(&mut self, focused: bool) {
        if !focused {
            self.keyboard.clear();
        }
        self.focused = focused;
    }

    pub fn resized(&mut self, size: PhysicalSize<u32>) {
        self.resized = Some((size.width, size.height));
    }

    /// Snapshot for this frame. Scroll and resize are consumed; held keys,
    /// cursor, focus and a pending close carry over.
    pub fn take_frame(&mut self, dt: f32) -> FrameInput {
        FrameInput {
            keyboard: self.keyboard.clone(),
            cursor: self.cursor,
            scroll: std::mem::take(&mut self.scroll),
            focused: self.focused,
            resized: self.resized.take(),
            close_requested: self.close_requested,
            dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InputMapper;
    use meshrig_common::InputConfig;

    #[test]
    fn maps_bound_keys_only() {
        assert_eq!(key_from_code(KeyCode::ShiftLeft), Some(Key::LeftShift));
        assert_eq!(key_from_code(KeyCode::KeyQ), None);
    }

    #[test]
    fn collected_frames_drive_the_mapper() {
        let mut events = EventCollector::new();
        let mut mapper = InputMapper::new(&InputConfig::default());
        events.cursor_moved(PhysicalPosition::new(400.0, 300.0));
        assert!(mapper.update(&events.take_frame(0.016)).is_zero());

        events.key(KeyCode::KeyW, ElementState::Pressed);
        events.cursor_moved(PhysicalPosition::new(410.0, 300.0));
        let delta = mapper.update(&events.take_frame(0.016));
        assert!(delta.up > 0.0);
        assert!(delta.yaw > 0.0);
    }

    #[test]
    fn held_keys_persist_across_frames() {
        let mut events = EventCollector::new();
        events.key(KeyCode::KeyW, ElementState::Pressed);
        assert!(events.take_frame(0.016).keyboard.is_down(Key::W));
        assert!(events.take_frame(0.016).keyboard.is_down(Key::W));
        events.key(KeyCode::KeyW, ElementState::Released);
        assert!(!events.take_frame(0.016).keyboard.is_down(Key::W));
    }

    #[test]
    fn scroll_and_resize_are_consumed() {
        let mut events = EventCollector::new();
        events.scrolled(MouseScrollDelta::LineDelta(0.0, 1.0));
        events.scrolled(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0)));
        events.resized(PhysicalSize::new(1024, 768));

        let frame = events.take_frame(0.0);
        assert_eq!(frame.scroll, 2.0);
        assert_eq!(frame.resized, Some((1024, 768)));

        let frame = events.take_frame(0.0);
        assert_eq!(frame.scroll, 0.0);
        assert_eq!(frame.resized, None);
    }

    #[test]
    fn losing_focus_drops_held_keys() {
        let mut events = EventCollector::new();
        events.key(KeyCode::Space, ElementState::Pressed);
        events.focus_changed(false);
        let frame = events.take_frame(0.0);
        assert!(!frame.focused);
        assert!(!frame.keyboard.is_down(Key::Space));
    }

    #[test]
    fn close_request_is_sticky() {
        let mut events = EventCollector::new();
        events.handle_window_event(&WindowEvent::CloseRequested);
        assert!(events.take_frame(0.0).wants_exit());
        assert!(events.take_frame(0.0).wants_exit());
    }
}
