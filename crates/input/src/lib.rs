//! Input mapping: per-frame keyboard/cursor snapshots in, camera deltas out.
//!
//! # Invariants
//! - Input never moves the camera while the window is unfocused.
//! - The first cursor sample after (re)acquisition only records a position.
//! - Snapshots are read-only; this crate never owns the event pump.
//!
//! A windowed front end forwards each winit `WindowEvent` to an
//! [`EventCollector`] and calls [`EventCollector::take_frame`] once per
//! redraw to get the [`FrameInput`] the frame loop consumes. The headless
//! CLI scripts its `FrameInput`s directly and skips this layer.

mod keys;
mod mapper;
pub mod platform;

pub use keys::{FrameInput, Key, KeyboardState};
pub use mapper::InputMapper;
pub use platform::EventCollector;

pub fn crate_info() -> &'static str {
    "meshrig-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
