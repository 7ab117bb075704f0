//! Frame orchestration.
//!
//! # Invariants
//! - Each frame runs in a fixed order: input, camera, model transform,
//!   clear, texture binds, uniform uploads, program bind, draws, present.
//! - Per-frame counters live in [`FrameState`], never on the orchestrator.
//! - Every resource handed to the orchestrator is released by
//!   [`FrameOrchestrator::shutdown`], including on a failed startup.

mod error;
mod orchestrator;
mod spin;
mod state;

pub use error::FrameError;
pub use orchestrator::{FrameControl, FrameOrchestrator, TextureBinding};
pub use spin::Spin;
pub use state::{FpsCounter, FpsSample, FrameState};

pub fn crate_info() -> &'static str {
    "meshrig-frame v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("frame"));
    }
}
