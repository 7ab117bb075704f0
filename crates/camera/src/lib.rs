//! Camera state and math.
//!
//! # Invariants
//! - Pitch never leaves [-89, 89] degrees, so the up vector never flips.
//! - Field of view never leaves [1, 90] degrees.
//! - `front`, `right`, `up` are unit vectors recomputed on every orientation change.
//! - Aspect ratio is always finite and positive.

mod camera;
mod delta;

pub use camera::Camera;
pub use delta::CameraDelta;

pub fn crate_info() -> &'static str {
    "meshrig-camera v0.1.0"
}
