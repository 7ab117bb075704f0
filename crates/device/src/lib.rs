//! Device layer: the graphics capability the renderer calls into, plus the
//! ownership rules for the native objects it hands out.
//!
//! # Invariants
//! - Every native object is owned by exactly one [`ResourceHandle`].
//! - A handle is released at most once; releasing again is a no-op.
//! - A handle dropped while live is reported as a leak exactly once and its
//!   native object is queued for deletion at the next [`ResourceTracker::reclaim`].

mod device;
mod glsl;
mod gpu;
mod handle;
mod headless;

pub use device::{
    ActiveUniform, BufferTarget, ClearMask, DeviceError, DeviceInfo, Filter, GraphicsDevice,
    PrimitiveMode, TextureParam, UniformLocation, WrapMode,
};
pub use gpu::Gpu;
pub use handle::{LeakRecord, LeakReport, ResourceHandle, ResourceTracker};
pub use headless::{
    AttribPointer, DeviceCall, DrawCall, HeadlessDevice, TextureObject, UniformValue,
    VertexArrayObject,
};

pub fn crate_info() -> &'static str {
    "meshrig-device v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("device"));
    }
}
