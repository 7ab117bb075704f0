//! Shared value types for the meshrig workspace.
//!
//! # Invariants
//! - Types here carry no device state; they are plain values.
//! - Configuration is fully defaulted so an empty file is valid.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, ConfigError, InputConfig, RigConfig, SceneConfig, WindowConfig,
};
pub use types::{
    DecodedImage, MovementPolicy, NativeId, ResourceKind, ShaderStage, VertexAttribute,
    VertexLayout,
};

pub fn crate_info() -> &'static str {
    "meshrig-common v0.1.0"
}
