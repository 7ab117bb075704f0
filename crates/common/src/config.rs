//! YAML configuration for a rig session.
//!
//! Every section and field has a default, so a partial file only overrides
//! what it names.

use crate::types::MovementPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "meshrig".into(),
            width: 800,
            height: 600,
        }
    }
}

/// Initial camera placement. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub yaw: f32,
    pub pitch: f32,
    pub fov: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 3.0],
            yaw: -90.0,
            pitch: 0.0,
            fov: 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Units per tick, or per second under [`MovementPolicy::PerSecond`].
    pub speed: f32,
    /// Degrees of rotation per pixel of cursor travel.
    pub sensitivity: f32,
    /// Degrees of field of view per scroll step.
    pub zoom_sensitivity: f32,
    pub movement: MovementPolicy,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            speed: 0.05,
            sensitivity: 0.2,
            zoom_sensitivity: 1.0,
            movement: MovementPolicy::PerTick,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub clear_color: [f32; 4],
    /// Enable depth testing at startup. Needed for any non-flat scene.
    pub depth_test: bool,
    pub spin_axis: [f32; 3],
    pub spin_degrees_per_second: f32,
    /// Uploaded to a `color` uniform at startup, if the program declares one.
    pub flat_color: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.2, 0.6, 0.1, 1.0],
            depth_test: true,
            spin_axis: [0.5, 1.0, 0.0],
            spin_degrees_per_second: 45.0,
            flat_color: [1.0, 0.5, 0.2],
        }
    }
}

/// Top-level session configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub input: InputConfig,
    pub scene: SceneConfig,
}

impl RigConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RigConfig = if text.trim().is_empty() {
            RigConfig::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if !(self.input.speed.is_finite() && self.input.speed >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "input.speed must be a non-negative number, got {}",
                self.input.speed
            )));
        }
        if !self.input.sensitivity.is_finite() {
            return Err(ConfigError::Invalid("input.sensitivity must be finite".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        let config = RigConfig::from_yaml_str("").unwrap();
        assert_eq!(config, RigConfig::default());
    }

    #[test]
    fn partial_document_overrides_named_fields() {
        let yaml = "input:\n  speed: 2.5\n  movement: per_second\nwindow:\n  title: demo\n";
        let config = RigConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.input.speed, 2.5);
        assert_eq!(config.input.movement, MovementPolicy::PerSecond);
        assert_eq!(config.input.sensitivity, 0.2);
        assert_eq!(config.window.title, "demo");
        assert_eq!(config.window.width, 800);
    }

    #[test]
    fn zero_window_rejected() {
        let err = RigConfig::from_yaml_str("window:\n  height: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_yaml_is_yaml_error() {
        let err = RigConfig::from_yaml_str("window: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "scene:\n  depth_test: false\n  flat_color: [0.0, 0.25, 1.0]").unwrap();
        let config = RigConfig::load(file.path()).unwrap();
        assert!(!config.scene.depth_test);
        assert_eq!(config.scene.flat_color, [0.0, 0.25, 1.0]);
        assert_eq!(config.scene.spin_degrees_per_second, 45.0);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RigConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
