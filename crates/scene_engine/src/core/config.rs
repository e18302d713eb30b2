//! # Unified Configuration System
//!
//! Configuration structures for the engine, the scene encoder, and the
//! default runtime camera. Everything here is serde-serializable and can be
//! loaded from TOML or RON through the [`Config`] trait.

use serde::{Serialize, Deserialize};

pub use crate::config::{Config, ConfigError};
use crate::scene::{Camera, CameraError};

/// # Engine Configuration
///
/// Core behaviour shared by every tool: logging and debug features.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log level for the engine
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable debug mode
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug_mode = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Encoder Configuration
///
/// Controls what the scene encoder emits next to the binary container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Also write the human-readable text form
    pub write_text_dump: bool,
    /// Spaces per nesting level in the text form
    pub text_indent: usize,
    /// Append the id/offset reference table and record it in the header
    pub write_reference_table: bool,
}

impl EncoderConfig {
    /// Create a new encoder configuration
    pub fn new() -> Self {
        Self {
            write_text_dump: false,
            text_indent: 2,
            write_reference_table: true,
        }
    }

    /// Enable or disable the text dump
    pub fn with_text_dump(mut self, enabled: bool) -> Self {
        self.write_text_dump = enabled;
        self
    }

    /// Set the text indent width
    pub fn with_text_indent(mut self, indent: usize) -> Self {
        self.text_indent = indent;
        self
    }
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Camera Configuration
///
/// Default perspective camera parameters. Field of view is in degrees.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    /// Viewport width / height
    pub aspect_ratio: f32,
    /// Near clipping plane distance
    pub near_plane: f32,
    /// Far clipping plane distance
    pub far_plane: f32,
}

impl CameraConfig {
    /// Validate by building the camera the configuration describes
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_perspective()
            .map(|_| ())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Build a perspective camera from this configuration
    pub fn build_perspective(&self) -> Result<Camera, CameraError> {
        Camera::perspective(self.field_of_view, self.aspect_ratio, self.near_plane, self.far_plane)
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            field_of_view: 45.0,
            aspect_ratio: 16.0 / 9.0,
            near_plane: 0.1,
            far_plane: 1000.0,
        }
    }
}

/// # Complete Application Configuration
///
/// Top-level configuration that encompasses all engine subsystems.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Engine core configuration
    pub engine: EngineConfig,
    /// Scene encoder configuration
    pub encoder: EncoderConfig,
    /// Default camera configuration
    pub camera: CameraConfig,
}

impl ApplicationConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera.validate()
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_default_config_is_valid() {
        let config = ApplicationConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.encoder.write_reference_table);
    }

    #[test]
    fn test_invalid_camera_config_rejected() {
        let mut config = ApplicationConfig::default();
        config.camera.near_plane = 10.0;
        config.camera.far_plane = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ApplicationConfig {
            engine: EngineConfig::new().with_log_level("debug"),
            encoder: EncoderConfig::new().with_text_dump(true).with_text_indent(4),
            camera: CameraConfig::default(),
        };

        let text = config.to_string_with_format(ConfigFormat::Toml).unwrap();
        let parsed = ApplicationConfig::from_str_with_format(&text, ConfigFormat::Toml).unwrap();

        assert_eq!(parsed.engine.log_level, "debug");
        assert!(parsed.encoder.write_text_dump);
        assert_eq!(parsed.encoder.text_indent, 4);
    }

    #[test]
    fn test_ron_partial_uses_defaults() {
        let text = "(encoder: (write_text_dump: true))";
        let parsed = ApplicationConfig::from_str_with_format(text, ConfigFormat::Ron).unwrap();

        assert!(parsed.encoder.write_text_dump);
        assert_eq!(parsed.encoder.text_indent, 2);
        assert_eq!(parsed.engine.log_level, "info");
    }

    #[test]
    fn test_unsupported_extension() {
        let result = ConfigFormat::from_path(std::path::Path::new("settings.json"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
