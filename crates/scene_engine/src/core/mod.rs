//! # Core Engine Module
//!
//! Shared configuration structures used by the encoder, the runtime camera
//! and the command-line tools.

pub mod config;

// Re-export commonly used config types
pub use config::{
    ApplicationConfig,
    CameraConfig,
    EncoderConfig,
    EngineConfig,
};
pub use crate::config::{Config, ConfigError, ConfigFormat};
