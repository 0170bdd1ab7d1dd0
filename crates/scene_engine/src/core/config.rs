//! # Engine Configuration
//!
//! Configuration for engine behavior and the scene data layer.
//!
//! ## Configuration Categories
//!
//! - **Engine Config**: logging, debug features and the headless frame limit
//! - **Scene Config**: initial capacities and the default scene file
//! - **Application Config**: the two above plus the application name

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// # Engine Configuration
///
/// Core engine behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Log filter handed to `env_logger` (`"info"`, `"scene_engine=debug"`, ...)
    pub log_level: String,
    /// Whether to enable debug features
    pub debug_mode: bool,
    /// Stop the frame loop after this many frames (`None` runs until the
    /// application requests exit)
    pub max_frames: Option<u64>,
    /// Fixed frame delta in seconds; `None` samples the wall clock
    pub fixed_delta: Option<f32>,
}

impl EngineConfig {
    /// Create a new engine configuration
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            debug_mode: cfg!(debug_assertions),
            max_frames: None,
            fixed_delta: None,
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

    /// Limit the number of frames the loop runs
    pub fn with_max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Step every frame by a fixed delta
    pub fn with_fixed_delta(mut self, delta: f32) -> Self {
        self.fixed_delta = Some(delta);
        self
    }

    /// Validate engine settings
    pub fn validate(&self) -> Result<(), String> {
        if self.log_level.trim().is_empty() {
            return Err("Log level cannot be empty".to_string());
        }
        if let Some(delta) = self.fixed_delta {
            if !(delta.is_finite() && delta > 0.0) {
                return Err(format!("Fixed delta must be positive, got {}", delta));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Scene Configuration
///
/// Sizing hints for the entity manager and the default scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Entity and node slots reserved up front
    pub initial_capacity: usize,
    /// Scene file loaded at startup and written on save, if any
    pub scene_path: Option<String>,
}

impl SceneConfig {
    /// Create a new scene configuration
    pub fn new() -> Self {
        Self {
            initial_capacity: 256,
            scene_path: None,
        }
    }

    /// Set the reserved capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Set the default scene file
    pub fn with_scene_path(mut self, path: impl Into<String>) -> Self {
        self.scene_path = Some(path.into());
        self
    }

    /// Validate scene settings
    pub fn validate(&self) -> Result<(), String> {
        if let Some(path) = &self.scene_path {
            if !path.ends_with(".json") {
                return Err(format!("Scene files are JSON documents: {}", path));
            }
        }
        Ok(())
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// # Application Configuration
///
/// Top-level configuration loaded by applications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    /// Application name used in log output
    pub name: String,
    /// Engine settings
    pub engine: EngineConfig,
    /// Scene settings
    pub scene: SceneConfig,
}

impl ApplicationConfig {
    /// Create application config with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine: EngineConfig::default(),
            scene: SceneConfig::default(),
        }
    }

    /// Replace the engine settings
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Replace the scene settings
    pub fn with_scene(mut self, scene: SceneConfig) -> Self {
        self.scene = scene;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Application name cannot be empty".to_string());
        }
        self.engine.validate()?;
        self.scene.validate()?;
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self::new("Scene Engine Application")
    }
}

impl Config for ApplicationConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_defaults_validate() {
        assert!(ApplicationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let config = ApplicationConfig::new("demo")
            .with_engine(EngineConfig::new().with_fixed_delta(0.0));
        assert!(config.validate().is_err());

        let config = ApplicationConfig::new("demo")
            .with_scene(SceneConfig::new().with_scene_path("scene.ron"));
        assert!(config.validate().is_err());

        assert!(ApplicationConfig::new("").validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ApplicationConfig::new("demo")
            .with_engine(EngineConfig::new().with_log_level("debug").with_max_frames(10))
            .with_scene(SceneConfig::new().with_capacity(64).with_scene_path("scene.json"));

        let text = config.to_string_as(ConfigFormat::Toml).expect("serialize");
        let loaded = ApplicationConfig::from_str_as(&text, ConfigFormat::Toml).expect("parse");

        assert_eq!(loaded.name, "demo");
        assert_eq!(loaded.engine.log_level, "debug");
        assert_eq!(loaded.engine.max_frames, Some(10));
        assert_eq!(loaded.scene.initial_capacity, 64);
        assert_eq!(loaded.scene.scene_path.as_deref(), Some("scene.json"));
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let loaded = ApplicationConfig::from_str_as("(name: \"partial\")", ConfigFormat::Ron).expect("parse");
        assert_eq!(loaded.name, "partial");
        assert_eq!(loaded.scene.initial_capacity, 256);
    }
}
