//! # Core Engine Module
//!
//! Shared abstractions used by every subsystem.
//!
//! ## Organization
//!
//! - **Config**: configuration for the engine loop and the scene data layer

pub mod config;

pub use config::{ApplicationConfig, Config, ConfigError, EngineConfig, SceneConfig};
