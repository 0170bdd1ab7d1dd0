//! Application trait and lifecycle management

use crate::ecs::System;
use crate::engine::{Engine, EngineError};
use thiserror::Error;

/// Application lifecycle trait
///
/// Implement this trait to drive the engine from your own code.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is created and before any system runs.
    /// Use this to register resources, create entities or load a scene.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Systems the application wants run every frame.
    ///
    /// Called once after [`Application::initialize`]. These run before the
    /// engine's built-in systems, in the order returned.
    fn systems(&mut self) -> Vec<Box<dyn System>> {
        Vec::new()
    }

    /// Update the application
    ///
    /// Called every frame before the systems run.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Time since last frame in seconds
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Cleanup the application
    ///
    /// Called once when the loop ends, before systems shut down.
    fn cleanup(&mut self, engine: &mut Engine);
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Entity layer error
    #[error("Entity error: {0}")]
    Ecs(#[from] crate::ecs::EcsError),

    /// Scene file error
    #[error("Scene file error: {0}")]
    Persistence(#[from] crate::ecs::PersistenceError),

    /// Resource registration error
    #[error("Resource error: {0}")]
    Resource(#[from] crate::assets::ResourceError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
