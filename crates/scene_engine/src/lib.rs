//! # Scene Engine
//!
//! The data core of a real-time 3D engine: entities backed by a scene graph,
//! typed component stores created from a component registry, per-frame
//! systems and JSON scene files.
//!
//! ## Features
//!
//! - **Scene Graph**: parent-linked transforms with cached world matrices
//! - **ECS**: dense component stores, signature queries, recycled entity ids
//! - **Persistence**: JSON scene files with per-component blocks
//! - **Systems**: ordered pre-update / update / post-update phases
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scene_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         engine.entities.create_entity(None, "player", None, None, &Transform::identity())?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         if engine.timer().frame_count() > 100 {
//!             engine.quit();
//!         }
//!         Ok(())
//!     }
//!
//!     fn cleanup(&mut self, _engine: &mut Engine) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = Arc::new(ComponentRegistry::with_builtin_components()?);
//!     let mut app = MyApp;
//!     Engine::run(ApplicationConfig::default(), registry, &mut app)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod config;
pub mod core;
pub mod ecs;
pub mod foundation;
pub mod scene;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineConfig, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        animation::{AnimationManager, AnimationRegistrar},
        assets::{MeshInfo, ResourceManager, ResourceProvider},
        core::config::{ApplicationConfig, Config, SceneConfig},
        ecs::{
            components::{AnimationBufferComponent, AnimationComponent, Lifetime, MovementComponent},
            Component, ComponentData, ComponentKind, ComponentRegistry, EcsError, EntityId, EntityManager,
            EntityView, System, SystemContext, SystemManager,
        },
        foundation::{
            hash::{string_id, HashId},
            math::{Mat4, Transform, Vec3},
            time::Timer,
        },
        scene::{NodeId, SceneGraph},
        AppError, Application, Engine, EngineConfig, EngineError,
    };
}
