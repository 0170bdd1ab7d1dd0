//! Entity-Component-System implementation
//!
//! Entities are dense ids backed by scene graph nodes. Components live in one
//! dense store per type, created on demand from the component registry.
//! Systems run once per frame over the entities matching their component
//! signature.

pub mod component;
pub mod components;
pub mod entity;
pub mod entity_manager;
pub mod error;
pub mod persistence;
pub mod registry;
pub mod storage;
pub mod system;
pub mod system_manager;
pub mod systems;

#[cfg(test)]
mod tests;

pub use component::{Component, ComponentData, ComponentKind};
pub use entity::{EntityId, EntityView};
pub use entity_manager::EntityManager;
pub use error::{EcsError, PersistenceError};
pub use persistence::{EntityRecord, LoadSummary, SceneDocument, SkippedComponent};
pub use registry::{ComponentRegistration, ComponentRegistry};
pub use storage::{ComponentContainer, ComponentStore};
pub use system::{System, SystemContext};
pub use system_manager::SystemManager;
