//! Component type registry
//!
//! Maps the hashed type name to a factory that builds an empty container for
//! that type. The registry is filled in an explicit registration phase, then
//! shared read-only with every entity manager through an `Arc`.

use std::collections::HashMap;

use super::component::{Component, ComponentKind};
use super::error::EcsError;
use super::storage::{ComponentContainer, ComponentStore};
use crate::foundation::hash::HashId;

/// Builds an empty container for one component type
pub type ContainerFactory = fn() -> Box<dyn ComponentContainer>;

/// Registration record of one component type
#[derive(Debug, Clone)]
pub struct ComponentRegistration {
    /// Registered type name
    pub name: &'static str,
    /// Kind tag
    pub kind: ComponentKind,
    /// Container factory
    pub factory: ContainerFactory,
}

fn make_store<T: Component>() -> Box<dyn ComponentContainer> {
    Box::new(ComponentStore::<T>::new())
}

/// Name-keyed table of component types
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    entries: HashMap<HashId, ComponentRegistration>,
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in component type
    pub fn with_builtin_components() -> Result<Self, EcsError> {
        use super::components::{AnimationBufferComponent, AnimationComponent, Lifetime, MovementComponent};

        let mut registry = Self::new();
        registry.register::<AnimationComponent>()?;
        registry.register::<AnimationBufferComponent>()?;
        registry.register::<MovementComponent>()?;
        registry.register::<Lifetime>()?;
        Ok(registry)
    }

    /// Register `T` under its type name. Registering the same type twice is a
    /// no-op; a different name landing on an occupied key is an error.
    pub fn register<T: Component>(&mut self) -> Result<HashId, EcsError> {
        let key = HashId::of(T::NAME);
        if let Some(existing) = self.entries.get(&key) {
            if existing.name == T::NAME {
                return Ok(key);
            }
            return Err(EcsError::HashCollision {
                name: T::NAME.to_string(),
                existing: existing.name.to_string(),
                key,
            });
        }

        log::debug!("Registered component type {} ({})", T::NAME, key);
        self.entries.insert(
            key,
            ComponentRegistration {
                name: T::NAME,
                kind: T::KIND,
                factory: make_store::<T>,
            },
        );
        Ok(key)
    }

    /// Registration for a type name
    pub fn get(&self, name: &str) -> Option<&ComponentRegistration> {
        self.get_by_key(HashId::of(name))
    }

    /// Registration for a hashed type name
    pub fn get_by_key(&self, key: HashId) -> Option<&ComponentRegistration> {
        self.entries.get(&key)
    }

    /// Kind registered under `name`
    pub fn kind_of(&self, name: &str) -> Option<ComponentKind> {
        self.get(name).map(|entry| entry.kind)
    }

    /// Build an empty container for `name`
    pub fn create(&self, name: &str) -> Result<Box<dyn ComponentContainer>, EcsError> {
        self.get(name)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| EcsError::UnknownComponent(name.to_string()))
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
