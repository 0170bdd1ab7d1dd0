//! Animation bindings
//!
//! Entities using an animated mesh are registered with an
//! [`AnimationRegistrar`] when they are created from a scene file, so the
//! animation side can allocate playback state for them.

use std::collections::BTreeMap;

use crate::ecs::EntityId;
use crate::foundation::hash::HashId;

/// Receives entities that use an animated mesh
pub trait AnimationRegistrar {
    /// Bind `entity` to the animated mesh `mesh`
    fn register_entity(&mut self, entity: EntityId, mesh: HashId);

    /// Drop the binding of `entity`, if any
    fn unregister_entity(&mut self, entity: EntityId);
}

/// Entity → animated mesh bindings
#[derive(Debug, Default)]
pub struct AnimationManager {
    bindings: BTreeMap<EntityId, HashId>,
}

impl AnimationManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesh bound to `entity`
    pub fn mesh_of(&self, entity: EntityId) -> Option<HashId> {
        self.bindings.get(&entity).copied()
    }

    /// Whether `entity` is bound
    pub fn is_registered(&self, entity: EntityId) -> bool {
        self.bindings.contains_key(&entity)
    }

    /// Bound entities in id order
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.bindings.keys().copied()
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing is bound
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl AnimationRegistrar for AnimationManager {
    fn register_entity(&mut self, entity: EntityId, mesh: HashId) {
        log::debug!("Animation binding {} -> {}", entity, mesh);
        self.bindings.insert(entity, mesh);
    }

    fn unregister_entity(&mut self, entity: EntityId) {
        self.bindings.remove(&entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let mut animations = AnimationManager::new();
        let mesh = HashId::of("Soldier");

        animations.register_entity(EntityId(3), mesh);
        assert_eq!(animations.mesh_of(EntityId(3)), Some(mesh));
        assert_eq!(animations.len(), 1);

        animations.unregister_entity(EntityId(3));
        assert!(animations.is_empty());
    }
}
