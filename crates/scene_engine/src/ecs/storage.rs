//! Dense per-type component storage
//!
//! A `ComponentStore<T>` keeps components and their owning entities in two
//! aligned vectors plus an entity → slot map, so iteration is a linear walk
//! and lookup is a hash probe. Removal shifts later entries down and
//! re-indexes them, which keeps the vectors packed and in insertion order.
//!
//! The entity manager only sees stores through the object-safe
//! [`ComponentContainer`] trait.

use std::any::Any;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::component::{Component, ComponentData, ComponentKind};
use super::entity::EntityId;
use super::error::EcsError;

/// Whole-store serialized form: `{"Entities": [...], "Components": [...]}`
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SnapshotRef<'a, T> {
    entities: Vec<u32>,
    components: &'a [T],
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Snapshot<T> {
    entities: Vec<u32>,
    components: Vec<T>,
}

/// Storage for every component of one type
#[derive(Debug, Clone)]
pub struct ComponentStore<T> {
    components: Vec<T>,
    entities: Vec<EntityId>,
    index: HashMap<EntityId, usize>,
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            entities: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: Component> ComponentStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `value` to `entity`.
    ///
    /// An entity already in the store has its value overwritten in place and
    /// the previous value is returned.
    pub fn add_entity(&mut self, entity: EntityId, value: T) -> Option<T> {
        if let Some(&slot) = self.index.get(&entity) {
            return Some(std::mem::replace(&mut self.components[slot], value));
        }
        self.index.insert(entity, self.components.len());
        self.entities.push(entity);
        self.components.push(value);
        None
    }

    /// Detach `entity`, returning its value. Absent entities are a no-op.
    pub fn remove_entity(&mut self, entity: EntityId) -> Option<T> {
        let slot = self.index.remove(&entity)?;
        self.entities.remove(slot);
        let value = self.components.remove(slot);
        for (i, moved) in self.entities.iter().enumerate().skip(slot) {
            self.index.insert(*moved, i);
        }
        Some(value)
    }

    /// Component of `entity`
    pub fn get(&self, entity: EntityId) -> Option<&T> {
        self.index.get(&entity).map(|&slot| &self.components[slot])
    }

    /// Mutable component of `entity`
    pub fn get_mut(&mut self, entity: EntityId) -> Option<&mut T> {
        match self.index.get(&entity) {
            Some(&slot) => Some(&mut self.components[slot]),
            None => None,
        }
    }

    /// Whether `entity` has a component here
    pub fn contains(&self, entity: EntityId) -> bool {
        self.index.contains_key(&entity)
    }

    /// Dense slot of `entity`
    pub fn index_of(&self, entity: EntityId) -> Option<usize> {
        self.index.get(&entity).copied()
    }

    /// Owning entities, aligned with [`Self::components`]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    /// Component values, aligned with [`Self::entities`]
    pub fn components(&self) -> &[T] {
        &self.components
    }

    /// Iterate `(entity, component)` pairs in storage order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entities.iter().copied().zip(self.components.iter())
    }

    /// Iterate `(entity, component)` pairs mutably in storage order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entities.iter().copied().zip(self.components.iter_mut())
    }

    /// Number of stored components
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.components.clear();
        self.entities.clear();
        self.index.clear();
    }

    fn encode<V: Serialize + ?Sized>(value: &V) -> Result<Value, EcsError> {
        serde_json::to_value(value).map_err(|source| EcsError::Serialization {
            component: T::NAME,
            source,
        })
    }

    fn decode<V: serde::de::DeserializeOwned>(value: &Value) -> Result<V, EcsError> {
        V::deserialize(value).map_err(|source| EcsError::Serialization {
            component: T::NAME,
            source,
        })
    }

    /// Serialize the component of `entity`; `None` when absent
    pub fn serialize_entity(&self, entity: EntityId) -> Result<Option<Value>, EcsError> {
        self.get(entity).map(Self::encode).transpose()
    }

    /// Decode `value` and attach it to `entity`
    pub fn deserialize_entity(&mut self, entity: EntityId, value: &Value) -> Result<(), EcsError> {
        let component: T = Self::decode(value)?;
        self.add_entity(entity, component);
        Ok(())
    }

    /// Serialize the whole store
    pub fn serialize_all(&self) -> Result<Value, EcsError> {
        Self::encode(&SnapshotRef {
            entities: self.entities.iter().map(|e| e.0).collect(),
            components: &self.components,
        })
    }

    /// Replace the whole store from a serialized snapshot.
    ///
    /// The store is left untouched when the snapshot does not decode.
    /// Repeated entity ids keep their first entry.
    pub fn deserialize_all(&mut self, value: &Value) -> Result<(), EcsError> {
        let snapshot: Snapshot<T> = Self::decode(value)?;
        if snapshot.entities.len() != snapshot.components.len() {
            return Err(EcsError::Serialization {
                component: T::NAME,
                source: <serde_json::Error as serde::de::Error>::custom(format!(
                    "{} entities but {} components",
                    snapshot.entities.len(),
                    snapshot.components.len()
                )),
            });
        }

        let mut rebuilt = Self::new();
        for (id, component) in snapshot.entities.into_iter().zip(snapshot.components) {
            let entity = EntityId(id);
            if rebuilt.contains(entity) {
                log::warn!("{}: dropping repeated entry for {}", T::NAME, entity);
                continue;
            }
            rebuilt.add_entity(entity, component);
        }
        *self = rebuilt;
        Ok(())
    }
}

/// Type-erased view of a component store
pub trait ComponentContainer: Any {
    /// Kind of component held
    fn kind(&self) -> ComponentKind;

    /// Registered type name
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Attach a component to `entity`; `None` attaches the default value
    fn add_entity(&mut self, entity: EntityId, data: Option<ComponentData>) -> Result<(), EcsError>;

    /// Detach `entity`; returns whether it was present
    fn remove_entity(&mut self, entity: EntityId) -> bool;

    /// Whether `entity` has a component here
    fn contains(&self, entity: EntityId) -> bool;

    /// Owning entities in storage order
    fn entities(&self) -> &[EntityId];

    /// Number of stored components
    fn len(&self) -> usize;

    /// Whether the container is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy of the component of `entity`
    fn data(&self, entity: EntityId) -> Option<ComponentData>;

    /// Serialize the component of `entity`
    fn serialize_entity(&self, entity: EntityId) -> Result<Option<Value>, EcsError>;

    /// Decode and attach a component to `entity`
    fn deserialize_entity(&mut self, entity: EntityId, value: &Value) -> Result<(), EcsError>;

    /// Serialize every entry
    fn serialize_all(&self) -> Result<Value, EcsError>;

    /// Replace every entry from a snapshot
    fn deserialize_all(&mut self, value: &Value) -> Result<(), EcsError>;

    /// Drop every entry
    fn clear(&mut self);

    /// Downcast support
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast support
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Component> ComponentContainer for ComponentStore<T> {
    fn kind(&self) -> ComponentKind {
        T::KIND
    }

    fn add_entity(&mut self, entity: EntityId, data: Option<ComponentData>) -> Result<(), EcsError> {
        let value = match data {
            None => T::default(),
            Some(data) => {
                let found = data.kind();
                T::from_data(data).ok_or(EcsError::ComponentKindMismatch {
                    expected: T::KIND,
                    found,
                })?
            }
        };
        ComponentStore::add_entity(self, entity, value);
        Ok(())
    }

    fn remove_entity(&mut self, entity: EntityId) -> bool {
        ComponentStore::remove_entity(self, entity).is_some()
    }

    fn contains(&self, entity: EntityId) -> bool {
        ComponentStore::contains(self, entity)
    }

    fn entities(&self) -> &[EntityId] {
        ComponentStore::entities(self)
    }

    fn len(&self) -> usize {
        ComponentStore::len(self)
    }

    fn data(&self, entity: EntityId) -> Option<ComponentData> {
        self.get(entity).cloned().map(T::into_data)
    }

    fn serialize_entity(&self, entity: EntityId) -> Result<Option<Value>, EcsError> {
        ComponentStore::serialize_entity(self, entity)
    }

    fn deserialize_entity(&mut self, entity: EntityId, value: &Value) -> Result<(), EcsError> {
        ComponentStore::deserialize_entity(self, entity, value)
    }

    fn serialize_all(&self) -> Result<Value, EcsError> {
        ComponentStore::serialize_all(self)
    }

    fn deserialize_all(&mut self, value: &Value) -> Result<(), EcsError> {
        ComponentStore::deserialize_all(self, value)
    }

    fn clear(&mut self) {
        ComponentStore::clear(self);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{Lifetime, MovementComponent};
    use serde_json::json;

    fn assert_aligned<T: Component>(store: &ComponentStore<T>) {
        assert_eq!(store.entities().len(), store.components().len());
        for (i, entity) in store.entities().iter().enumerate() {
            assert_eq!(store.index_of(*entity), Some(i));
        }
    }

    fn store_with(ids: &[u32]) -> ComponentStore<Lifetime> {
        let mut store = ComponentStore::new();
        for &id in ids {
            store.add_entity(EntityId(id), Lifetime::new(id as f32));
        }
        store
    }

    #[test]
    fn test_add_and_get() {
        let store = store_with(&[3, 1, 2]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.entities(), &[EntityId(3), EntityId(1), EntityId(2)]);
        assert_eq!(store.get(EntityId(1)), Some(&Lifetime::new(1.0)));
        assert!(store.get(EntityId(9)).is_none());
        assert_aligned(&store);
    }

    #[test]
    fn test_duplicate_add_overwrites() {
        let mut store = store_with(&[1]);
        let previous = store.add_entity(EntityId(1), Lifetime::new(9.0));
        assert_eq!(previous, Some(Lifetime::new(1.0)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(EntityId(1)), Some(&Lifetime::new(9.0)));
    }

    #[test]
    fn test_remove_reindexes() {
        let mut store = store_with(&[10, 11, 12, 13]);
        assert_eq!(store.remove_entity(EntityId(11)), Some(Lifetime::new(11.0)));
        assert_eq!(store.entities(), &[EntityId(10), EntityId(12), EntityId(13)]);
        assert_eq!(store.get(EntityId(13)), Some(&Lifetime::new(13.0)));
        assert_aligned(&store);

        assert!(store.remove_entity(EntityId(11)).is_none());
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_container_rejects_wrong_kind() {
        let mut store: ComponentStore<Lifetime> = ComponentStore::new();
        let container: &mut dyn ComponentContainer = &mut store;

        let result = container.add_entity(EntityId(0), Some(MovementComponent::default().into()));
        assert!(matches!(
            result,
            Err(EcsError::ComponentKindMismatch {
                expected: ComponentKind::Lifetime,
                found: ComponentKind::Movement
            })
        ));

        container.add_entity(EntityId(0), None).unwrap();
        assert_eq!(container.data(EntityId(0)), Some(ComponentData::Lifetime(Lifetime::default())));
    }

    #[test]
    fn test_serialize_all_shape() {
        let store = store_with(&[4, 2]);
        let value = store.serialize_all().unwrap();
        assert_eq!(value["Entities"], json!([4, 2]));
        assert_eq!(value["Components"][0]["Duration"], json!(4.0));
    }

    #[test]
    fn test_deserialize_all_rebuilds() {
        let source = store_with(&[5, 7]);
        let mut target = store_with(&[1]);
        target.deserialize_all(&source.serialize_all().unwrap()).unwrap();

        assert_eq!(target.entities(), &[EntityId(5), EntityId(7)]);
        assert!(!target.contains(EntityId(1)));
        assert_aligned(&target);
    }

    #[test]
    fn test_deserialize_all_failure_leaves_store() {
        let mut store = store_with(&[1, 2]);
        let mismatched = json!({ "Entities": [1, 2, 3], "Components": [{ "Duration": 1.0 }] });
        assert!(store.deserialize_all(&mismatched).is_err());
        assert!(store.deserialize_all(&json!("garbage")).is_err());
        assert_eq!(store.entities(), &[EntityId(1), EntityId(2)]);
    }

    #[test]
    fn test_deserialize_all_drops_repeated_ids() {
        let mut store: ComponentStore<Lifetime> = ComponentStore::new();
        let snapshot = json!({
            "Entities": [1, 1],
            "Components": [{ "Duration": 1.0 }, { "Duration": 2.0 }]
        });
        store.deserialize_all(&snapshot).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(EntityId(1)), Some(&Lifetime::new(1.0)));
    }

    #[test]
    fn test_entity_roundtrip() {
        let mut store = store_with(&[3]);
        let value = store.serialize_entity(EntityId(3)).unwrap().unwrap();
        assert!(store.serialize_entity(EntityId(8)).unwrap().is_none());

        store.deserialize_entity(EntityId(8), &value).unwrap();
        assert_eq!(store.get(EntityId(8)), Some(&Lifetime::new(3.0)));
    }
}
