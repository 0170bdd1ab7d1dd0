//! Entity manager
//!
//! Owns the scene graph and one component container per registered component
//! kind. Entity state is kept as parallel arrays indexed by [`EntityId`]; each
//! entity is backed by exactly one scene node.
//!
//! Removed ids go on a free list and every backing slot is reset when an id
//! is handed out again.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;

use super::component::{Component, ComponentData, ComponentKind};
use super::entity::{EntityId, EntityView};
use super::error::EcsError;
use super::registry::ComponentRegistry;
use super::storage::{ComponentContainer, ComponentStore};
use crate::foundation::hash::HashId;
use crate::foundation::math::{utils, Mat4, Transform, Vec3};
use crate::scene::{NodeId, SceneGraph};

/// Entities, their scene nodes and their components
pub struct EntityManager {
    scene: SceneGraph,
    registry: Arc<ComponentRegistry>,
    containers: BTreeMap<ComponentKind, Box<dyn ComponentContainer>>,

    nodes: Vec<NodeId>,
    node_entities: HashMap<NodeId, EntityId>,
    meshes: Vec<Option<HashId>>,
    materials: Vec<Option<HashId>>,
    parents: Vec<Option<EntityId>>,
    active: Vec<bool>,
    alive: Vec<bool>,
    names: Vec<String>,

    name_index: HashMap<String, EntityId>,
    free_entities: Vec<EntityId>,
}

impl EntityManager {
    /// Create an empty manager using the component types in `registry`
    pub fn new(registry: Arc<ComponentRegistry>) -> Self {
        Self::with_capacity(registry, 0)
    }

    /// Create an empty manager with room for `capacity` entities
    pub fn with_capacity(registry: Arc<ComponentRegistry>, capacity: usize) -> Self {
        Self {
            scene: SceneGraph::with_capacity(capacity + 1),
            registry,
            containers: BTreeMap::new(),
            nodes: Vec::with_capacity(capacity),
            node_entities: HashMap::with_capacity(capacity),
            meshes: Vec::with_capacity(capacity),
            materials: Vec::with_capacity(capacity),
            parents: Vec::with_capacity(capacity),
            active: Vec::with_capacity(capacity),
            alive: Vec::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
            name_index: HashMap::new(),
            free_entities: Vec::new(),
        }
    }

    /// Component type registry shared with this manager
    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    /// Scene graph backing the entities
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    fn check_alive(&self, entity: EntityId) -> Result<(), EcsError> {
        match self.alive.get(entity.index()) {
            None => Err(EcsError::EntityOutOfRange(entity)),
            Some(false) => Err(EcsError::EntityNotAlive(entity)),
            Some(true) => Ok(()),
        }
    }

    /// Scene node backing `entity`
    pub fn node(&self, entity: EntityId) -> Result<NodeId, EcsError> {
        self.check_alive(entity)?;
        Ok(self.nodes[entity.index()])
    }

    /// Entity backed by `node`
    pub fn entity_of_node(&self, node: NodeId) -> Option<EntityId> {
        self.node_entities.get(&node).copied()
    }

    // ----- lifecycle -----

    /// Create an entity under `parent` (`None` attaches to the scene root).
    ///
    /// A freed id is reused when one is available; all of its backing slots
    /// are overwritten.
    pub fn create_entity(
        &mut self,
        parent: Option<EntityId>,
        name: &str,
        mesh: Option<HashId>,
        material: Option<HashId>,
        transform: &Transform,
    ) -> Result<EntityId, EcsError> {
        let parent_node = match parent {
            Some(parent) => self.node(parent)?,
            None => NodeId::ROOT,
        };
        let node = self.scene.create_node(parent_node, transform)?;

        let entity = match self.free_entities.pop() {
            Some(entity) => {
                let slot = entity.index();
                self.nodes[slot] = node;
                self.meshes[slot] = mesh;
                self.materials[slot] = material;
                self.parents[slot] = parent;
                self.active[slot] = true;
                self.alive[slot] = true;
                self.names[slot] = name.to_string();
                entity
            }
            None => {
                self.nodes.push(node);
                self.meshes.push(mesh);
                self.materials.push(material);
                self.parents.push(parent);
                self.active.push(true);
                self.alive.push(true);
                self.names.push(name.to_string());
                EntityId((self.nodes.len() - 1) as u32)
            }
        };

        self.node_entities.insert(node, entity);
        if !name.is_empty() {
            self.name_index.insert(name.to_string(), entity);
        }

        log::debug!("Created {} '{}' on {}", entity, name, node);
        Ok(entity)
    }

    /// Remove `entity` and every descendant.
    ///
    /// Returns the removed entities, `entity` first and the descendants in
    /// breadth-first order. Their components are dropped from every container
    /// and their ids become available for reuse.
    pub fn remove(&mut self, entity: EntityId) -> Result<Vec<EntityId>, EcsError> {
        let node = self.node(entity)?;
        let descendant_nodes = self.scene.remove_node(node)?;

        let mut removed = Vec::with_capacity(descendant_nodes.len() + 1);
        for node in std::iter::once(node).chain(descendant_nodes) {
            if let Some(id) = self.node_entities.remove(&node) {
                removed.push(id);
            }
        }

        for &id in &removed {
            let slot = id.index();
            self.active[slot] = false;
            self.alive[slot] = false;
            self.parents[slot] = None;
            self.meshes[slot] = None;
            self.materials[slot] = None;

            for container in self.containers.values_mut() {
                container.remove_entity(id);
            }

            let name = std::mem::take(&mut self.names[slot]);
            if self.name_index.get(&name) == Some(&id) {
                self.name_index.remove(&name);
            }

            self.free_entities.push(id);
        }

        log::debug!("Removed {} and {} descendant(s)", entity, removed.len() - 1);
        Ok(removed)
    }

    // ----- components -----

    /// Make sure a container exists for the type registered as `name`
    pub fn register_component(&mut self, name: &str) -> Result<ComponentKind, EcsError> {
        let registration = self
            .registry
            .get(name)
            .ok_or_else(|| EcsError::UnknownComponent(name.to_string()))?;
        let kind = registration.kind;
        if !self.containers.contains_key(&kind) {
            self.containers.insert(kind, (registration.factory)());
        }
        Ok(kind)
    }

    /// Attach a component by type name; `None` attaches the default value
    pub fn add_component(
        &mut self,
        entity: EntityId,
        name: &str,
        data: Option<ComponentData>,
    ) -> Result<(), EcsError> {
        self.check_alive(entity)?;
        let kind = self.register_component(name)?;
        match self.containers.get_mut(&kind) {
            Some(container) => container.add_entity(entity, data),
            None => Err(EcsError::UnknownComponent(name.to_string())),
        }
    }

    /// Attach a typed component, returning the value it replaced
    pub fn insert_component<T: Component>(&mut self, entity: EntityId, value: T) -> Result<Option<T>, EcsError> {
        self.check_alive(entity)?;
        self.register_component(T::NAME)?;
        self.store_mut::<T>()
            .map(|store| store.add_entity(entity, value))
            .ok_or_else(|| EcsError::UnknownComponent(T::NAME.to_string()))
    }

    /// Detach a component by type name; returns whether one was attached
    pub fn remove_component(&mut self, entity: EntityId, name: &str) -> Result<bool, EcsError> {
        self.check_alive(entity)?;
        let kind = self
            .registry
            .kind_of(name)
            .ok_or_else(|| EcsError::UnknownComponent(name.to_string()))?;
        Ok(self
            .containers
            .get_mut(&kind)
            .map(|container| container.remove_entity(entity))
            .unwrap_or(false))
    }

    /// Typed store for `T`, if any component of that type was ever added
    pub fn store<T: Component>(&self) -> Option<&ComponentStore<T>> {
        self.containers
            .get(&T::KIND)
            .and_then(|container| container.as_any().downcast_ref())
    }

    /// Mutable typed store for `T`
    pub fn store_mut<T: Component>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.containers
            .get_mut(&T::KIND)
            .and_then(|container| container.as_any_mut().downcast_mut())
    }

    /// Component `T` of `entity`
    pub fn component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.store::<T>().and_then(|store| store.get(entity))
    }

    /// Mutable component `T` of `entity`
    pub fn component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        self.store_mut::<T>().and_then(|store| store.get_mut(entity))
    }

    /// Copy of the component registered as `name` on `entity`
    pub fn component_data(&self, name: &str, entity: EntityId) -> Option<ComponentData> {
        self.container(name).and_then(|container| container.data(entity))
    }

    /// Container for the type registered as `name`
    pub fn container(&self, name: &str) -> Option<&dyn ComponentContainer> {
        let kind = self.registry.kind_of(name)?;
        self.containers.get(&kind).map(|container| &**container)
    }

    /// Every live container in kind order
    pub fn containers(&self) -> impl Iterator<Item = &dyn ComponentContainer> {
        self.containers.values().map(|container| &**container)
    }

    /// Whether `entity` has a component of `kind`
    pub fn has_component(&self, entity: EntityId, kind: ComponentKind) -> bool {
        self.containers
            .get(&kind)
            .map(|container| container.contains(entity))
            .unwrap_or(false)
    }

    /// Names of the components attached to `entity`, in kind order
    pub fn attached_components(&self, entity: EntityId) -> Vec<&'static str> {
        self.containers
            .values()
            .filter(|container| container.contains(entity))
            .map(|container| container.name())
            .collect()
    }

    /// Serialize the component registered as `name` on `entity`
    pub fn serialize_component(&self, name: &str, entity: EntityId) -> Result<Option<Value>, EcsError> {
        match self.container(name) {
            Some(container) => container.serialize_entity(entity),
            None => Ok(None),
        }
    }

    /// Decode a component registered as `name` and attach it to `entity`
    pub fn deserialize_component(&mut self, entity: EntityId, name: &str, value: &Value) -> Result<(), EcsError> {
        self.check_alive(entity)?;
        let kind = self.register_component(name)?;
        match self.containers.get_mut(&kind) {
            Some(container) => container.deserialize_entity(entity, value),
            None => Err(EcsError::UnknownComponent(name.to_string())),
        }
    }

    pub(crate) fn containers_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn ComponentContainer>> {
        self.containers.values_mut()
    }

    // ----- queries -----

    /// Active entities holding a component of `kind`, in storage order
    pub fn component_entities(&self, kind: ComponentKind) -> Vec<EntityId> {
        match self.containers.get(&kind) {
            Some(container) => container
                .entities()
                .iter()
                .copied()
                .filter(|&entity| self.is_active(entity))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Active entities holding every kind in `kinds`, sorted by id.
    ///
    /// An empty request matches nothing.
    pub fn multi_component_entities(&self, kinds: &[ComponentKind]) -> Vec<EntityId> {
        let Some((first, rest)) = kinds.split_first() else {
            return Vec::new();
        };

        let mut result = self.component_entities(*first);
        result.sort_unstable();

        for &kind in rest {
            if result.is_empty() {
                break;
            }
            let mut other = self.component_entities(kind);
            other.sort_unstable();
            result = intersect_sorted(&result, &other);
        }
        result
    }

    // ----- transforms -----

    /// Set the local position
    pub fn set_position(&mut self, entity: EntityId, position: Vec3) -> Result<(), EcsError> {
        let node = self.node(entity)?;
        Ok(self.scene.set_translation(node, position)?)
    }

    /// Set the local rotation in radians
    pub fn set_rotation(&mut self, entity: EntityId, rotation: Vec3) -> Result<(), EcsError> {
        let node = self.node(entity)?;
        Ok(self.scene.set_rotation(node, rotation)?)
    }

    /// Set the local rotation in degrees
    pub fn set_rotation_degrees(&mut self, entity: EntityId, degrees: Vec3) -> Result<(), EcsError> {
        self.set_rotation(entity, utils::vec_deg_to_rad(degrees))
    }

    /// Set the local scale
    pub fn set_scale(&mut self, entity: EntityId, scale: Vec3) -> Result<(), EcsError> {
        let node = self.node(entity)?;
        Ok(self.scene.set_scale(node, scale)?)
    }

    /// Replace the local transform
    pub fn set_transform(&mut self, entity: EntityId, transform: &Transform) -> Result<(), EcsError> {
        let node = self.node(entity)?;
        Ok(self.scene.set_transform(node, transform)?)
    }

    /// Local position
    pub fn position(&self, entity: EntityId) -> Result<Vec3, EcsError> {
        Ok(self.scene.translation(self.node(entity)?)?)
    }

    /// Local rotation in radians
    pub fn rotation(&self, entity: EntityId) -> Result<Vec3, EcsError> {
        Ok(self.scene.rotation(self.node(entity)?)?)
    }

    /// Local rotation in degrees
    pub fn rotation_in_degrees(&self, entity: EntityId) -> Result<Vec3, EcsError> {
        Ok(self.transform(entity)?.rotation_degrees())
    }

    /// Local scale
    pub fn scale(&self, entity: EntityId) -> Result<Vec3, EcsError> {
        Ok(self.scene.scale(self.node(entity)?)?)
    }

    /// Local transform
    pub fn transform(&self, entity: EntityId) -> Result<Transform, EcsError> {
        Ok(self.scene.transform(self.node(entity)?)?)
    }

    /// Cached world matrix
    pub fn world_matrix(&self, entity: EntityId) -> Result<Mat4, EcsError> {
        Ok(self.scene.world_matrix(self.node(entity)?)?)
    }

    /// Translation of the cached world matrix
    pub fn world_position(&self, entity: EntityId) -> Result<Vec3, EcsError> {
        Ok(self.scene.world_position(self.node(entity)?)?)
    }

    /// Recompute every cached world matrix
    pub fn refresh_world_transforms(&mut self) {
        self.scene.update_world_transforms();
    }

    // ----- entity attributes -----

    /// Set the mesh key
    pub fn set_mesh(&mut self, entity: EntityId, mesh: Option<HashId>) -> Result<(), EcsError> {
        self.check_alive(entity)?;
        self.meshes[entity.index()] = mesh;
        Ok(())
    }

    /// Set the material key
    pub fn set_material(&mut self, entity: EntityId, material: Option<HashId>) -> Result<(), EcsError> {
        self.check_alive(entity)?;
        self.materials[entity.index()] = material;
        Ok(())
    }

    /// Enable or disable `entity` together with every descendant
    pub fn set_active(&mut self, entity: EntityId, active: bool) -> Result<(), EcsError> {
        let node = self.node(entity)?;
        let subtree = self.scene.children(node)?;

        for node in std::iter::once(node).chain(subtree) {
            self.scene.set_active(node, active)?;
            if let Some(id) = self.node_entities.get(&node) {
                self.active[id.index()] = active;
            }
        }
        Ok(())
    }

    /// Set the active flag of `entity` alone; descendants keep their own flags
    pub(crate) fn set_active_flag(&mut self, entity: EntityId, active: bool) -> Result<(), EcsError> {
        let node = self.node(entity)?;
        self.scene.set_active(node, active)?;
        self.active[entity.index()] = active;
        Ok(())
    }

    /// Rename `entity`
    pub fn set_name(&mut self, entity: EntityId, name: &str) -> Result<(), EcsError> {
        self.check_alive(entity)?;
        let slot = entity.index();
        let old = std::mem::replace(&mut self.names[slot], name.to_string());
        if self.name_index.get(&old) == Some(&entity) {
            self.name_index.remove(&old);
        }
        if !name.is_empty() {
            self.name_index.insert(name.to_string(), entity);
        }
        Ok(())
    }

    /// Entity most recently created or renamed with `name`
    pub fn entity_id(&self, name: &str) -> Option<EntityId> {
        self.name_index.get(name).copied()
    }

    /// Name of `entity`
    pub fn name(&self, entity: EntityId) -> Result<&str, EcsError> {
        self.check_alive(entity)?;
        Ok(&self.names[entity.index()])
    }

    /// Whether `entity` is alive and active
    pub fn is_active(&self, entity: EntityId) -> bool {
        let slot = entity.index();
        slot < self.active.len() && self.alive[slot] && self.active[slot]
    }

    /// Whether `entity` refers to a live slot
    pub fn is_alive(&self, entity: EntityId) -> bool {
        self.alive.get(entity.index()).copied().unwrap_or(false)
    }

    /// Mesh key
    pub fn mesh(&self, entity: EntityId) -> Result<Option<HashId>, EcsError> {
        self.check_alive(entity)?;
        Ok(self.meshes[entity.index()])
    }

    /// Material key
    pub fn material(&self, entity: EntityId) -> Result<Option<HashId>, EcsError> {
        self.check_alive(entity)?;
        Ok(self.materials[entity.index()])
    }

    /// Parent entity; `None` when attached to the scene root
    pub fn parent(&self, entity: EntityId) -> Result<Option<EntityId>, EcsError> {
        self.check_alive(entity)?;
        Ok(self.parents[entity.index()])
    }

    /// Every descendant of `entity`, breadth first
    pub fn children(&self, entity: EntityId) -> Result<Vec<EntityId>, EcsError> {
        let nodes = self.scene.children(self.node(entity)?)?;
        Ok(nodes
            .into_iter()
            .filter_map(|node| self.entity_of_node(node))
            .collect())
    }

    /// Snapshot of one entity
    pub fn entity(&self, entity: EntityId) -> Result<EntityView, EcsError> {
        self.check_alive(entity)?;
        let slot = entity.index();
        Ok(EntityView {
            id: entity,
            name: self.names[slot].clone(),
            parent: self.parents[slot],
            mesh: self.meshes[slot],
            material: self.materials[slot],
            transform: self.transform(entity)?,
            active: self.active[slot],
        })
    }

    /// Snapshots of every active entity in id order
    pub fn entities(&self) -> Vec<EntityView> {
        (0..self.count() as u32)
            .map(EntityId)
            .filter(|&entity| self.is_active(entity))
            .filter_map(|entity| self.entity(entity).ok())
            .collect()
    }

    /// Write back name, mesh, material, transform and active flag from a
    /// snapshot. The parent link is not changed.
    pub fn update_entity(&mut self, view: &EntityView) -> Result<(), EcsError> {
        self.check_alive(view.id)?;
        if self.names[view.id.index()] != view.name {
            self.set_name(view.id, &view.name)?;
        }
        self.set_mesh(view.id, view.mesh)?;
        self.set_material(view.id, view.material)?;
        self.set_transform(view.id, &view.transform)?;
        if self.active[view.id.index()] != view.active {
            self.set_active(view.id, view.active)?;
        }
        Ok(())
    }

    /// Number of entity slots, free ones included
    pub fn count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live entities
    pub fn alive_count(&self) -> usize {
        self.alive.iter().filter(|&&alive| alive).count()
    }

    /// Number of live, active entities
    pub fn active_count(&self) -> usize {
        self.alive
            .iter()
            .zip(&self.active)
            .filter(|(&alive, &active)| alive && active)
            .count()
    }
}

fn intersect_sorted(a: &[EntityId], b: &[EntityId]) -> Vec<EntityId> {
    let mut result = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                result.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    result
}
