//! Scene file persistence
//!
//! A scene file is a JSON object with a single `"Scene"` array. Each record
//! carries an entity's scene-level state and, as sibling keys, one block per
//! attached component keyed by the component's registered name:
//!
//! ```json
//! { "Scene": [ {
//!     "EntityID": 0, "ParentID": -1, "Name": "Soldier",
//!     "Mesh": "Soldier", "Material": "Camo",
//!     "Position": { "X": 0.0, "Y": 0.0, "Z": 0.0 },
//!     "Rotation": { "X": 0.0, "Y": 90.0, "Z": 0.0 },
//!     "Scale": { "X": 1.0, "Y": 1.0, "Z": 1.0 },
//!     "AttachedComponents": ["AnimationComponent"],
//!     "AnimationComponent": { "Clip": "Walk", ... }
//! } ] }
//! ```
//!
//! Rotations are written in degrees. Loading recreates entities in file order,
//! so ids may differ from the saved ones; saved parent ids are mapped through
//! the ids created during the same load.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entity::EntityId;
use super::entity_manager::EntityManager;
use super::error::{EcsError, PersistenceError};
use crate::animation::AnimationRegistrar;
use crate::assets::ResourceProvider;
use crate::foundation::hash::HashId;
use crate::foundation::math::{utils, Transform, Vec3};

/// `{X, Y, Z}` record used for positions, rotations and scales
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vec3Record {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
    /// Z component
    pub z: f32,
}

impl From<Vec3> for Vec3Record {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<Vec3Record> for Vec3 {
    fn from(r: Vec3Record) -> Self {
        Vec3::new(r.x, r.y, r.z)
    }
}

fn unit_scale() -> Vec3Record {
    Vec3Record { x: 1.0, y: 1.0, z: 1.0 }
}

fn zero() -> Vec3Record {
    Vec3Record { x: 0.0, y: 0.0, z: 0.0 }
}

fn yes() -> bool {
    true
}

/// One entity in a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    /// Id the entity had when saved
    #[serde(rename = "EntityID")]
    pub entity_id: u32,

    /// Saved id of the parent; `-1` for the scene root
    #[serde(rename = "ParentID", default = "root_parent")]
    pub parent_id: i64,

    /// Entity name
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Mesh name
    #[serde(rename = "Mesh", default, skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,

    /// Material name
    #[serde(rename = "Material", default, skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,

    /// Local position
    #[serde(rename = "Position", default = "zero")]
    pub position: Vec3Record,

    /// Local rotation in degrees
    #[serde(rename = "Rotation", default = "zero")]
    pub rotation: Vec3Record,

    /// Local scale
    #[serde(rename = "Scale", default = "unit_scale")]
    pub scale: Vec3Record,

    /// Registered names of the attached components
    #[serde(rename = "AttachedComponents", default)]
    pub attached_components: Vec<String>,

    /// Active flag
    #[serde(rename = "Active", default = "yes")]
    pub active: bool,

    /// Slot was free when saved; recreated and removed again on load
    #[serde(rename = "Removed", default, skip_serializing_if = "std::ops::Not::not")]
    pub removed: bool,

    /// Component blocks keyed by registered name
    #[serde(flatten)]
    pub components: Map<String, Value>,
}

fn root_parent() -> i64 {
    -1
}

impl EntityRecord {
    fn placeholder(entity_id: u32) -> Self {
        Self {
            entity_id,
            parent_id: -1,
            name: None,
            mesh: None,
            material: None,
            position: zero(),
            rotation: zero(),
            scale: unit_scale(),
            attached_components: Vec::new(),
            active: false,
            removed: true,
            components: Map::new(),
        }
    }

    fn transform(&self) -> Transform {
        Transform::new(
            self.position.into(),
            utils::vec_deg_to_rad(self.rotation.into()),
            self.scale.into(),
        )
    }
}

/// Whole scene file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Entity records in id order
    #[serde(rename = "Scene")]
    pub entities: Vec<EntityRecord>,
}

/// A component block that was not loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedComponent {
    /// Entity the block belonged to, as created by the load
    pub entity: EntityId,
    /// Component name from the file
    pub component: String,
    /// Why it was skipped
    pub reason: String,
}

/// Outcome of a scene load
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Saved id → created id, for every record that was loaded
    pub id_map: BTreeMap<u32, EntityId>,
    /// Entities left alive after the load, in file order
    pub created: Vec<EntityId>,
    /// Component blocks that were skipped
    pub skipped: Vec<SkippedComponent>,
    /// Entities bound to an animated mesh
    pub animated: Vec<EntityId>,
}

impl EntityManager {
    /// Build the serializable form of every entity slot
    pub fn to_scene_document(&self, resources: &dyn ResourceProvider) -> Result<SceneDocument, PersistenceError> {
        let mut entities = Vec::with_capacity(self.count());

        for id in 0..self.count() as u32 {
            let entity = EntityId(id);
            if !self.is_alive(entity) {
                entities.push(EntityRecord::placeholder(id));
                continue;
            }

            let view = self.entity(entity)?;
            let mut components = Map::new();
            let attached = self.attached_components(entity);
            for name in &attached {
                if let Some(value) = self.serialize_component(name, entity)? {
                    components.insert((*name).to_string(), value);
                }
            }

            entities.push(EntityRecord {
                entity_id: id,
                parent_id: view.parent.map(|p| i64::from(p.0)).unwrap_or(-1),
                name: Some(view.name.clone()).filter(|name| !name.is_empty()),
                mesh: view.mesh.and_then(|key| resolve_name(resources, key, "mesh", entity)),
                material: view
                    .material
                    .and_then(|key| resolve_name(resources, key, "material", entity)),
                position: view.transform.position.into(),
                rotation: view.transform.rotation_degrees().into(),
                scale: view.transform.scale.into(),
                attached_components: attached.iter().map(|name| name.to_string()).collect(),
                active: view.active,
                removed: false,
                components,
            });
        }

        Ok(SceneDocument { entities })
    }

    /// Write the scene as pretty-printed JSON
    pub fn save_to_writer<W: Write>(&self, writer: W, resources: &dyn ResourceProvider) -> Result<(), PersistenceError> {
        let document = self.to_scene_document(resources)?;
        serde_json::to_writer_pretty(writer, &document)?;
        Ok(())
    }

    /// Write the scene to a file
    pub fn save_to_file(&self, path: impl AsRef<Path>, resources: &dyn ResourceProvider) -> Result<(), PersistenceError> {
        let path = path.as_ref();
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to_writer(&mut writer, resources)?;
        writer.flush()?;
        log::info!("Saved {} entities to {}", self.alive_count(), path.display());
        Ok(())
    }

    /// Recreate every record of `document` in this manager.
    ///
    /// Unknown or undecodable component blocks are skipped with a warning and
    /// reported in the summary, as are components listed in
    /// `AttachedComponents` without a block. Records flagged `Removed` are
    /// recreated and then removed once every record exists, so a load into an
    /// empty manager reproduces the saved ids. Each record's `Active` flag is
    /// applied to that entity alone.
    pub fn load_document(
        &mut self,
        document: &SceneDocument,
        resources: &dyn ResourceProvider,
        animations: &mut dyn AnimationRegistrar,
    ) -> Result<LoadSummary, PersistenceError> {
        let mut summary = LoadSummary::default();
        let order = creation_order(&document.entities);
        let mut loaded = order.clone();
        loaded.sort_unstable();

        for index in order {
            let record = &document.entities[index];
            let parent = match record.parent_id {
                id if id < 0 => None,
                id => match u32::try_from(id).ok().and_then(|id| summary.id_map.get(&id)) {
                    Some(&parent) => Some(parent),
                    None => {
                        log::warn!(
                            "Entity {} references unknown parent {}, attaching to root",
                            record.entity_id,
                            id
                        );
                        None
                    }
                },
            };

            let name = record
                .name
                .clone()
                .unwrap_or_else(|| record.entity_id.to_string());
            let mesh = record.mesh.as_deref().map(HashId::of);
            let material = record.material.as_deref().map(HashId::of);
            let entity = self.create_entity(parent, &name, mesh, material, &record.transform())?;
            summary.id_map.insert(record.entity_id, entity);

            if record.removed {
                continue;
            }

            for (component, value) in &record.components {
                if let Err(err) = self.deserialize_component(entity, component, value) {
                    log::warn!("Skipping {} on entity {}: {}", component, record.entity_id, err);
                    summary.skipped.push(SkippedComponent {
                        entity,
                        component: component.clone(),
                        reason: err.to_string(),
                    });
                }
            }

            for component in &record.attached_components {
                if !record.components.contains_key(component) {
                    log::warn!("Entity {} lists {} without a component block", record.entity_id, component);
                    summary.skipped.push(SkippedComponent {
                        entity,
                        component: component.clone(),
                        reason: "listed in AttachedComponents without a block".to_string(),
                    });
                }
            }

            if let Some(mesh) = mesh {
                if resources.mesh(mesh).map(|info| info.is_animated()).unwrap_or(false) {
                    animations.register_entity(entity, mesh);
                    summary.animated.push(entity);
                }
            }
        }

        for &index in &loaded {
            let record = &document.entities[index];
            let Some(&entity) = summary.id_map.get(&record.entity_id) else {
                continue;
            };
            if record.removed {
                if self.is_alive(entity) {
                    self.remove(entity)?;
                }
            } else if !record.active && self.is_alive(entity) {
                self.set_active_flag(entity, false)?;
            }
        }

        summary.created = loaded
            .iter()
            .filter_map(|&index| summary.id_map.get(&document.entities[index].entity_id).copied())
            .filter(|&entity| self.is_alive(entity))
            .collect();

        log::info!(
            "Loaded {} entities ({} component blocks skipped)",
            summary.created.len(),
            summary.skipped.len()
        );
        Ok(summary)
    }

    /// Read a scene document from `reader` and load it
    pub fn load_from_reader<R: Read>(
        &mut self,
        reader: R,
        resources: &dyn ResourceProvider,
        animations: &mut dyn AnimationRegistrar,
    ) -> Result<LoadSummary, PersistenceError> {
        let document: SceneDocument = serde_json::from_reader(reader)?;
        self.load_document(&document, resources, animations)
    }

    /// Load a scene file
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        resources: &dyn ResourceProvider,
        animations: &mut dyn AnimationRegistrar,
    ) -> Result<LoadSummary, PersistenceError> {
        let path = path.as_ref();
        log::info!("Loading scene {}", path.display());
        self.load_from_reader(BufReader::new(File::open(path)?), resources, animations)
    }

    /// Snapshot every component store as `{ name: {"Entities": [...], "Components": [...]} }`
    pub fn save_components(&self) -> Result<Value, EcsError> {
        let mut stores = Map::new();
        for container in self.containers() {
            stores.insert(container.name().to_string(), container.serialize_all()?);
        }
        Ok(Value::Object(stores))
    }

    /// Restore component stores from [`Self::save_components`] output.
    ///
    /// Each store is replaced independently; a store that fails to decode is
    /// left as it was and its name is returned.
    pub fn load_components(&mut self, snapshot: &Value) -> Result<Vec<String>, EcsError> {
        let mut failed = Vec::new();
        let Some(stores) = snapshot.as_object() else {
            return Err(EcsError::Serialization {
                component: "component snapshot",
                source: <serde_json::Error as serde::de::Error>::custom("expected an object of stores"),
            });
        };

        let mut kinds = HashMap::new();
        for name in stores.keys() {
            match self.register_component(name) {
                Ok(kind) => {
                    kinds.insert(kind, name.as_str());
                }
                Err(err) => {
                    log::warn!("Skipping component store {}: {}", name, err);
                    failed.push(name.clone());
                }
            }
        }

        for container in self.containers_mut() {
            let Some(name) = kinds.get(&container.kind()) else {
                continue;
            };
            let Some(value) = stores.get(*name) else {
                continue;
            };
            if let Err(err) = container.deserialize_all(value) {
                log::warn!("Skipping component store {}: {}", name, err);
                failed.push((*name).to_string());
            }
        }
        Ok(failed)
    }
}

fn resolve_name(resources: &dyn ResourceProvider, key: HashId, what: &str, entity: EntityId) -> Option<String> {
    let name = resources.string(key).map(str::to_string);
    if name.is_none() {
        log::warn!("No name for {} {} of {}, omitting it", what, key, entity);
    }
    name
}

/// File order, except that a record whose parent appears later in the file is
/// placed right after that parent. A repeated `EntityID` keeps its first record
/// and the later ones are left out.
fn creation_order(records: &[EntityRecord]) -> Vec<usize> {
    let mut first_index: HashMap<i64, usize> = HashMap::with_capacity(records.len());
    let mut duplicate = vec![false; records.len()];
    for (index, record) in records.iter().enumerate() {
        match first_index.entry(i64::from(record.entity_id)) {
            Entry::Occupied(entry) => {
                log::warn!(
                    "Duplicate entity id {} at record {}, keeping record {}",
                    record.entity_id,
                    index,
                    entry.get()
                );
                duplicate[index] = true;
            }
            Entry::Vacant(entry) => {
                entry.insert(index);
            }
        }
    }

    let mut waiting: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut placed = vec![false; records.len()];
    let mut order = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        if duplicate[index] {
            continue;
        }
        match first_index.get(&record.parent_id) {
            Some(&parent) if !placed[parent] => waiting.entry(parent).or_default().push(index),
            _ => place_subtree(index, &mut placed, &mut waiting, &mut order),
        }
    }

    // Parent cycle: place the rest in file order, they attach to root.
    for index in 0..records.len() {
        if !duplicate[index] && !placed[index] {
            place_subtree(index, &mut placed, &mut waiting, &mut order);
        }
    }
    order
}

/// Place `index`, then every record that was waiting on it, breadth first
fn place_subtree(
    index: usize,
    placed: &mut [bool],
    waiting: &mut HashMap<usize, Vec<usize>>,
    order: &mut Vec<usize>,
) {
    let mut queue = VecDeque::from([index]);
    while let Some(next) = queue.pop_front() {
        if placed[next] {
            continue;
        }
        placed[next] = true;
        order.push(next);
        if let Some(children) = waiting.remove(&next) {
            queue.extend(children);
        }
    }
}
