//! Scene file save/load through the entity manager

use std::sync::Arc;

use approx::assert_relative_eq;
use serde_json::json;

use crate::animation::AnimationManager;
use crate::assets::ResourceManager;
use crate::ecs::components::{AnimationComponent, Lifetime, MovementComponent};
use crate::ecs::{ComponentRegistry, EntityManager, SceneDocument};
use crate::foundation::hash::HashId;
use crate::foundation::math::{utils, Transform, Vec3};

const EPSILON: f32 = 1e-4;

fn registry() -> Arc<ComponentRegistry> {
    Arc::new(ComponentRegistry::with_builtin_components().unwrap())
}

fn resources() -> ResourceManager {
    let mut resources = ResourceManager::new();
    resources.register_mesh("Soldier", true).unwrap();
    resources.register_mesh("Crate", false).unwrap();
    resources.register_material("Camo").unwrap();
    resources.register_material("Wood").unwrap();
    resources
}

#[test]
fn test_save_load_preserves_scene_state() {
    let resources = resources();
    let mut source = EntityManager::new(registry());

    let rotation = utils::vec_deg_to_rad(Vec3::new(10.0, 45.0, -30.0));
    let soldier = source
        .create_entity(
            None,
            "soldier",
            Some(HashId::of("Soldier")),
            Some(HashId::of("Camo")),
            &Transform::new(Vec3::new(1.0, 2.0, 3.0), rotation, Vec3::new(1.0, 2.0, 1.0)),
        )
        .unwrap();
    let crate_entity = source
        .create_entity(
            Some(soldier),
            "crate",
            Some(HashId::of("Crate")),
            Some(HashId::of("Wood")),
            &Transform::from_position(Vec3::new(0.0, 1.0, 0.0)).with_uniform_scale(0.5),
        )
        .unwrap();
    source
        .insert_component(soldier, AnimationComponent::new("Walk", 1.2))
        .unwrap();
    source
        .insert_component(crate_entity, Lifetime::new(30.0))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    source.save_to_file(&path, &resources).unwrap();

    let mut target = EntityManager::new(registry());
    let mut animations = AnimationManager::new();
    let summary = target.load(&path, &resources, &mut animations).unwrap();

    assert_eq!(summary.created.len(), 2);
    assert!(summary.skipped.is_empty());
    let loaded_soldier = summary.id_map[&soldier.0];
    let loaded_crate = summary.id_map[&crate_entity.0];

    assert_eq!(target.mesh(loaded_soldier).unwrap(), Some(HashId::of("Soldier")));
    assert_eq!(target.material(loaded_crate).unwrap(), Some(HashId::of("Wood")));
    assert_eq!(target.parent(loaded_crate).unwrap(), Some(loaded_soldier));
    assert_eq!(target.entity_id("crate"), Some(loaded_crate));

    assert_relative_eq!(target.position(loaded_soldier).unwrap(), Vec3::new(1.0, 2.0, 3.0), epsilon = EPSILON);
    assert_relative_eq!(target.scale(loaded_soldier).unwrap(), Vec3::new(1.0, 2.0, 1.0), epsilon = EPSILON);
    assert_relative_eq!(target.rotation(loaded_soldier).unwrap(), rotation, epsilon = EPSILON);
    assert_relative_eq!(target.scale(loaded_crate).unwrap(), Vec3::new(0.5, 0.5, 0.5), epsilon = EPSILON);

    assert_eq!(
        target.component::<AnimationComponent>(loaded_soldier).map(|a| a.clip.as_str()),
        Some("Walk")
    );
    assert_eq!(target.component::<Lifetime>(loaded_crate), Some(&Lifetime::new(30.0)));

    assert!(animations.is_registered(loaded_soldier));
    assert!(!animations.is_registered(loaded_crate));
}

#[test]
fn test_rotation_written_in_degrees() {
    let resources = resources();
    let mut manager = EntityManager::new(registry());
    let entity = manager
        .create_entity(None, "e", None, None, &Transform::identity())
        .unwrap();
    manager
        .set_rotation(entity, Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0))
        .unwrap();

    let document = manager.to_scene_document(&resources).unwrap();
    assert_relative_eq!(document.entities[0].rotation.y, 90.0, epsilon = EPSILON);
}

#[test]
fn test_removed_slots_keep_ids_aligned() {
    let resources = resources();
    let mut source = EntityManager::new(registry());
    let ids: Vec<_> = (0..4)
        .map(|i| {
            source
                .create_entity(None, &format!("e{}", i), None, None, &Transform::identity())
                .unwrap()
        })
        .collect();
    source.remove(ids[1]).unwrap();
    source.set_active(ids[3], false).unwrap();

    let mut buffer = Vec::new();
    source.save_to_writer(&mut buffer, &resources).unwrap();

    let mut target = EntityManager::new(registry());
    let mut animations = AnimationManager::new();
    let summary = target
        .load_from_reader(buffer.as_slice(), &resources, &mut animations)
        .unwrap();

    assert_eq!(summary.created, vec![ids[0], ids[2], ids[3]]);
    assert!(!target.is_alive(ids[1]));
    assert!(target.is_alive(ids[3]));
    assert!(!target.is_active(ids[3]));
    assert_eq!(target.active_count(), 2);
    assert_eq!(target.entity_id("e2"), Some(ids[2]));
}

#[test]
fn test_unknown_and_corrupt_components_are_skipped() {
    let document: SceneDocument = serde_json::from_value(json!({
        "Scene": [
            {
                "EntityID": 0, "ParentID": -1, "Mesh": "Crate",
                "Position": {"X": 0.0, "Y": 0.0, "Z": 0.0},
                "Rotation": {"X": 0.0, "Y": 0.0, "Z": 0.0},
                "Scale": {"X": 1.0, "Y": 1.0, "Z": 1.0},
                "AttachedComponents": ["RigidBody", "Lifetime", "MovementComponent"],
                "RigidBody": {"Mass": 3.0},
                "Lifetime": "not a lifetime",
                "MovementComponent": {"Velocity": [1.0, 0.0, 0.0]}
            }
        ]
    }))
    .unwrap();

    let resources = resources();
    let mut manager = EntityManager::new(registry());
    let mut animations = AnimationManager::new();
    let summary = manager.load_document(&document, &resources, &mut animations).unwrap();

    let entity = summary.created[0];
    let mut skipped: Vec<&str> = summary.skipped.iter().map(|s| s.component.as_str()).collect();
    skipped.sort_unstable();
    assert_eq!(skipped, vec!["Lifetime", "RigidBody"]);

    let movement = manager.component::<MovementComponent>(entity).unwrap();
    assert_relative_eq!(movement.velocity, Vec3::new(1.0, 0.0, 0.0));
    assert!(manager.component::<Lifetime>(entity).is_none());
    assert!(animations.is_empty());
}

#[test]
fn test_unknown_parent_attaches_to_root() {
    let document: SceneDocument = serde_json::from_value(json!({
        "Scene": [
            { "EntityID": 0, "ParentID": 7, "Name": "orphan" }
        ]
    }))
    .unwrap();

    let resources = resources();
    let mut manager = EntityManager::new(registry());
    let mut animations = AnimationManager::new();
    let summary = manager.load_document(&document, &resources, &mut animations).unwrap();

    let orphan = summary.created[0];
    assert_eq!(manager.parent(orphan).unwrap(), None);
    assert_eq!(manager.entity_id("orphan"), Some(orphan));
    assert_relative_eq!(manager.scale(orphan).unwrap(), Vec3::new(1.0, 1.0, 1.0));
}

#[test]
fn test_component_snapshot_roundtrip() {
    let mut source = EntityManager::new(registry());
    let a = source.create_entity(None, "a", None, None, &Transform::identity()).unwrap();
    let b = source.create_entity(None, "b", None, None, &Transform::identity()).unwrap();
    source.insert_component(a, Lifetime::new(3.0)).unwrap();
    source.insert_component(b, Lifetime::new(4.0)).unwrap();
    source
        .insert_component(b, MovementComponent::with_velocity(Vec3::new(0.0, 1.0, 0.0)))
        .unwrap();

    let mut snapshot = source.save_components().unwrap();
    snapshot["MovementComponent"]["Components"] = json!("broken");

    let mut target = EntityManager::new(registry());
    let failed = target.load_components(&snapshot).unwrap();

    assert_eq!(failed, vec!["MovementComponent".to_string()]);
    assert_eq!(target.component::<Lifetime>(b), Some(&Lifetime::new(4.0)));
    assert!(target.component::<MovementComponent>(b).is_none());
}

#[test]
fn test_active_child_under_inactive_parent_survives_reload() {
    let resources = resources();
    let mut source = EntityManager::new(registry());
    let parent = source.create_entity(None, "parent", None, None, &Transform::identity()).unwrap();
    let child = source
        .create_entity(Some(parent), "child", None, None, &Transform::identity())
        .unwrap();
    let grandchild = source
        .create_entity(Some(child), "grandchild", None, None, &Transform::identity())
        .unwrap();
    source.set_active(parent, false).unwrap();
    source.set_active(child, true).unwrap();
    source.set_active(grandchild, false).unwrap();

    let mut buffer = Vec::new();
    source.save_to_writer(&mut buffer, &resources).unwrap();

    let mut target = EntityManager::new(registry());
    let mut animations = AnimationManager::new();
    let summary = target
        .load_from_reader(buffer.as_slice(), &resources, &mut animations)
        .unwrap();

    assert!(!target.is_active(summary.id_map[&parent.0]));
    assert!(target.is_active(summary.id_map[&child.0]));
    assert!(!target.is_active(summary.id_map[&grandchild.0]));
}

#[test]
fn test_repeated_entity_id_keeps_first_record() {
    let document: SceneDocument = serde_json::from_value(json!({
        "Scene": [
            { "EntityID": 0, "Name": "first" },
            { "EntityID": 1, "ParentID": 0, "Name": "child" },
            { "EntityID": 0, "Name": "second" }
        ]
    }))
    .unwrap();

    let resources = resources();
    let mut manager = EntityManager::new(registry());
    let mut animations = AnimationManager::new();
    let summary = manager.load_document(&document, &resources, &mut animations).unwrap();

    assert_eq!(summary.created.len(), 2);
    assert_eq!(manager.alive_count(), 2);
    let first = summary.id_map[&0];
    assert_eq!(manager.entity_id("first"), Some(first));
    assert_eq!(manager.entity_id("second"), None);
    assert_eq!(manager.parent(summary.id_map[&1]).unwrap(), Some(first));
}

#[test]
fn test_attached_component_without_block_is_reported() {
    let document: SceneDocument = serde_json::from_value(json!({
        "Scene": [
            {
                "EntityID": 0,
                "AttachedComponents": ["Lifetime", "MovementComponent"],
                "Lifetime": {"Duration": 2.0, "Elapsed": 0.0}
            }
        ]
    }))
    .unwrap();

    let resources = resources();
    let mut manager = EntityManager::new(registry());
    let mut animations = AnimationManager::new();
    let summary = manager.load_document(&document, &resources, &mut animations).unwrap();

    let entity = summary.created[0];
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].entity, entity);
    assert_eq!(summary.skipped[0].component, "MovementComponent");
    assert_eq!(manager.component::<Lifetime>(entity), Some(&Lifetime::new(2.0)));
}
