//! Scene demo application
//!
//! Builds a small squad hierarchy, runs it for a fixed number of frames while
//! spawning short-lived debris, then writes the scene to JSON and reads it
//! back into a fresh entity manager.

use std::path::PathBuf;
use std::sync::Arc;

use rand::Rng;
use scene_engine::animation::AnimationManager;
use scene_engine::prelude::*;

const CONFIG_PATH: &str = "scene_demo/config.toml";
const DEFAULT_SCENE_PATH: &str = "scene_demo.json";
const SPAWN_INTERVAL: u64 = 10;

struct SceneDemoApp {
    squad: Option<EntityId>,
    spawned: usize,
    scene_path: PathBuf,
}

impl SceneDemoApp {
    fn new(scene_path: PathBuf) -> Self {
        Self {
            squad: None,
            spawned: 0,
            scene_path,
        }
    }

    fn spawn_debris(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let mut rng = rand::thread_rng();
        let velocity = Vec3::new(
            rng.gen_range(-2.0..2.0),
            rng.gen_range(1.0..4.0),
            rng.gen_range(-2.0..2.0),
        );
        let spin = Vec3::new(0.0, rng.gen_range(-3.0..3.0), 0.0);

        let name = format!("debris_{}", self.spawned);
        let debris = engine.entities.create_entity(
            self.squad,
            &name,
            Some(string_id("Crate")),
            Some(string_id("Wood")),
            &Transform::identity().with_uniform_scale(0.25),
        )?;
        let mut movement = MovementComponent::with_velocity(velocity)
            .acceleration(Vec3::new(0.0, -9.81, 0.0))
            .damping(0.05);
        movement.angular_velocity = spin;
        engine.entities.insert_component(debris, movement)?;
        engine
            .entities
            .insert_component(debris, Lifetime::new(rng.gen_range(0.5..1.5)))?;

        self.spawned += 1;
        log::debug!("Spawned {} with velocity {:?}", name, velocity);
        Ok(())
    }

    fn save_and_reload(&self, engine: &Engine) -> Result<(), AppError> {
        engine.save_scene(&self.scene_path.to_string_lossy())?;

        let mut reloaded = EntityManager::new(Arc::clone(engine.entities.registry()));
        let mut animations = AnimationManager::new();
        let summary = reloaded.load(&self.scene_path, &engine.resources, &mut animations)?;

        log::info!(
            "Reloaded {} entities from {} ({} skipped components, {} animated)",
            summary.created.len(),
            self.scene_path.display(),
            summary.skipped.len(),
            animations.len()
        );
        for view in reloaded.entities() {
            log::info!(
                "  {} '{}' at {:?} parent {:?}",
                view.id,
                view.name,
                view.transform.position,
                view.parent
            );
        }
        Ok(())
    }
}

impl Application for SceneDemoApp {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let soldier_mesh = engine.resources.register_mesh("Soldier", true)?;
        let crate_mesh = engine.resources.register_mesh("Crate", false)?;
        let camo = engine.resources.register_material("Camo")?;
        engine.resources.register_material("Wood")?;

        let squad = engine.entities.create_entity(
            None,
            "squad",
            None,
            None,
            &Transform::from_position(Vec3::new(0.0, 0.0, -10.0)),
        )?;
        engine
            .entities
            .insert_component(squad, MovementComponent::with_angular_velocity(Vec3::new(0.0, 0.5, 0.0)))?;

        for i in 0..3u8 {
            let offset = f32::from(i) * 2.0 - 2.0;
            let soldier = engine.entities.create_entity(
                Some(squad),
                &format!("soldier_{}", i),
                Some(soldier_mesh),
                Some(camo),
                &Transform::from_position(Vec3::new(offset, 0.0, 0.0)),
            )?;
            engine
                .entities
                .insert_component(soldier, AnimationComponent::new("Walk", 1.2))?;
            engine.animations.register_entity(soldier, soldier_mesh);
        }

        engine.entities.create_entity(
            Some(squad),
            "supply_crate",
            Some(crate_mesh),
            None,
            &Transform::from_position(Vec3::new(0.0, 0.0, 3.0)),
        )?;

        self.squad = Some(squad);
        log::info!("Demo scene built with {} entities", engine.entities.alive_count());
        Ok(())
    }

    fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        if engine.timer().frame_count() % SPAWN_INTERVAL == 0 {
            self.spawn_debris(engine)?;
        }
        Ok(())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        log::info!(
            "Spawned {} debris, {} entities alive ({} active)",
            self.spawned,
            engine.entities.alive_count(),
            engine.entities.active_count()
        );
        if let Some(squad) = self.squad {
            if let Ok(position) = engine.entities.world_position(squad) {
                log::info!("Squad world position {:?}", position);
            }
        }
        if let Err(e) = self.save_and_reload(engine) {
            log::error!("Scene round trip failed: {}", e);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ApplicationConfig::load_or_default(CONFIG_PATH)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.engine.log_level)).init();
    log::info!("Starting {}", config.name);

    let scene_path = PathBuf::from(
        config
            .scene
            .scene_path
            .clone()
            .unwrap_or_else(|| DEFAULT_SCENE_PATH.to_string()),
    );

    let registry = Arc::new(ComponentRegistry::with_builtin_components()?);
    let mut app = SceneDemoApp::new(scene_path);
    Engine::run(config, registry, &mut app)?;

    log::info!("Demo finished");
    Ok(())
}
