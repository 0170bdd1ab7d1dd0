//! Core engine implementation

use std::sync::Arc;

use crate::{
    animation::AnimationManager,
    application::Application,
    assets::ResourceManager,
    core::config::ApplicationConfig,
    ecs::{
        systems::{AnimationSystem, LifetimeSystem, MovementSystem},
        ComponentRegistry, EcsError, EntityManager, LoadSummary, PersistenceError, SystemContext,
        SystemManager,
    },
    foundation::{logging, time::Timer},
};
use thiserror::Error;

pub use crate::core::config::EngineConfig;

/// Main engine struct
///
/// The engine owns the entity manager, the systems and their collaborators,
/// and drives the frame loop.
pub struct Engine {
    /// Entities, components and the scene graph
    pub entities: EntityManager,

    /// Registered systems
    pub systems: SystemManager,

    /// Mesh and name table
    pub resources: ResourceManager,

    /// Animated mesh bindings
    pub animations: AnimationManager,

    /// Frame timing
    timer: Timer,

    /// Configuration the engine was built from
    config: ApplicationConfig,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance with the built-in systems registered
    pub fn new(config: ApplicationConfig, registry: Arc<ComponentRegistry>) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        log::info!("Initializing engine for {}...", config.name);

        let entities = EntityManager::with_capacity(registry, config.scene.initial_capacity);
        let mut systems = SystemManager::new();
        systems.register_system(MovementSystem::new());
        systems.register_system(LifetimeSystem::new());
        systems.register_system(AnimationSystem::new());

        Ok(Self {
            entities,
            systems,
            resources: ResourceManager::new(),
            animations: AnimationManager::new(),
            timer: Timer::new(),
            config,
            running: true,
        })
    }

    /// Initialize logging from the configuration and run the engine main loop
    /// with the given application
    pub fn run<T: Application>(
        config: ApplicationConfig,
        registry: Arc<ComponentRegistry>,
        app: &mut T,
    ) -> Result<(), EngineError> {
        logging::init_with_level(&config.engine.log_level);
        let mut engine = Self::new(config, registry)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {}", e)))?;
        engine.systems.register_systems(app.systems());
        engine.init_systems()?;

        log::info!("Starting main loop...");

        while engine.running {
            let delta_time = match engine.config.engine.fixed_delta {
                Some(step) => engine.timer.advance(step),
                None => engine.timer.tick(),
            };

            app.update(&mut engine, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {}", e)))?;

            engine.tick(delta_time)?;

            if let Some(limit) = engine.config.engine.max_frames {
                if engine.timer.frame_count() >= limit {
                    log::info!("Frame limit {} reached", limit);
                    engine.running = false;
                }
            }
        }

        app.cleanup(&mut engine);
        engine.shutdown_systems()?;

        log::info!(
            "Engine shutdown complete after {} frames ({:.1} average fps)",
            engine.timer.frame_count(),
            engine.timer.average_fps()
        );
        Ok(())
    }

    /// Initialize every registered system
    pub fn init_systems(&mut self) -> Result<(), EngineError> {
        let mut ctx = SystemContext::new(&mut self.entities, &self.resources, &mut self.animations);
        self.systems.init(&mut ctx)?;
        Ok(())
    }

    /// Run every system for one frame, then refresh cached world transforms
    pub fn tick(&mut self, delta_time: f32) -> Result<(), EngineError> {
        let mut ctx = SystemContext::new(&mut self.entities, &self.resources, &mut self.animations);
        self.systems.update(&mut ctx, delta_time)?;
        self.entities.refresh_world_transforms();
        Ok(())
    }

    /// Shut every registered system down
    pub fn shutdown_systems(&mut self) -> Result<(), EngineError> {
        let mut ctx = SystemContext::new(&mut self.entities, &self.resources, &mut self.animations);
        self.systems.shutdown(&mut ctx)?;
        Ok(())
    }

    /// Load a scene file into the entity manager
    pub fn load_scene(&mut self, path: &str) -> Result<LoadSummary, EngineError> {
        Ok(self.entities.load(path, &self.resources, &mut self.animations)?)
    }

    /// Save the entity manager to a scene file
    pub fn save_scene(&self, path: &str) -> Result<(), EngineError> {
        Ok(self.entities.save_to_file(path, &self.resources)?)
    }

    /// Collaborator bundle for calling system code by hand
    pub fn system_context(&mut self) -> SystemContext<'_> {
        SystemContext::new(&mut self.entities, &self.resources, &mut self.animations)
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the loop keeps running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frame timer
    pub fn timer(&self) -> &Timer {
        &self.timer
    }

    /// Configuration the engine was built from
    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Entity layer or system failure
    #[error("ECS error: {0}")]
    Ecs(#[from] EcsError),

    /// Scene file failure
    #[error("Scene file error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Application callback failed
    #[error("Application error: {0}")]
    ApplicationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::AppError;
    use crate::ecs::components::MovementComponent;
    use crate::ecs::EntityId;
    use crate::foundation::math::{Transform, Vec3};
    use approx::assert_relative_eq;

    struct Mover {
        entity: Option<EntityId>,
        updates: u32,
        cleaned_up: bool,
    }

    impl Application for Mover {
        fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
            let entity = engine
                .entities
                .create_entity(None, "mover", None, None, &Transform::identity())?;
            engine
                .entities
                .insert_component(entity, MovementComponent::with_velocity(Vec3::new(1.0, 0.0, 0.0)))?;
            self.entity = Some(entity);
            Ok(())
        }

        fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
            self.updates += 1;
            Ok(())
        }

        fn cleanup(&mut self, engine: &mut Engine) {
            self.cleaned_up = true;
            if let Some(entity) = self.entity {
                assert_relative_eq!(engine.entities.position(entity).unwrap(), Vec3::new(0.5, 0.0, 0.0), epsilon = 1e-4);
            }
        }
    }

    fn config() -> ApplicationConfig {
        ApplicationConfig::new("engine-test")
            .with_engine(EngineConfig::new().with_max_frames(5).with_fixed_delta(0.1))
    }

    #[test]
    fn test_run_stops_at_frame_limit() {
        let registry = Arc::new(ComponentRegistry::with_builtin_components().unwrap());
        let mut app = Mover {
            entity: None,
            updates: 0,
            cleaned_up: false,
        };
        Engine::run(config(), registry, &mut app).unwrap();
        assert_eq!(app.updates, 5);
        assert!(app.cleaned_up);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let registry = Arc::new(ComponentRegistry::new());
        let config = ApplicationConfig::new("");
        assert!(matches!(Engine::new(config, registry), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_engine_registers_builtin_systems() {
        let registry = Arc::new(ComponentRegistry::with_builtin_components().unwrap());
        let engine = Engine::new(config(), registry).unwrap();
        assert_eq!(
            engine.systems.system_names(),
            vec!["MovementSystem", "LifetimeSystem", "AnimationSystem"]
        );
    }
}
