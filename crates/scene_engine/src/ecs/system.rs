//! System trait and per-frame context

use super::component::ComponentKind;
use super::entity::EntityId;
use super::entity_manager::EntityManager;
use super::error::EcsError;
use crate::animation::AnimationRegistrar;
use crate::assets::ResourceProvider;

/// Everything a system may touch during a frame
pub struct SystemContext<'a> {
    /// Entities and components
    pub entities: &'a mut EntityManager,
    /// Read access to mesh and name data
    pub resources: &'a dyn ResourceProvider,
    /// Animation bindings
    pub animations: &'a mut dyn AnimationRegistrar,
}

impl<'a> SystemContext<'a> {
    /// Bundle the frame collaborators
    pub fn new(
        entities: &'a mut EntityManager,
        resources: &'a dyn ResourceProvider,
        animations: &'a mut dyn AnimationRegistrar,
    ) -> Self {
        Self {
            entities,
            resources,
            animations,
        }
    }
}

/// Per-frame logic over the entities matching a component signature.
///
/// Each frame a system gets `pre_update`, `update` and `post_update` in that
/// order before the next system starts. Every hook defaults to doing nothing.
pub trait System {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Component kinds an entity must hold to be processed
    fn required_components(&self) -> &[ComponentKind] {
        &[]
    }

    /// Called once before the first frame
    fn init(&mut self, _ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        Ok(())
    }

    /// Called at the start of every frame
    fn pre_update(&mut self, _ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        Ok(())
    }

    /// Called every frame with the frame delta in seconds
    fn update(&mut self, _ctx: &mut SystemContext<'_>, _delta_time: f32) -> Result<(), EcsError> {
        Ok(())
    }

    /// Called at the end of every frame
    fn post_update(&mut self, _ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        Ok(())
    }

    /// Called once when the engine stops
    fn shutdown(&mut self, _ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        Ok(())
    }

    /// Active entities holding every required component, sorted by id
    fn query_entities(&self, entities: &EntityManager) -> Vec<EntityId> {
        entities.multi_component_entities(self.required_components())
    }
}
