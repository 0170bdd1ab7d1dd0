//! Animation system
//!
//! Advances the playback cursor of every active `AnimationComponent`.

use crate::ecs::components::AnimationComponent;
use crate::ecs::system::{System, SystemContext};
use crate::ecs::{ComponentKind, EcsError};

/// Steps animation playback
#[derive(Debug, Default)]
pub struct AnimationSystem;

impl AnimationSystem {
    /// Creates a new animation system
    pub fn new() -> Self {
        Self
    }
}

impl System for AnimationSystem {
    fn name(&self) -> &str {
        "AnimationSystem"
    }

    fn required_components(&self) -> &[ComponentKind] {
        &[ComponentKind::Animation]
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>, delta_time: f32) -> Result<(), EcsError> {
        for entity in self.query_entities(ctx.entities) {
            if let Some(animation) = ctx.entities.component_mut::<AnimationComponent>(entity) {
                animation.advance(delta_time);
            }
        }
        Ok(())
    }
}
