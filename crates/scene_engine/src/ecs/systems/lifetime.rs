//! Lifetime system
//!
//! Ages every `Lifetime` component and removes entities whose time is up.
//! Removal cascades to the entity's descendants.

use crate::ecs::components::Lifetime;
use crate::ecs::system::{System, SystemContext};
use crate::ecs::{ComponentKind, EcsError, EntityId};

/// Removes entities when their lifetime expires
#[derive(Debug, Default)]
pub struct LifetimeSystem {
    expired: Vec<EntityId>,
    removed_total: usize,
}

impl LifetimeSystem {
    /// Creates a new lifetime system
    pub fn new() -> Self {
        Self::default()
    }

    /// Entities removed since the system was created, descendants included
    pub fn removed_total(&self) -> usize {
        self.removed_total
    }
}

impl System for LifetimeSystem {
    fn name(&self) -> &str {
        "LifetimeSystem"
    }

    fn required_components(&self) -> &[ComponentKind] {
        &[ComponentKind::Lifetime]
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>, delta_time: f32) -> Result<(), EcsError> {
        self.expired.clear();
        for entity in self.query_entities(ctx.entities) {
            if let Some(lifetime) = ctx.entities.component_mut::<Lifetime>(entity) {
                lifetime.advance(delta_time);
                if lifetime.is_expired() {
                    self.expired.push(entity);
                }
            }
        }
        Ok(())
    }

    fn post_update(&mut self, ctx: &mut SystemContext<'_>) -> Result<(), EcsError> {
        for entity in self.expired.drain(..) {
            // An earlier removal this frame may already have taken it out
            // as a descendant.
            if !ctx.entities.is_alive(entity) {
                continue;
            }
            let removed = ctx.entities.remove(entity)?;
            for &id in &removed {
                ctx.animations.unregister_entity(id);
            }
            log::debug!("Lifetime expired for {} ({} removed)", entity, removed.len());
            self.removed_total += removed.len();
        }
        Ok(())
    }
}
