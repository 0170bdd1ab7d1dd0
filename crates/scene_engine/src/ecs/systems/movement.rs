//! Movement system
//!
//! Integrates every active `MovementComponent` and writes the result into the
//! owning entity's local transform.

use crate::ecs::components::MovementComponent;
use crate::ecs::system::{System, SystemContext};
use crate::ecs::{ComponentKind, EcsError};

/// Applies velocities to entity transforms
#[derive(Debug, Default)]
pub struct MovementSystem;

impl MovementSystem {
    /// Creates a new movement system
    pub fn new() -> Self {
        Self
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "MovementSystem"
    }

    fn required_components(&self) -> &[ComponentKind] {
        &[ComponentKind::Movement]
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>, delta_time: f32) -> Result<(), EcsError> {
        for entity in self.query_entities(ctx.entities) {
            let Some(movement) = ctx.entities.component_mut::<MovementComponent>(entity) else {
                continue;
            };
            movement.integrate(delta_time);
            let movement = movement.clone();

            let mut transform = ctx.entities.transform(entity)?;
            movement.apply(&mut transform, delta_time);
            ctx.entities.set_transform(entity, &transform)?;
        }
        Ok(())
    }
}
