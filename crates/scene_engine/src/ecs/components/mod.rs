//! ECS Components module
//!
//! Contains every component type the entity manager can store.

pub mod animation;
pub mod lifetime;
pub mod movement;

pub use animation::{AnimationBufferComponent, AnimationComponent};
pub use lifetime::Lifetime;
pub use movement::MovementComponent;
