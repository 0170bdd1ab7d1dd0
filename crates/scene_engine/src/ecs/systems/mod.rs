//! ECS Systems module
//!
//! Built-in systems the engine registers for itself.

pub mod animation;
pub mod lifetime;
pub mod movement;

pub use animation::AnimationSystem;
pub use lifetime::LifetimeSystem;
pub use movement::MovementSystem;
