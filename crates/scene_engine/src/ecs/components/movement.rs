//! Movement component for entities that move through their parent's space
//!
//! Integrated once per frame by the movement system, which writes the result
//! into the entity's local transform.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{Transform, Vec3};

/// Linear and angular velocity state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MovementComponent {
    /// Linear velocity in units per second
    pub velocity: Vec3,

    /// Linear acceleration in units per second squared
    pub acceleration: Vec3,

    /// Angular velocity in radians per second (pitch, yaw, roll)
    pub angular_velocity: Vec3,

    /// Maximum speed limit (0 = no limit)
    pub max_speed: f32,

    /// Damping factor for velocity (0 = no damping, 1 = instant stop)
    pub linear_damping: f32,

    /// Whether movement is enabled
    pub enabled: bool,
}

impl Default for MovementComponent {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            angular_velocity: Vec3::zeros(),
            max_speed: 0.0,
            linear_damping: 0.0,
            enabled: true,
        }
    }
}

impl MovementComponent {
    /// Create a movement component with initial velocity
    pub fn with_velocity(velocity: Vec3) -> Self {
        Self {
            velocity,
            ..Default::default()
        }
    }

    /// Create a movement component that only spins
    pub fn with_angular_velocity(angular_velocity: Vec3) -> Self {
        Self {
            angular_velocity,
            ..Default::default()
        }
    }

    /// Builder pattern: set acceleration
    pub fn acceleration(mut self, acceleration: Vec3) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Builder pattern: set maximum speed
    pub fn max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed.max(0.0);
        self
    }

    /// Builder pattern: set linear damping
    pub fn damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping.clamp(0.0, 1.0);
        self
    }

    /// Advance velocity by one step
    pub fn integrate(&mut self, delta_time: f32) {
        if !self.enabled {
            return;
        }

        self.velocity += self.acceleration * delta_time;

        if self.max_speed > 0.0 {
            let speed = self.velocity.magnitude();
            if speed > self.max_speed {
                self.velocity = self.velocity.normalize() * self.max_speed;
            }
        }

        if self.linear_damping > 0.0 {
            self.velocity *= (1.0 - self.linear_damping * delta_time).max(0.0);
        }
    }

    /// Move `transform` by the current velocities
    pub fn apply(&self, transform: &mut Transform, delta_time: f32) {
        if !self.enabled {
            return;
        }
        transform.position += self.velocity * delta_time;
        transform.rotation += self.angular_velocity * delta_time;
    }
}
