//! Lifetime Component
//!
//! Tracks how long an entity has existed so the lifetime system can remove it.

use serde::{Deserialize, Serialize};

/// Lifetime component for entities that should be removed after a duration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Lifetime {
    /// How long the entity should live in seconds (0 = forever)
    pub duration: f32,
    /// Seconds lived so far
    pub elapsed: f32,
}

impl Lifetime {
    /// Create a new lifetime component
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            elapsed: 0.0,
        }
    }

    /// Age the entity by one frame
    pub fn advance(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
    }

    /// Check if this entity's lifetime has expired
    pub fn is_expired(&self) -> bool {
        if self.duration <= 0.0 {
            false // Infinite lifetime
        } else {
            self.elapsed >= self.duration
        }
    }

    /// Get remaining lifetime in seconds
    pub fn remaining(&self) -> f32 {
        if self.duration <= 0.0 {
            f32::INFINITY
        } else {
            (self.duration - self.elapsed).max(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_expires() {
        let mut lifetime = Lifetime::new(5.0);
        lifetime.advance(2.0);
        assert!(!lifetime.is_expired());
        assert_eq!(lifetime.remaining(), 3.0);
        lifetime.advance(4.0);
        assert!(lifetime.is_expired());
        assert_eq!(lifetime.remaining(), 0.0);
    }

    #[test]
    fn test_infinite_lifetime() {
        let mut lifetime = Lifetime::new(0.0);
        lifetime.advance(1000.0);
        assert!(!lifetime.is_expired());
        assert_eq!(lifetime.remaining(), f32::INFINITY);
    }
}
