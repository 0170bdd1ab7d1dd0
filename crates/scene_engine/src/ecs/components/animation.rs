//! Skeletal animation components
//!
//! `AnimationComponent` holds the playback cursor for an animated mesh and
//! `AnimationBufferComponent` records which skinning buffer the renderer
//! should bind for the entity.

use serde::{Deserialize, Serialize};

/// Playback state of one animation clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AnimationComponent {
    /// Clip name within the mesh's animation set
    pub clip: String,
    /// Playback position in seconds
    pub time: f32,
    /// Clip length in seconds
    pub duration: f32,
    /// Playback rate multiplier
    pub speed: f32,
    /// Wrap around at the end instead of stopping
    pub looping: bool,
    /// Whether the cursor advances
    pub playing: bool,
}

impl Default for AnimationComponent {
    fn default() -> Self {
        Self {
            clip: String::new(),
            time: 0.0,
            duration: 0.0,
            speed: 1.0,
            looping: true,
            playing: true,
        }
    }
}

impl AnimationComponent {
    /// Start playing `clip` from the beginning
    pub fn new(clip: impl Into<String>, duration: f32) -> Self {
        Self {
            clip: clip.into(),
            duration: duration.max(0.0),
            ..Default::default()
        }
    }

    /// Builder pattern: set playback rate
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Builder pattern: play once and stop at the end
    pub fn once(mut self) -> Self {
        self.looping = false;
        self
    }

    /// Move the cursor forward by `delta_time` scaled by the playback rate
    pub fn advance(&mut self, delta_time: f32) {
        if !self.playing {
            return;
        }
        self.time += delta_time * self.speed;

        if self.duration <= 0.0 {
            self.time = 0.0;
        } else if self.looping {
            self.time = self.time.rem_euclid(self.duration);
        } else if self.time >= self.duration {
            self.time = self.duration;
            self.playing = false;
        }
    }

    /// Playback position as a fraction of the clip
    pub fn progress(&self) -> f32 {
        if self.duration > 0.0 {
            self.time / self.duration
        } else {
            0.0
        }
    }
}

/// Skinning buffer slot assigned to an animated entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AnimationBufferComponent {
    /// Index of the bone palette buffer
    pub buffer_index: u32,
    /// Number of bone matrices in the palette
    pub bone_count: u32,
}

impl AnimationBufferComponent {
    /// Create a buffer binding
    pub fn new(buffer_index: u32, bone_count: u32) -> Self {
        Self {
            buffer_index,
            bone_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_looping_wraps() {
        let mut animation = AnimationComponent::new("Walk", 1.0);
        animation.advance(1.25);
        assert_relative_eq!(animation.time, 0.25, epsilon = 1e-5);
        assert!(animation.playing);
    }

    #[test]
    fn test_once_stops_at_end() {
        let mut animation = AnimationComponent::new("Jump", 1.0).once().with_speed(2.0);
        animation.advance(0.75);
        assert_relative_eq!(animation.time, 1.0);
        assert!(!animation.playing);
        assert_relative_eq!(animation.progress(), 1.0);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let animation: AnimationComponent = serde_json::from_str(r#"{"Clip":"Idle"}"#).unwrap();
        assert_eq!(animation.clip, "Idle");
        assert_relative_eq!(animation.speed, 1.0);
    }
}
