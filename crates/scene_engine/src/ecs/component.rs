//! Component trait and the closed set of component kinds
//!
//! Every component type the engine can store is listed in [`ComponentKind`]
//! and carried type-erased as [`ComponentData`]. Containers are created by the
//! registry from the hashed type name, so the string name is part of a
//! component's identity and doubles as its key in scene files.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::components::{AnimationBufferComponent, AnimationComponent, Lifetime, MovementComponent};

/// Trait for component types held in a `ComponentStore`
pub trait Component: Clone + Default + fmt::Debug + Serialize + DeserializeOwned + 'static {
    /// Registered type name, also used as the scene file key
    const NAME: &'static str;

    /// Kind tag of this type
    const KIND: ComponentKind;

    /// Wrap into the type-erased payload
    fn into_data(self) -> ComponentData;

    /// Unwrap from the type-erased payload; `None` on a kind mismatch
    fn from_data(data: ComponentData) -> Option<Self>;
}

/// Tag for each storable component type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// [`AnimationComponent`]
    Animation,
    /// [`AnimationBufferComponent`]
    AnimationBuffer,
    /// [`MovementComponent`]
    Movement,
    /// [`Lifetime`]
    Lifetime,
}

impl ComponentKind {
    /// Every kind, in registration order
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Animation,
        ComponentKind::AnimationBuffer,
        ComponentKind::Movement,
        ComponentKind::Lifetime,
    ];

    /// Registered type name of this kind
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Animation => AnimationComponent::NAME,
            ComponentKind::AnimationBuffer => AnimationBufferComponent::NAME,
            ComponentKind::Movement => MovementComponent::NAME,
            ComponentKind::Lifetime => Lifetime::NAME,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type-erased component value
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentData {
    /// Animation playback state
    Animation(AnimationComponent),
    /// Skinning buffer binding
    AnimationBuffer(AnimationBufferComponent),
    /// Velocity integration state
    Movement(MovementComponent),
    /// Timed despawn
    Lifetime(Lifetime),
}

impl ComponentData {
    /// Kind tag of the carried value
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentData::Animation(_) => ComponentKind::Animation,
            ComponentData::AnimationBuffer(_) => ComponentKind::AnimationBuffer,
            ComponentData::Movement(_) => ComponentKind::Movement,
            ComponentData::Lifetime(_) => ComponentKind::Lifetime,
        }
    }
}

macro_rules! impl_component {
    ($ty:ty, $name:literal, $kind:ident) => {
        impl Component for $ty {
            const NAME: &'static str = $name;
            const KIND: ComponentKind = ComponentKind::$kind;

            fn into_data(self) -> ComponentData {
                ComponentData::$kind(self)
            }

            fn from_data(data: ComponentData) -> Option<Self> {
                match data {
                    ComponentData::$kind(value) => Some(value),
                    _ => None,
                }
            }
        }

        impl From<$ty> for ComponentData {
            fn from(value: $ty) -> Self {
                ComponentData::$kind(value)
            }
        }
    };
}

impl_component!(AnimationComponent, "AnimationComponent", Animation);
impl_component!(AnimationBufferComponent, "AnimationBufferComponent", AnimationBuffer);
impl_component!(MovementComponent, "MovementComponent", Movement);
impl_component!(Lifetime, "Lifetime", Lifetime);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_match_types() {
        assert_eq!(ComponentKind::Animation.name(), "AnimationComponent");
        assert_eq!(ComponentKind::AnimationBuffer.name(), "AnimationBufferComponent");
        assert_eq!(ComponentKind::Movement.to_string(), "MovementComponent");
    }

    #[test]
    fn test_data_roundtrip_checks_kind() {
        let data = Lifetime::new(2.0).into_data();
        assert_eq!(data.kind(), ComponentKind::Lifetime);
        assert!(MovementComponent::from_data(data.clone()).is_none());
        assert_eq!(Lifetime::from_data(data), Some(Lifetime::new(2.0)));
    }
}
