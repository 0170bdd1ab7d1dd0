//! Error types for the entity layer

use super::component::ComponentKind;
use super::entity::EntityId;
use crate::foundation::hash::HashId;
use crate::scene::SceneError;

/// Entity manager, registry and system errors
#[derive(thiserror::Error, Debug)]
pub enum EcsError {
    /// Entity id past the end of the backing arrays
    #[error("Entity {0} is out of range")]
    EntityOutOfRange(EntityId),

    /// Entity id refers to a removed slot
    #[error("Entity {0} has been removed")]
    EntityNotAlive(EntityId),

    /// No registered component type under this name
    #[error("Unknown component type: {0}")]
    UnknownComponent(String),

    /// Payload does not match the container it was sent to
    #[error("Component {expected} cannot hold a {found} value")]
    ComponentKindMismatch {
        /// Kind of the target container
        expected: ComponentKind,
        /// Kind of the supplied value
        found: ComponentKind,
    },

    /// Two different type names share one hash key
    #[error("Component name {name} collides with {existing} on key {key}")]
    HashCollision {
        /// Name being registered
        name: String,
        /// Name already holding the key
        existing: String,
        /// Shared key
        key: HashId,
    },

    /// Component value could not be encoded or decoded
    #[error("Component {component} serialization failed: {source}")]
    Serialization {
        /// Registered component name
        component: &'static str,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// Scene graph error
    #[error("Scene graph error: {0}")]
    Scene(#[from] SceneError),

    /// A system reported a failure
    #[error("System {system} failed: {message}")]
    System {
        /// Name of the failing system
        system: String,
        /// Failure description
        message: String,
    },
}

/// Scene file save/load errors
#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed scene document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Entity layer rejected the document contents
    #[error("Entity error: {0}")]
    Ecs(#[from] EcsError),
}
