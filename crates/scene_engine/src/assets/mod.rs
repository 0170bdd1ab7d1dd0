//! Asset management
//!
//! The entity layer only needs names and a little mesh metadata from the
//! asset side; both are served through [`ResourceProvider`].

pub mod resource_manager;

pub use resource_manager::{MeshInfo, ResourceError, ResourceManager, ResourceProvider};
