//! Scene management
//!
//! The scene graph owns the transform hierarchy behind every entity. The
//! entity manager creates one node per entity and keeps the mapping; systems
//! and applications normally go through the entity manager rather than the
//! graph directly.

mod scene_graph;

pub use scene_graph::{NodeId, SceneError, SceneGraph};
