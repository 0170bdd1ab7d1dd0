//! Resource Manager - name table and mesh metadata
//!
//! Meshes and materials are referenced from entities by [`HashId`]. The
//! resource manager keeps the reverse mapping back to names (scene files store
//! names, not keys) and the little mesh metadata the entity layer needs.
//! Actual asset loading happens elsewhere and reports in through
//! [`ResourceManager::register_mesh`].

use std::collections::HashMap;

use thiserror::Error;

use crate::foundation::hash::HashId;

/// Resource Manager errors
#[derive(Debug, Error)]
pub enum ResourceError {
    /// Two different names hash to the same key
    #[error("Resource name {name} collides with {existing} on key {key}")]
    NameCollision {
        /// Name being interned
        name: String,
        /// Name already holding the key
        existing: String,
        /// Shared key
        key: HashId,
    },
}

/// Metadata of a loaded mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshInfo {
    /// Mesh name
    pub name: String,
    /// Whether the mesh carries a skeleton and animation clips
    pub animated: bool,
}

impl MeshInfo {
    /// Whether entities using this mesh need an animation binding
    pub fn is_animated(&self) -> bool {
        self.animated
    }
}

/// Read access to resources, as consumed by the entity layer
pub trait ResourceProvider {
    /// Mesh metadata for a key
    fn mesh(&self, key: HashId) -> Option<&MeshInfo>;

    /// Name behind a key
    fn string(&self, key: HashId) -> Option<&str>;
}

/// In-memory resource registry
#[derive(Debug, Default)]
pub struct ResourceManager {
    strings: HashMap<HashId, String>,
    meshes: HashMap<HashId, MeshInfo>,
}

impl ResourceManager {
    /// Create an empty resource manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` and return its key
    pub fn intern(&mut self, name: &str) -> Result<HashId, ResourceError> {
        let key = HashId::of(name);
        match self.strings.get(&key) {
            Some(existing) if existing != name => Err(ResourceError::NameCollision {
                name: name.to_string(),
                existing: existing.clone(),
                key,
            }),
            Some(_) => Ok(key),
            None => {
                self.strings.insert(key, name.to_string());
                Ok(key)
            }
        }
    }

    /// Register a mesh; re-registering updates its metadata
    pub fn register_mesh(&mut self, name: &str, animated: bool) -> Result<HashId, ResourceError> {
        let key = self.intern(name)?;
        self.meshes.insert(
            key,
            MeshInfo {
                name: name.to_string(),
                animated,
            },
        );
        log::debug!("Registered mesh {} (animated: {})", name, animated);
        Ok(key)
    }

    /// Register a material name
    pub fn register_material(&mut self, name: &str) -> Result<HashId, ResourceError> {
        self.intern(name)
    }

    /// Number of known meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }
}

impl ResourceProvider for ResourceManager {
    fn mesh(&self, key: HashId) -> Option<&MeshInfo> {
        self.meshes.get(&key)
    }

    fn string(&self, key: HashId) -> Option<&str> {
        self.strings.get(&key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mesh_lookup() {
        let mut resources = ResourceManager::new();
        let soldier = resources.register_mesh("Soldier", true).unwrap();
        let crate_mesh = resources.register_mesh("Crate", false).unwrap();

        assert!(resources.mesh(soldier).unwrap().is_animated());
        assert!(!resources.mesh(crate_mesh).unwrap().is_animated());
        assert_eq!(resources.string(soldier), Some("Soldier"));
        assert_eq!(resources.mesh_count(), 2);
    }

    #[test]
    fn test_material_is_name_only() {
        let mut resources = ResourceManager::new();
        let key = resources.register_material("Brick").unwrap();
        assert_eq!(key, HashId::of("Brick"));
        assert_eq!(resources.string(key), Some("Brick"));
        assert!(resources.mesh(key).is_none());
    }
}
