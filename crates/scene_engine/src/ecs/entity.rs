//! Entity identifiers and read-only entity snapshots

use std::fmt;

use crate::foundation::hash::HashId;
use crate::foundation::math::Transform;

/// Entity identifier
///
/// Ids are dense and recycled: once an entity is removed its id may be handed
/// out again by the next create call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Slot of this entity in the manager's backing arrays
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity#{}", self.0)
    }
}

/// Snapshot of one entity's scene-level state
///
/// Returned by the entity manager and accepted back by
/// `EntityManager::update_entity` to write several fields at once.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    /// Entity id
    pub id: EntityId,
    /// Name the entity was created with
    pub name: String,
    /// Parent entity; `None` when attached to the graph root
    pub parent: Option<EntityId>,
    /// Mesh key
    pub mesh: Option<HashId>,
    /// Material key
    pub material: Option<HashId>,
    /// Local transform
    pub transform: Transform,
    /// Active flag
    pub active: bool,
}
