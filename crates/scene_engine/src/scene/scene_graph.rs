//! Parent-linked scene graph
//!
//! Nodes live in a flat arena indexed by [`NodeId`]. Slot 0 is the implicit
//! root. Removed nodes are tombstoned and recycled through a free list, so a
//! node id stays stable for as long as the node is allocated.
//!
//! Cached world matrices are computed when a node is created and when
//! [`SceneGraph::update_world_transforms`] or
//! [`SceneGraph::propagate_transforms`] is called. Setters only touch the
//! local transform.

use std::collections::VecDeque;
use std::fmt;

use crate::foundation::math::{matrix_translation, Mat4, Transform, Vec3};

/// Index of a node in the scene graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The implicit root node
    pub const ROOT: NodeId = NodeId(0);

    /// Arena slot of this node
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Scene graph errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Node index past the end of the arena
    #[error("Node {0} is out of range")]
    NodeOutOfRange(NodeId),

    /// Node slot is on the free list
    #[error("Node {0} is not allocated")]
    NodeNotAllocated(NodeId),

    /// The root is owned by the graph
    #[error("The root node cannot be removed")]
    CannotRemoveRoot,
}

#[derive(Debug, Clone)]
struct Node {
    transform: Transform,
    world: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    active: bool,
    allocated: bool,
}

impl Node {
    fn root() -> Self {
        Self {
            transform: Transform::identity(),
            world: Mat4::identity(),
            parent: None,
            children: Vec::new(),
            active: true,
            allocated: true,
        }
    }

    fn reset(&mut self) {
        self.transform = Transform::identity();
        self.world = Mat4::identity();
        self.parent = None;
        self.children.clear();
        self.active = false;
        self.allocated = false;
    }
}

/// Hierarchy of transforms with cached world matrices
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    free_nodes: Vec<NodeId>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Create a graph holding only the root
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    /// Create a graph with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(Node::root());
        Self {
            nodes,
            free_nodes: Vec::new(),
        }
    }

    fn node(&self, node: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(node.index()).ok_or(SceneError::NodeOutOfRange(node))
    }

    fn allocated(&self, node: NodeId) -> Result<&Node, SceneError> {
        let entry = self.node(node)?;
        if entry.allocated {
            Ok(entry)
        } else {
            Err(SceneError::NodeNotAllocated(node))
        }
    }

    fn allocated_mut(&mut self, node: NodeId) -> Result<&mut Node, SceneError> {
        let entry = self
            .nodes
            .get_mut(node.index())
            .ok_or(SceneError::NodeOutOfRange(node))?;
        if entry.allocated {
            Ok(entry)
        } else {
            Err(SceneError::NodeNotAllocated(node))
        }
    }

    /// Create a node under `parent` with the given local transform.
    ///
    /// A recycled slot is preferred over growing the arena.
    pub fn create_node(&mut self, parent: NodeId, transform: &Transform) -> Result<NodeId, SceneError> {
        let parent_world = self.allocated(parent)?.world;

        let entry = Node {
            transform: *transform,
            world: parent_world * transform.to_matrix(),
            parent: Some(parent),
            children: Vec::new(),
            active: true,
            allocated: true,
        };

        let id = match self.free_nodes.pop() {
            Some(id) => {
                self.nodes[id.index()] = entry;
                id
            }
            None => {
                self.nodes.push(entry);
                NodeId((self.nodes.len() - 1) as u32)
            }
        };

        self.nodes[parent.index()].children.push(id);
        Ok(id)
    }

    /// Remove a node and its whole subtree.
    ///
    /// Returns the strict descendants in breadth-first discovery order. The
    /// node and every descendant end up inactive, unlinked and on the free
    /// list.
    pub fn remove_node(&mut self, node: NodeId) -> Result<Vec<NodeId>, SceneError> {
        if node == NodeId::ROOT {
            return Err(SceneError::CannotRemoveRoot);
        }
        let parent = self.allocated(node)?.parent;
        let descendants = self.children(node)?;

        if let Some(parent) = parent {
            self.nodes[parent.index()].children.retain(|&child| child != node);
        }

        for &id in std::iter::once(&node).chain(descendants.iter()) {
            self.nodes[id.index()].reset();
            self.free_nodes.push(id);
        }

        Ok(descendants)
    }

    /// Every strict descendant of `node`, breadth first
    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>, SceneError> {
        let mut result = Vec::new();
        let mut queue: VecDeque<NodeId> = self.allocated(node)?.children.iter().copied().collect();

        while let Some(id) = queue.pop_front() {
            result.push(id);
            queue.extend(self.nodes[id.index()].children.iter().copied());
        }

        Ok(result)
    }

    /// Immediate children of `node` in insertion order
    pub fn direct_children(&self, node: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(&self.allocated(node)?.children)
    }

    /// Parent of `node`; `None` for the root
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.allocated(node)?.parent)
    }

    /// Replace the local transform
    pub fn set_transform(&mut self, node: NodeId, transform: &Transform) -> Result<(), SceneError> {
        self.allocated_mut(node)?.transform = *transform;
        Ok(())
    }

    /// Set the local position
    pub fn set_translation(&mut self, node: NodeId, position: Vec3) -> Result<(), SceneError> {
        self.allocated_mut(node)?.transform.position = position;
        Ok(())
    }

    /// Set the local Euler rotation in radians
    pub fn set_rotation(&mut self, node: NodeId, rotation: Vec3) -> Result<(), SceneError> {
        self.allocated_mut(node)?.transform.rotation = rotation;
        Ok(())
    }

    /// Set the local scale
    pub fn set_scale(&mut self, node: NodeId, scale: Vec3) -> Result<(), SceneError> {
        self.allocated_mut(node)?.transform.scale = scale;
        Ok(())
    }

    /// Set the active flag of a single node
    pub fn set_active(&mut self, node: NodeId, active: bool) -> Result<(), SceneError> {
        self.allocated_mut(node)?.active = active;
        Ok(())
    }

    /// Local transform
    pub fn transform(&self, node: NodeId) -> Result<Transform, SceneError> {
        Ok(self.allocated(node)?.transform)
    }

    /// Local position
    pub fn translation(&self, node: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.allocated(node)?.transform.position)
    }

    /// Local Euler rotation in radians
    pub fn rotation(&self, node: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.allocated(node)?.transform.rotation)
    }

    /// Local scale
    pub fn scale(&self, node: NodeId) -> Result<Vec3, SceneError> {
        Ok(self.allocated(node)?.transform.scale)
    }

    /// Cached world matrix
    pub fn world_matrix(&self, node: NodeId) -> Result<Mat4, SceneError> {
        Ok(self.allocated(node)?.world)
    }

    /// Translation of the cached world matrix
    pub fn world_position(&self, node: NodeId) -> Result<Vec3, SceneError> {
        Ok(matrix_translation(&self.allocated(node)?.world))
    }

    /// Whether the node is allocated and active
    pub fn is_active(&self, node: NodeId) -> bool {
        self.node(node).map(|n| n.allocated && n.active).unwrap_or(false)
    }

    /// Whether the slot currently holds a node
    pub fn is_allocated(&self, node: NodeId) -> bool {
        self.node(node).map(|n| n.allocated).unwrap_or(false)
    }

    /// Number of arena slots, root and free slots included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A graph always holds its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of recyclable slots
    pub fn free_count(&self) -> usize {
        self.free_nodes.len()
    }

    /// Recompute every cached world matrix from the root down
    pub fn update_world_transforms(&mut self) {
        self.refresh_subtree(NodeId::ROOT, Mat4::identity());
    }

    /// Recompute the cached world matrices of `node` and its subtree
    pub fn propagate_transforms(&mut self, node: NodeId) -> Result<(), SceneError> {
        let parent_world = match self.allocated(node)?.parent {
            Some(parent) => self.nodes[parent.index()].world,
            None => Mat4::identity(),
        };
        self.refresh_subtree(node, parent_world);
        Ok(())
    }

    fn refresh_subtree(&mut self, node: NodeId, parent_world: Mat4) {
        let mut queue = VecDeque::from([(node, parent_world)]);
        while let Some((id, parent_world)) = queue.pop_front() {
            let entry = &mut self.nodes[id.index()];
            entry.world = parent_world * entry.transform.to_matrix();
            let world = entry.world;
            queue.extend(entry.children.iter().map(|&child| (child, world)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_new_graph_has_active_root() {
        let graph = SceneGraph::new();
        assert_eq!(graph.len(), 1);
        assert!(graph.is_active(NodeId::ROOT));
        assert_eq!(graph.parent(NodeId::ROOT), Ok(None));
        assert_relative_eq!(graph.world_matrix(NodeId::ROOT).unwrap(), Mat4::identity());
    }

    #[test]
    fn test_world_matrix_composes_with_parent() {
        let mut graph = SceneGraph::new();
        let parent = graph
            .create_node(NodeId::ROOT, &Transform::from_position(Vec3::new(0.0, 5.0, 0.0)))
            .unwrap();
        let child = graph
            .create_node(parent, &Transform::from_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();

        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::new(1.0, 5.0, 0.0), epsilon = EPSILON);
        assert_eq!(graph.direct_children(parent).unwrap(), &[child]);
        assert_eq!(graph.parent(child), Ok(Some(parent)));
    }

    #[test]
    fn test_create_under_bad_parent() {
        let mut graph = SceneGraph::new();
        assert_eq!(
            graph.create_node(NodeId(7), &Transform::identity()),
            Err(SceneError::NodeOutOfRange(NodeId(7)))
        );

        let node = graph.create_node(NodeId::ROOT, &Transform::identity()).unwrap();
        graph.remove_node(node).unwrap();
        assert_eq!(
            graph.create_node(node, &Transform::identity()),
            Err(SceneError::NodeNotAllocated(node))
        );
    }

    #[test]
    fn test_remove_returns_bfs_descendants() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(NodeId::ROOT, &Transform::identity()).unwrap();
        let b = graph.create_node(a, &Transform::identity()).unwrap();
        let c = graph.create_node(a, &Transform::identity()).unwrap();
        let d = graph.create_node(b, &Transform::identity()).unwrap();
        let e = graph.create_node(c, &Transform::identity()).unwrap();

        let removed = graph.remove_node(a).unwrap();
        assert_eq!(removed, vec![b, c, d, e]);

        for node in [a, b, c, d, e] {
            assert!(!graph.is_active(node));
            assert!(!graph.is_allocated(node));
        }
        assert!(graph.direct_children(NodeId::ROOT).unwrap().is_empty());
        assert_eq!(graph.free_count(), 5);
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut graph = SceneGraph::new();
        assert_eq!(graph.remove_node(NodeId::ROOT), Err(SceneError::CannotRemoveRoot));
    }

    #[test]
    fn test_slots_are_reused() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node(NodeId::ROOT, &Transform::from_position(Vec3::new(3.0, 0.0, 0.0))).unwrap();
        graph.remove_node(a).unwrap();

        let b = graph.create_node(NodeId::ROOT, &Transform::identity()).unwrap();
        assert_eq!(a, b);
        assert_eq!(graph.len(), 2);
        assert!(graph.is_active(b));
        assert_relative_eq!(graph.translation(b).unwrap(), Vec3::zeros());
    }

    #[test]
    fn test_setters_defer_world_update() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node(NodeId::ROOT, &Transform::identity()).unwrap();
        let child = graph
            .create_node(parent, &Transform::from_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();

        graph.set_translation(parent, Vec3::new(0.0, 0.0, 2.0)).unwrap();
        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::new(1.0, 0.0, 0.0), epsilon = EPSILON);

        graph.update_world_transforms();
        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::new(1.0, 0.0, 2.0), epsilon = EPSILON);

        graph.set_scale(parent, Vec3::new(2.0, 2.0, 2.0)).unwrap();
        graph.propagate_transforms(parent).unwrap();
        assert_relative_eq!(graph.world_position(child).unwrap(), Vec3::new(2.0, 0.0, 2.0), epsilon = EPSILON);
    }

    #[test]
    fn test_set_active_is_local() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node(NodeId::ROOT, &Transform::identity()).unwrap();
        let child = graph.create_node(parent, &Transform::identity()).unwrap();

        graph.set_active(parent, false).unwrap();
        assert!(!graph.is_active(parent));
        assert!(graph.is_active(child));
    }
}
