use glam::{Quat, Vec3};
use std::collections::BTreeMap;
use tankyard_common::{NodeId, Transform};

/// Errors from scene graph operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene node {0:?} not found")]
    UnknownNode(NodeId),
    #[error("the root node cannot be destroyed")]
    RootNode,
}

/// A node in the scene graph. Its transform is relative to its parent.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub parent: Option<NodeId>,
    pub local: Transform,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Hierarchy of renderable nodes.
///
/// Node 0 is the root and always exists. BTreeMap keeps iteration in creation order.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u32,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            Self::ROOT,
            SceneNode {
                name: "root".into(),
                parent: None,
                local: Transform::IDENTITY,
                children: Vec::new(),
            },
        );
        Self { nodes, next_id: 1 }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Create a node under `parent` with the given local transform.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        local: Transform,
    ) -> Result<NodeId, SceneError> {
        let id = NodeId(self.next_id);
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(SceneError::UnknownNode(parent))?;
        parent_node.children.push(id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            SceneNode {
                name: name.into(),
                parent: Some(parent),
                local,
                children: Vec::new(),
            },
        );
        Ok(id)
    }

    /// Destroy a node and its whole subtree. Returns how many nodes were removed.
    pub fn destroy(&mut self, id: NodeId) -> Result<usize, SceneError> {
        if id == Self::ROOT {
            return Err(SceneError::RootNode);
        }
        let parent = self.nodes.get(&id).ok_or(SceneError::UnknownNode(id))?.parent;
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != id);
        }
        let mut removed = 0;
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                pending.extend(node.children);
                removed += 1;
            }
        }
        tracing::trace!(?id, removed, "scene subtree destroyed");
        Ok(removed)
    }

    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.local.position = position;
        Ok(())
    }

    pub fn set_orientation(&mut self, id: NodeId, rotation: Quat) -> Result<(), SceneError> {
        self.node_mut(id)?.local.rotation = rotation.normalize();
        Ok(())
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.node_mut(id)?.local = transform.renormalized();
        Ok(())
    }

    /// World-space transform, composed from the root down.
    pub fn derived_transform(&self, id: NodeId) -> Option<Transform> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.nodes.get(&current)?;
            chain.push(node.local);
            cursor = node.parent;
        }
        Some(
            chain
                .iter()
                .rev()
                .fold(Transform::IDENTITY, |world, local| world.mul_transform(local)),
        )
    }

    pub fn derived_position(&self, id: NodeId) -> Option<Vec3> {
        self.derived_transform(id).map(|t| t.position)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(&id).ok_or(SceneError::UnknownNode(id))
    }
}
