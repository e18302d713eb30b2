//! Runtime scene graph
//!
//! Nodes live in a slot map and refer to each other by [`NodeId`]. A camera
//! attached to a node is stored next to the node, not inside it, and only
//! remembers the node's handle.
//!
//! Changing a node's transform recomputes the world matrices of its whole
//! subtree and notifies every camera and listener in that subtree before
//! returning, parents before children.

use thiserror::Error;

use super::camera::Camera;
use crate::foundation::collections::{ListenerId, NodeId, SecondaryMap, SlotMap};
use crate::foundation::math::{Mat4, Transform};

/// Receiver of world-transform changes
pub trait TransformListener {
    /// Called synchronously with the node's new world matrix
    fn transform_changed(&mut self, node: NodeId, world: &Mat4);
}

/// Scene graph errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// Handle does not name a live node
    #[error("Node {0:?} not found")]
    NodeNotFound(NodeId),

    /// Parenting would make a node its own ancestor
    #[error("Making {child:?} a child of {parent:?} would create a cycle")]
    CycleDetected {
        /// Requested parent
        parent: NodeId,
        /// Requested child
        child: NodeId,
    },

    /// The node already carries a camera
    #[error("Node {0:?} already has a camera")]
    CameraAlreadyAttached(NodeId),

    /// The node carries no camera
    #[error("Node {0:?} has no camera")]
    NoCamera(NodeId),
}

#[derive(Debug)]
struct SceneNode {
    name: String,
    local: Transform,
    world: Mat4,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<ListenerId>,
}

struct ListenerEntry {
    node: NodeId,
    listener: Box<dyn TransformListener>,
}

/// Hierarchy of transforms with attached cameras and listeners
#[derive(Default)]
pub struct SceneGraph {
    nodes: SlotMap<NodeId, SceneNode>,
    cameras: SecondaryMap<NodeId, Camera>,
    listeners: SlotMap<ListenerId, ListenerEntry>,
}

impl SceneGraph {
    /// Create an empty scene graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the handle names a live node
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Create a root node with an identity transform
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let name = name.into();
        log::trace!("Creating scene node {:?}", name);
        self.nodes.insert(SceneNode {
            name,
            local: Transform::identity(),
            world: Mat4::identity(),
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        })
    }

    /// Node name
    pub fn name(&self, node: NodeId) -> Result<&str, SceneError> {
        Ok(&self.node(node)?.name)
    }

    /// Parent of a node, `None` for roots
    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(node)?.parent)
    }

    /// Children of a node in insertion order
    pub fn children(&self, node: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(&self.node(node)?.children)
    }

    /// Local transform
    pub fn transform(&self, node: NodeId) -> Result<&Transform, SceneError> {
        Ok(&self.node(node)?.local)
    }

    /// World matrix
    pub fn world_matrix(&self, node: NodeId) -> Result<Mat4, SceneError> {
        Ok(self.node(node)?.world)
    }

    /// Replace a node's local transform and propagate it
    pub fn set_transform(&mut self, node: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.nodes
            .get_mut(node)
            .ok_or(SceneError::NodeNotFound(node))?
            .local = transform;
        self.propagate(node);
        Ok(())
    }

    /// Re-parent `child` under `parent`
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.node(parent)?;
        self.node(child)?;

        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(SceneError::CycleDetected { parent, child });
            }
            ancestor = self.nodes[current].parent;
        }

        self.unlink(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        self.propagate(child);
        Ok(())
    }

    /// Turn a node into a root
    pub fn detach(&mut self, node: NodeId) -> Result<(), SceneError> {
        self.node(node)?;
        self.unlink(node);
        self.propagate(node);
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        if let Some(old_parent) = self.nodes[child].parent.take() {
            if let Some(parent) = self.nodes.get_mut(old_parent) {
                parent.children.retain(|&c| c != child);
            }
        }
    }

    /// Remove a node and its subtree
    ///
    /// Cameras and listeners attached to removed nodes are dropped. Returns
    /// the number of nodes removed.
    pub fn remove_node(&mut self, node: NodeId) -> Result<usize, SceneError> {
        self.node(node)?;
        self.unlink(node);

        let mut removed = 0;
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(entry) = self.nodes.remove(id) {
                for listener in entry.listeners {
                    self.listeners.remove(listener);
                }
                self.cameras.remove(id);
                stack.extend(entry.children);
                removed += 1;
            }
        }
        log::debug!("Removed {} scene nodes", removed);
        Ok(removed)
    }

    /// Attach a camera to a node
    ///
    /// The camera immediately receives the node's current world matrix.
    pub fn attach_camera(&mut self, node: NodeId, mut camera: Camera) -> Result<(), SceneError> {
        let world = self.node(node)?.world;
        if self.cameras.contains_key(node) {
            return Err(SceneError::CameraAlreadyAttached(node));
        }
        camera.set_node(Some(node));
        camera.transform_changed(&world);
        self.cameras.insert(node, camera);
        Ok(())
    }

    /// Detach and return a node's camera
    pub fn detach_camera(&mut self, node: NodeId) -> Result<Camera, SceneError> {
        self.node(node)?;
        let mut camera = self.cameras.remove(node).ok_or(SceneError::NoCamera(node))?;
        camera.set_node(None);
        Ok(camera)
    }

    /// Camera attached to a node
    pub fn camera(&self, node: NodeId) -> Option<&Camera> {
        self.cameras.get(node)
    }

    /// Camera attached to a node, mutable
    pub fn camera_mut(&mut self, node: NodeId) -> Option<&mut Camera> {
        self.cameras.get_mut(node)
    }

    /// Register a listener for a node's world transform
    pub fn add_listener(&mut self, node: NodeId, listener: Box<dyn TransformListener>) -> Result<ListenerId, SceneError> {
        self.node(node)?;
        let id = self.listeners.insert(ListenerEntry { node, listener });
        self.nodes[node].listeners.push(id);
        Ok(id)
    }

    /// Unregister a listener, returning it
    pub fn remove_listener(&mut self, id: ListenerId) -> Option<Box<dyn TransformListener>> {
        let entry = self.listeners.remove(id)?;
        if let Some(node) = self.nodes.get_mut(entry.node) {
            node.listeners.retain(|&l| l != id);
        }
        Some(entry.listener)
    }

    /// Recompute world matrices below `root` and deliver notifications
    fn propagate(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let parent_world = self.nodes[id]
                .parent
                .and_then(|p| self.nodes.get(p))
                .map_or_else(Mat4::identity, |p| p.world);

            let node = &mut self.nodes[id];
            node.world = parent_world * node.local.to_matrix();
            let world = node.world;

            if let Some(camera) = self.cameras.get_mut(id) {
                camera.transform_changed(&world);
            }
            for listener_id in &node.listeners {
                if let Some(entry) = self.listeners.get_mut(*listener_id) {
                    entry.listener.transform_changed(id, &world);
                }
            }

            // Reverse so children are visited in insertion order
            stack.extend(node.children.iter().rev().copied());
        }
    }
}
