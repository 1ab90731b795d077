//! Arena-backed scene graph.
//!
//! Nodes live in a `Vec` slot map addressed by [`NodeId`]. Slots of removed
//! nodes are never reused, so a stale id reports [`SceneError::UnknownNode`]
//! instead of aliasing a newer node.

use glam::Mat4;
use solaria_terrain::Aabb;
use thiserror::Error;

use crate::animator::Animator;
use crate::material::Material;
use crate::transform::Transform;

/// Handle to a node in a [`SceneGraph`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

/// Opaque index of a GPU mesh owned by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshKey(pub usize);

/// Errors returned by scene graph mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("scene node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("the root node cannot be removed")]
    RootRemoval,
}

/// A single node: local transform, resolved world transform, appearance.
pub struct SceneNode {
    /// User-chosen identifier for lookups. Not required to be unique.
    pub id: i32,
    pub transform: Transform,
    pub visible: bool,
    pub material: Material,
    pub mesh: Option<MeshKey>,
    /// Local-space bounds of the attached mesh.
    pub bounds: Option<Aabb>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    absolute: Mat4,
    animators: Vec<Box<dyn Animator>>,
}

impl SceneNode {
    fn new(id: i32, parent: Option<NodeId>, transform: Transform) -> Self {
        Self {
            id,
            transform,
            visible: true,
            material: Material::default(),
            mesh: None,
            bounds: None,
            parent,
            children: Vec::new(),
            absolute: Mat4::IDENTITY,
            animators: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// World transform as of the last [`SceneGraph::update_absolute_transforms`].
    pub fn absolute_transform(&self) -> Mat4 {
        self.absolute
    }

    /// Mesh bounds in world space, if the node has any.
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.bounds.map(|b| b.transformed(self.absolute))
    }

    pub fn animator_count(&self) -> usize {
        self.animators.len()
    }
}

impl std::fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneNode")
            .field("id", &self.id)
            .field("transform", &self.transform)
            .field("visible", &self.visible)
            .field("mesh", &self.mesh)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("animators", &self.animators.len())
            .finish()
    }
}

/// Hierarchy of scene nodes under a single invisible-to-render root.
pub struct SceneGraph {
    nodes: Vec<Option<SceneNode>>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    const ROOT: NodeId = NodeId(0);

    pub fn new() -> Self {
        Self {
            nodes: vec![Some(SceneNode::new(-1, None, Transform::default()))],
        }
    }

    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        // The root always exists.
        false
    }

    pub fn node(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node.0 as usize)?.as_ref()
    }

    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(node.0 as usize)?.as_mut()
    }

    fn live_mut(&mut self, node: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.node_mut(node).ok_or(SceneError::UnknownNode(node))
    }

    /// Attach a new node under `parent`.
    pub fn add_node(
        &mut self,
        parent: NodeId,
        id: i32,
        transform: Transform,
    ) -> Result<NodeId, SceneError> {
        let handle = NodeId(self.nodes.len() as u32);
        self.live_mut(parent)?.children.push(handle);
        self.nodes
            .push(Some(SceneNode::new(id, Some(parent), transform)));
        log::debug!("Added scene node {handle:?} (id {id}) under {parent:?}");
        Ok(handle)
    }

    pub fn add_animator(
        &mut self,
        node: NodeId,
        animator: Box<dyn Animator>,
    ) -> Result<(), SceneError> {
        self.live_mut(node)?.animators.push(animator);
        Ok(())
    }

    pub fn set_visible(&mut self, node: NodeId, visible: bool) -> Result<(), SceneError> {
        self.live_mut(node)?.visible = visible;
        Ok(())
    }

    /// Run every node's animators against its local transform.
    pub fn animate(&mut self, now_ms: u64) {
        for node in self.nodes.iter_mut().flatten() {
            for animator in node.animators.iter_mut() {
                animator.animate(&mut node.transform, now_ms);
            }
        }
    }

    /// Resolve world transforms top-down: `absolute = parent.absolute * local`.
    pub fn update_absolute_transforms(&mut self) {
        let mut stack = vec![(Self::ROOT, Mat4::IDENTITY)];
        while let Some((handle, parent_abs)) = stack.pop() {
            let Some(node) = self.node_mut(handle) else {
                continue;
            };
            node.absolute = parent_abs * node.transform.matrix();
            let absolute = node.absolute;
            stack.extend(node.children.iter().map(|&c| (c, absolute)));
        }
    }

    /// Collect the nodes to draw this frame.
    ///
    /// A node is registered when it and all of its ancestors are visible. The
    /// root is never registered. Order is depth-first, children in insertion
    /// order.
    pub fn pre_render(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.node(handle) else {
                continue;
            };
            if !node.visible {
                continue;
            }
            if handle != Self::ROOT {
                out.push(handle);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Every node below the root in depth-first order, hidden ones included.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![Self::ROOT];
        while let Some(handle) = stack.pop() {
            let Some(node) = self.node(handle) else {
                continue;
            };
            if handle != Self::ROOT {
                out.push(handle);
            }
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// First node, in depth-first order, whose user id equals `id`.
    pub fn find_by_id(&self, id: i32) -> Option<NodeId> {
        let mut stack = vec![Self::ROOT];
        while let Some(handle) = stack.pop() {
            let node = self.node(handle)?;
            if handle != Self::ROOT && node.id == id {
                return Some(handle);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Detach `node` from its parent and drop it with its whole subtree.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), SceneError> {
        if node == Self::ROOT {
            return Err(SceneError::RootRemoval);
        }
        let parent = self
            .node(node)
            .ok_or(SceneError::UnknownNode(node))?
            .parent;
        if let Some(parent) = parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|&c| c != node);
        }

        let mut stack = vec![node];
        let mut removed = 0usize;
        while let Some(handle) = stack.pop() {
            if let Some(slot) = self.nodes.get_mut(handle.0 as usize)
                && let Some(dropped) = slot.take()
            {
                stack.extend(dropped.children);
                removed += 1;
            }
        }
        log::debug!("Removed scene node {node:?} and {} descendants", removed - 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animator::RotationAnimator;
    use glam::Vec3;

    #[test]
    fn test_new_graph_has_only_root() {
        let scene = SceneGraph::new();
        assert_eq!(scene.len(), 1);
        assert!(scene.node(scene.root()).is_some());
        assert!(scene.pre_render().is_empty());
    }

    #[test]
    fn test_add_node_links_parent_and_child() {
        let mut scene = SceneGraph::new();
        let a = scene
            .add_node(scene.root(), 1, Transform::default())
            .unwrap();
        let b = scene.add_node(a, 2, Transform::default()).unwrap();
        assert_eq!(scene.node(b).unwrap().parent(), Some(a));
        assert_eq!(scene.node(a).unwrap().children(), &[b]);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_add_under_unknown_parent_fails() {
        let mut scene = SceneGraph::new();
        let err = scene
            .add_node(NodeId(42), 0, Transform::default())
            .unwrap_err();
        assert_eq!(err, SceneError::UnknownNode(NodeId(42)));
    }

    #[test]
    fn test_absolute_transforms_compose() {
        let mut scene = SceneGraph::new();
        let parent = scene
            .add_node(
                scene.root(),
                1,
                Transform::from_position(Vec3::new(0.0, 100.0, 0.0)).with_scale(Vec3::splat(2.0)),
            )
            .unwrap();
        let child = scene
            .add_node(parent, 2, Transform::from_position(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        scene.update_absolute_transforms();

        let world = scene
            .node(child)
            .unwrap()
            .absolute_transform()
            .transform_point3(Vec3::ZERO);
        assert!((world - Vec3::new(2.0, 100.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_pre_render_skips_hidden_subtrees() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let a = scene.add_node(root, 1, Transform::default()).unwrap();
        let a1 = scene.add_node(a, 2, Transform::default()).unwrap();
        let b = scene.add_node(root, 3, Transform::default()).unwrap();
        let b1 = scene.add_node(b, 4, Transform::default()).unwrap();

        assert_eq!(scene.pre_render(), vec![a, a1, b, b1]);

        scene.set_visible(a, false).unwrap();
        assert_eq!(scene.pre_render(), vec![b, b1]);

        scene.set_visible(a, true).unwrap();
        scene.set_visible(b1, false).unwrap();
        assert_eq!(scene.pre_render(), vec![a, a1, b]);
    }

    #[test]
    fn test_descendants_include_hidden_nodes() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let a = scene.add_node(root, 1, Transform::default()).unwrap();
        let a1 = scene.add_node(a, 2, Transform::default()).unwrap();
        let b = scene.add_node(root, 3, Transform::default()).unwrap();

        scene.set_visible(a, false).unwrap();
        assert_eq!(scene.pre_render(), vec![b]);
        assert_eq!(scene.descendants(), vec![a, a1, b]);

        scene.remove_node(a).unwrap();
        assert_eq!(scene.descendants(), vec![b]);
    }

    #[test]
    fn test_animate_runs_node_animators() {
        let mut scene = SceneGraph::new();
        let n = scene
            .add_node(scene.root(), 7, Transform::default())
            .unwrap();
        scene
            .add_animator(n, Box::new(RotationAnimator::new(Vec3::new(0.0, 0.3, 0.0))))
            .unwrap();
        scene.animate(0);
        scene.animate(100);
        let y = scene.node(n).unwrap().transform.rotation_deg.y;
        assert!((y - 3.0).abs() < 1e-4);
        assert_eq!(scene.node(n).unwrap().animator_count(), 1);
    }

    #[test]
    fn test_find_by_id() {
        let mut scene = SceneGraph::new();
        let a = scene
            .add_node(scene.root(), 10, Transform::default())
            .unwrap();
        let b = scene.add_node(a, 20, Transform::default()).unwrap();
        assert_eq!(scene.find_by_id(20), Some(b));
        assert_eq!(scene.find_by_id(10), Some(a));
        assert_eq!(scene.find_by_id(-1), None);
        assert_eq!(scene.find_by_id(99), None);
    }

    #[test]
    fn test_remove_node_drops_subtree() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let a = scene.add_node(root, 1, Transform::default()).unwrap();
        let a1 = scene.add_node(a, 2, Transform::default()).unwrap();
        let b = scene.add_node(root, 3, Transform::default()).unwrap();

        scene.remove_node(a).unwrap();
        assert!(scene.node(a).is_none());
        assert!(scene.node(a1).is_none());
        assert_eq!(scene.node(root).unwrap().children(), &[b]);
        assert_eq!(scene.pre_render(), vec![b]);
        assert_eq!(scene.len(), 2);

        assert_eq!(scene.remove_node(a), Err(SceneError::UnknownNode(a)));
        assert_eq!(
            scene.add_node(a1, 5, Transform::default()),
            Err(SceneError::UnknownNode(a1))
        );
    }

    #[test]
    fn test_root_cannot_be_removed() {
        let mut scene = SceneGraph::new();
        assert_eq!(scene.remove_node(scene.root()), Err(SceneError::RootRemoval));
    }

    #[test]
    fn test_world_bounds_follow_transform() {
        let mut scene = SceneGraph::new();
        let n = scene
            .add_node(
                scene.root(),
                0,
                Transform::from_position(Vec3::new(0.0, 100.0, 0.0)).with_scale(Vec3::splat(260.0)),
            )
            .unwrap();
        scene.node_mut(n).unwrap().bounds = Some(Aabb {
            min: Vec3::new(-0.5, -0.1, -0.5),
            max: Vec3::new(0.49, 0.1, 0.49),
        });
        scene.update_absolute_transforms();
        let world = scene.node(n).unwrap().world_bounds().unwrap();
        assert!(world.contains(Vec3::new(0.0, 100.0, 0.0)));
        assert!((world.extent().x - 0.99 * 260.0).abs() < 1e-2);
    }
}
