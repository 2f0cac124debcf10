//! The joint/segment/site tree.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]; the tree itself
//! only stores ids. Topology mutation goes through [`Skeleton`] so that the
//! child-kind rules are checked at the mutating call and, while the tree is
//! live, so that mutations can be deferred to the end-of-frame
//! synchronization point (see [`crate::schedule_functions::end_frame`]).

use id_arena::{Arena, Id};

use crate::{
    components::{Bounds, GlobalTransform, Joint, LocalTransform, Segment, Site},
    MarrowError, MarrowResult,
};
use glam::{Quat, Vec3};

/// Handle to a node stored in a [`Skeleton`].
pub type NodeId = Id<SkeletonNode>;

/// The closed set of node kinds a skeleton is built from.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A bone-like pivot that can deform the skin
    Joint(Joint),
    /// A rigid body part carrying mass properties and displacers
    Segment(Segment),
    /// An attachment leaf
    Site(Site),
}

impl NodeKind {
    /// The kind name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Joint(_) => "Joint",
            NodeKind::Segment(_) => "Segment",
            NodeKind::Site(_) => "Site",
        }
    }

    /// Joints and segments parent anything; sites only parent other sites
    /// (marker frames).
    fn accepts_child(&self, child: &NodeKind) -> bool {
        match self {
            NodeKind::Joint(_) | NodeKind::Segment(_) => true,
            NodeKind::Site(_) => matches!(child, NodeKind::Site(_)),
        }
    }
}

/// A single joint, segment or site in the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonNode {
    /// Name used to address the node from animation sources, e.g. `"l_shoulder"`
    pub name: String,
    /// The node's payload
    pub kind: NodeKind,
    /// The node's transform relative to its parent
    pub local_transform: LocalTransform,
    /// The node's computed placement in character space; valid after the last
    /// update pass
    pub global_transform: GlobalTransform,
    /// The bounding volume a renderer may use for culling
    pub bounds: Bounds,
    // The parent as *requested*: reflects queued mutations immediately so
    // validation can reject conflicting requests at the call that made them.
    pub(crate) parent: Option<NodeId>,
    // The child list as *visible* to traversal and the renderer: while the
    // tree is live this lags requests until the pending queue is applied.
    pub(crate) children: Vec<NodeId>,
    pub(crate) local_changed: bool,
    pub(crate) global_changed: bool,
}

impl SkeletonNode {
    fn new(name: String, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            local_transform: LocalTransform::default(),
            global_transform: GlobalTransform::default(),
            bounds: Bounds::default(),
            parent: None,
            children: Vec::new(),
            local_changed: true,
            global_changed: false,
        }
    }

    /// Whether the node's global matrix was recomputed by the most recent
    /// update pass. Consumed by the deformation pass.
    pub fn global_changed(&self) -> bool {
        self.global_changed
    }
}

// A queued topology mutation. Requests are validated eagerly; application is
// deferred to the synchronization point while the tree is live.
#[derive(Debug, Clone)]
enum PendingOp {
    Add { parent: NodeId, child: NodeId },
    Remove { parent: NodeId, child: NodeId },
    SetChildren { parent: NodeId, children: Vec<NodeId> },
}

/// The skeleton tree: an arena of typed nodes plus the root list.
#[derive(Debug, Default)]
pub struct Skeleton {
    arena: Arena<SkeletonNode>,
    roots: Vec<NodeId>,
    live: bool,
    pending: Vec<PendingOp>,
    needs_sync: bool,
}

impl Skeleton {
    /// Create an empty skeleton.
    pub fn new() -> Self {
        Default::default()
    }

    /// Number of nodes ever added to the skeleton, attached or not.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the skeleton contains no nodes.
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 0
    }

    /// Add a joint node. The node starts detached.
    pub fn add_joint(&mut self, name: impl Into<String>, joint: Joint) -> NodeId {
        self.add_node(name, NodeKind::Joint(joint))
    }

    /// Add a segment node. The node starts detached.
    pub fn add_segment(&mut self, name: impl Into<String>, segment: Segment) -> NodeId {
        self.add_node(name, NodeKind::Segment(segment))
    }

    /// Add a site node. The node starts detached.
    pub fn add_site(&mut self, name: impl Into<String>, site: Site) -> NodeId {
        self.add_node(name, NodeKind::Site(site))
    }

    /// Add a node of the given kind. The node starts detached.
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        self.arena.alloc(SkeletonNode::new(name.into(), kind))
    }

    /// Get a node by id.
    pub fn node(&self, id: NodeId) -> MarrowResult<&SkeletonNode> {
        self.arena.get(id).ok_or(MarrowError::UnknownNode)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> MarrowResult<&mut SkeletonNode> {
        self.arena.get_mut(id).ok_or(MarrowError::UnknownNode)
    }

    // Infallible lookups for traversal over ids the tree itself produced.
    pub(crate) fn index(&self, id: NodeId) -> &SkeletonNode {
        &self.arena[id]
    }

    pub(crate) fn index_mut(&mut self, id: NodeId) -> &mut SkeletonNode {
        &mut self.arena[id]
    }

    /// Find a node id by name. Returns the first match in insertion order.
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.arena
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// Iterate over every node in insertion order, attached or not.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SkeletonNode)> {
        self.arena.iter()
    }

    /// Every attached node, parents before children — the traversal order of
    /// the update pass.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.arena.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.arena[id].children.iter().rev().copied());
        }
        order
    }

    /// The child list of a node as visible to traversal and the renderer.
    ///
    /// While the tree is live this reflects queued mutations only after
    /// [`crate::schedule_functions::end_frame`] has applied them.
    pub fn children(&self, id: NodeId) -> MarrowResult<&[NodeId]> {
        Ok(&self.node(id)?.children)
    }

    /// The parent of a node as requested, including not-yet-applied mutations.
    pub fn parent(&self, id: NodeId) -> MarrowResult<Option<NodeId>> {
        Ok(self.node(id)?.parent)
    }

    /// The roots of the skeleton, in traversal order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Replace the root list. Roots must be detached joint nodes.
    ///
    /// The root list is bind-time configuration, like the skin: it is applied
    /// immediately in either mode.
    pub fn set_roots(&mut self, roots: Vec<NodeId>) -> MarrowResult<()> {
        for (i, &root) in roots.iter().enumerate() {
            let node = self.node(root)?;
            if !matches!(node.kind, NodeKind::Joint(_)) {
                return Err(MarrowError::WrongNodeKind {
                    expected: "Joint",
                    found: node.kind.name(),
                });
            }
            if node.parent.is_some() || roots[..i].contains(&root) {
                return Err(MarrowError::AlreadyParented);
            }
        }
        for &root in &roots {
            self.arena[root].local_changed = true;
        }
        self.roots = roots;
        Ok(())
    }

    /// Attach `child` under `parent`, at the end of its child list.
    ///
    /// While the tree is live the attachment is queued and becomes visible at
    /// the next synchronization point; the kind, parenting and cycle checks
    /// still run now, so an invalid request fails at this call.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> MarrowResult<()> {
        self.check_attachable(parent, child)?;

        self.arena[child].parent = Some(parent);
        if self.live {
            self.pending.push(PendingOp::Add { parent, child });
            self.needs_sync = true;
        } else {
            self.arena[parent].children.push(child);
            self.arena[child].local_changed = true;
        }
        Ok(())
    }

    /// Detach `child` from `parent`. The node and its subtree survive and can
    /// be re-attached later.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> MarrowResult<()> {
        self.node(parent)?;
        if self.node(child)?.parent != Some(parent) {
            return Err(MarrowError::NotAChild);
        }

        self.arena[child].parent = None;
        if self.live {
            self.pending.push(PendingOp::Remove { parent, child });
            self.needs_sync = true;
        } else {
            self.arena[parent].children.retain(|&c| c != child);
        }
        Ok(())
    }

    /// Replace `parent`'s child list wholesale.
    ///
    /// Children already under `parent` may appear in the new list (reorder);
    /// all other entries must be detached nodes of an acceptable kind.
    pub fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) -> MarrowResult<()> {
        self.node(parent)?;
        for (i, &child) in children.iter().enumerate() {
            if children[..i].contains(&child) {
                return Err(MarrowError::AlreadyParented);
            }
            if self.node(child)?.parent == Some(parent) {
                continue;
            }
            self.check_attachable(parent, child)?;
        }

        // Former children that are not retained become detached.
        let former: Vec<NodeId> = self
            .arena
            .iter()
            .filter(|(id, node)| node.parent == Some(parent) && !children.contains(id))
            .map(|(id, _)| id)
            .collect();
        for id in former {
            self.arena[id].parent = None;
        }
        for &child in &children {
            self.arena[child].parent = Some(parent);
        }

        if self.live {
            self.pending.push(PendingOp::SetChildren { parent, children });
            self.needs_sync = true;
        } else {
            for &child in &children {
                self.arena[child].local_changed = true;
            }
            self.arena[parent].children = children;
        }
        Ok(())
    }

    // Everything that can make an attachment request invalid, checked at the
    // requesting call even when application is deferred.
    fn check_attachable(&self, parent: NodeId, child: NodeId) -> MarrowResult<()> {
        let parent_node = self.node(parent)?;
        let child_node = self.node(child)?;

        if !parent_node.kind.accepts_child(&child_node.kind) {
            return Err(MarrowError::InvalidChildKind {
                parent: parent_node.kind.name(),
                child: child_node.kind.name(),
            });
        }
        if child_node.parent.is_some() || self.roots.contains(&child) {
            return Err(MarrowError::AlreadyParented);
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(MarrowError::CyclicTopology);
        }
        Ok(())
    }

    // Whether `ancestor` is above `node` in the requested topology.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.arena[node].parent;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.arena[id].parent;
        }
        false
    }

    /// Set a node's local transform. Takes effect at the next update pass.
    pub fn set_local_transform(
        &mut self,
        id: NodeId,
        local_transform: LocalTransform,
    ) -> MarrowResult<()> {
        let node = self.node_mut(id)?;
        node.local_transform = local_transform;
        node.local_changed = true;
        Ok(())
    }

    /// Set a node's translation. Takes effect at the next update pass.
    pub fn set_translation(&mut self, id: NodeId, translation: Vec3) -> MarrowResult<()> {
        let node = self.node_mut(id)?;
        node.local_transform.translation = translation;
        node.local_changed = true;
        Ok(())
    }

    /// Set a node's rotation. Takes effect at the next update pass.
    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) -> MarrowResult<()> {
        let node = self.node_mut(id)?;
        node.local_transform.rotation = rotation;
        node.local_changed = true;
        Ok(())
    }

    /// Set a node's scale. Takes effect at the next update pass.
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) -> MarrowResult<()> {
        let node = self.node_mut(id)?;
        node.local_transform.scale = scale;
        node.local_changed = true;
        Ok(())
    }

    /// Set the axes a node's scale is applied along. Takes effect at the next
    /// update pass.
    pub fn set_scale_orientation(&mut self, id: NodeId, scale_orientation: Quat) -> MarrowResult<()> {
        let node = self.node_mut(id)?;
        node.local_transform.scale_orientation = scale_orientation;
        node.local_changed = true;
        Ok(())
    }

    /// Set the point a node rotates and scales about. Takes effect at the
    /// next update pass.
    pub fn set_center(&mut self, id: NodeId, center: Vec3) -> MarrowResult<()> {
        let node = self.node_mut(id)?;
        node.local_transform.center = center;
        node.local_changed = true;
        Ok(())
    }

    /// Set a node's bounding volume.
    pub fn set_bounds(&mut self, id: NodeId, bounds: Bounds) -> MarrowResult<()> {
        self.node_mut(id)?.bounds = bounds;
        Ok(())
    }

    /// A node's computed placement in character space, as of the last update
    /// pass.
    pub fn global_transform(&self, id: NodeId) -> MarrowResult<GlobalTransform> {
        Ok(self.node(id)?.global_transform)
    }

    /// Attach or detach the skeleton from an active render loop.
    ///
    /// While live, topology mutations are queued until the end-of-frame
    /// synchronization point. Going live with mutations already queued keeps
    /// them queued; leaving live applies them immediately.
    pub fn set_live(&mut self, live: bool) {
        if self.live == live {
            return;
        }
        self.live = live;
        if !live {
            self.apply_pending();
        }
    }

    /// Whether the skeleton is attached to an active render loop.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Whether topology mutations are queued awaiting the next
    /// synchronization point.
    pub fn needs_sync(&self) -> bool {
        self.needs_sync
    }

    // Apply queued topology mutations, in request order.
    pub(crate) fn apply_pending(&mut self) {
        for op in std::mem::take(&mut self.pending) {
            match op {
                PendingOp::Add { parent, child } => {
                    self.arena[parent].children.push(child);
                    self.arena[child].local_changed = true;
                }
                PendingOp::Remove { parent, child } => {
                    self.arena[parent].children.retain(|&c| c != child);
                }
                PendingOp::SetChildren { parent, children } => {
                    for &child in &children {
                        self.arena[child].local_changed = true;
                    }
                    self.arena[parent].children = children;
                }
            }
        }
        self.needs_sync = false;
    }
}
