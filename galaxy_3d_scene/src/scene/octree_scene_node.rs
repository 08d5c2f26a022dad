/// Octree nodes: recursive cubic subdivision of the indexed volume.
///
/// Nodes live in a flat arena owned by the octree and refer to each other
/// by `NodeId`. Children are created lazily, the first time an object is
/// small enough to be pushed into their octant, and are never destroyed
/// while the octree lives (only their attachment lists shrink).
///
/// Octant bit layout: bit2 = X, bit1 = Y, bit0 = Z (1 = above the center).

use glam::Vec3;
use crate::math::BoundingSphere;
use super::scene_node::{NodeId, SceneNode};
use super::scene_object::{ObjectEntry, SceneObjectKey};

/// Direction of each octant center from its parent center, indexed by
/// the octant bits returned by `OctreeSceneNode::get_extend`.
pub const OFFSET_VECTOR_TABLE: [Vec3; 8] = [
    Vec3::new(-1.0, -1.0, -1.0),
    Vec3::new(-1.0, -1.0, 1.0),
    Vec3::new(-1.0, 1.0, -1.0),
    Vec3::new(-1.0, 1.0, 1.0),
    Vec3::new(1.0, -1.0, -1.0),
    Vec3::new(1.0, -1.0, 1.0),
    Vec3::new(1.0, 1.0, -1.0),
    Vec3::new(1.0, 1.0, 1.0),
];

// ===== OCTREE BOX =====

/// Axis-aligned cube: center + edge length
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OctreeBox {
    pub center: Vec3,
    pub length: f32,
}

impl OctreeBox {
    pub fn new(center: Vec3, length: f32) -> Self {
        Self { center, length }
    }

    pub fn get_min(&self) -> Vec3 {
        self.center - Vec3::splat(self.length * 0.5)
    }

    pub fn get_max(&self) -> Vec3 {
        self.center + Vec3::splat(self.length * 0.5)
    }

    /// Sphere passing through the eight corners
    pub fn bounding_sphere(&self) -> BoundingSphere {
        BoundingSphere::new(self.center, self.length * 0.5 * 3.0_f32.sqrt())
    }

    /// Box of one octant: half the length, centered a quarter length away
    /// along the octant diagonal.
    pub fn octant(&self, octant: usize) -> OctreeBox {
        let offset_length = self.length / 4.0;
        OctreeBox::new(
            self.center + OFFSET_VECTOR_TABLE[octant] * offset_length,
            self.length / 2.0,
        )
    }
}

// ===== OCTREE SCENE NODE =====

#[derive(Debug)]
pub struct OctreeSceneNode {
    node: SceneNode,
    octree_box: OctreeBox,
    /// Cached from the box, used for frustum and ray rejection
    bounding_sphere: BoundingSphere,
    parent: Option<NodeId>,
    children: [Option<NodeId>; 8],
    depth: u32,
}

impl OctreeSceneNode {
    fn new(id: NodeId, octree_box: OctreeBox, parent: Option<NodeId>, depth: u32) -> Self {
        Self {
            node: SceneNode::new(id),
            octree_box,
            bounding_sphere: octree_box.bounding_sphere(),
            parent,
            children: [None; 8],
            depth,
        }
    }

    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    pub fn octree_box(&self) -> &OctreeBox {
        &self.octree_box
    }

    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child(&self, octant: usize) -> Option<NodeId> {
        self.children[octant]
    }

    /// Children that exist, in octant order
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().flatten().copied()
    }

    /// Distance from the root (root = 0)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Objects attached directly to this node
    pub fn objects(&self) -> &[SceneObjectKey] {
        self.node.objects()
    }

    /// Octant of `position` relative to this node's center.
    pub fn get_extend(&self, position: Vec3) -> usize {
        let center = self.octree_box.center;
        ((position.x > center.x) as usize) << 2
            | ((position.y > center.y) as usize) << 1
            | (position.z > center.z) as usize
    }

    pub fn get_min(&self) -> Vec3 {
        self.octree_box.get_min()
    }

    pub fn get_max(&self) -> Vec3 {
        self.octree_box.get_max()
    }
}

// ===== OCTREE ARENA =====

/// Node arena plus the subdivision policy.
pub(crate) struct Octree {
    nodes: Vec<OctreeSceneNode>,
    minimum_bv_size: f32,
}

impl Octree {
    pub(crate) fn new(root_box: OctreeBox, minimum_bv_size: f32) -> Self {
        Self {
            nodes: vec![OctreeSceneNode::new(NodeId::ROOT, root_box, None, 0)],
            minimum_bv_size,
        }
    }

    pub(crate) fn node(&self, id: NodeId) -> &OctreeSceneNode {
        &self.nodes[id.0]
    }

    pub(crate) fn root(&self) -> &OctreeSceneNode {
        &self.nodes[NodeId::ROOT.0]
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Insert an object below `start`, pushing it down while it is small
    /// compared to the candidate octant. Returns the node now holding it.
    pub(crate) fn add_object(
        &mut self,
        start: NodeId,
        key: SceneObjectKey,
        entry: &mut ObjectEntry,
    ) -> NodeId {
        let sphere = entry.object.bounding_sphere();
        let mut current = start;

        loop {
            let node = &self.nodes[current.0];
            let offset_length = node.octree_box.length / 4.0;

            if !(offset_length > self.minimum_bv_size && sphere.radius <= offset_length) {
                self.nodes[current.0].node.add_object(key, entry);
                return current;
            }

            let octant = node.get_extend(sphere.center);
            let existing = node.children[octant];
            current = match existing {
                Some(child) => child,
                None => self.create_child(current, octant),
            };
        }
    }

    fn create_child(&mut self, parent: NodeId, octant: usize) -> NodeId {
        debug_assert!(octant < 8);
        let id = NodeId(self.nodes.len());
        let parent_node = &self.nodes[parent.0];
        let child = OctreeSceneNode::new(
            id,
            parent_node.octree_box.octant(octant),
            Some(parent),
            parent_node.depth + 1,
        );
        self.nodes.push(child);
        self.nodes[parent.0].children[octant] = Some(id);
        id
    }

    /// Remove an object, starting at `from`.
    ///
    /// Below the root the request goes straight to the recorded holder.
    /// At the root the tree is searched, descending only into children
    /// whose sphere touches the object's current sphere. An object that
    /// moved away from its holder is then still removed through the
    /// recorded holder.
    pub(crate) fn remove_object(
        &mut self,
        from: NodeId,
        key: SceneObjectKey,
        entry: &mut ObjectEntry,
    ) -> bool {
        if self.nodes[from.0].parent.is_none() && self.remove_object_internal(from, key, entry) {
            return true;
        }

        match entry.node {
            Some(holder) => self.nodes[holder.0].node.remove_object(key, entry),
            None => false,
        }
    }

    fn remove_object_internal(
        &mut self,
        id: NodeId,
        key: SceneObjectKey,
        entry: &mut ObjectEntry,
    ) -> bool {
        let sphere = entry.object.bounding_sphere();
        let children = self.nodes[id.0].children;

        for child in children.into_iter().flatten() {
            if self.nodes[child.0].bounding_sphere.intersects(&sphere)
                && self.remove_object_internal(child, key, entry)
            {
                return true;
            }
        }

        self.nodes[id.0].node.remove_object(key, entry)
    }
}

#[cfg(test)]
#[path = "octree_scene_node_tests.rs"]
mod tests;
