/// SceneNode: flat container of attached scene objects.
///
/// Attaching and detaching go through the node so the holder recorded for
/// each object always matches the node listing it.

use super::scene_object::{ObjectEntry, SceneObjectKey};

/// Index of a node in its owner's node arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The octree root is always the first node created
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug)]
pub struct SceneNode {
    id: NodeId,
    objects: Vec<SceneObjectKey>,
}

impl SceneNode {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            objects: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Attached objects, in attachment order
    pub fn objects(&self) -> &[SceneObjectKey] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn contains(&self, key: SceneObjectKey) -> bool {
        self.objects.contains(&key)
    }

    /// Attach an object and record this node as its holder.
    pub(crate) fn add_object(&mut self, key: SceneObjectKey, entry: &mut ObjectEntry) {
        debug_assert!(entry.node.is_none(), "object already attached to {:?}", entry.node);
        self.objects.push(key);
        entry.node = Some(self.id);
        entry.object.notify_parent_node(Some(self.id));
    }

    /// Detach an object. Returns `false` if this node does not hold it.
    pub(crate) fn remove_object(&mut self, key: SceneObjectKey, entry: &mut ObjectEntry) -> bool {
        let Some(position) = self.objects.iter().position(|&k| k == key) else {
            return false;
        };
        self.objects.remove(position);
        entry.node = None;
        entry.object.notify_parent_node(None);
        true
    }
}
