/// Scene object contract.
///
/// A SceneObject is anything the scene manager can place, cull, pick and
/// batch. Concrete entity kinds (static meshes, animated characters,
/// particle emitters...) implement the trait; the manager dispatches
/// through `Box<dyn SceneObject>`.
///
/// The manager owns objects and keys them by `SceneObjectKey`. The node
/// currently holding an object is recorded next to it in the manager's
/// store, never inside the object itself.

use glam::Mat4;
use slotmap::new_key_type;
use crate::batch::BatchData;
use crate::camera::Camera;
use crate::math::{BoundingSphere, Ray};
use crate::renderer::RenderOperation;
use super::scene_node::NodeId;

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Stable key for a SceneObject within a scene manager.
    ///
    /// Keys remain valid even after other objects are removed.
    /// A key becomes invalid only when its own object is removed.
    pub struct SceneObjectKey;
}

// ===== SCENE OBJECT TRAIT =====

/// Capability set required from every renderable entity.
pub trait SceneObject: Send {
    /// World-space bounding sphere
    fn bounding_sphere(&self) -> BoundingSphere;

    /// Dynamic objects move every frame and are scanned linearly instead
    /// of being culled through the octree. Fixed per concrete type.
    fn is_dynamic(&self) -> bool {
        false
    }

    /// Whether `prepare_visible_objects` must run before the object itself
    /// is batched (attached sub-entities, LOD children...).
    fn has_sub_objects(&self) -> bool {
        false
    }

    /// Add the sub-objects of this object to `batch`.
    ///
    /// Called by the manager when the object is visible and
    /// `has_sub_objects()` is true.
    fn prepare_visible_objects(&self, _camera: &Camera, _batch: &mut BatchData) {}

    /// Render operations for a level of detail (0 = closest, 4 = farthest).
    fn render_operation(&self, level: usize) -> &[RenderOperation];

    /// World transform applied to non-final operation transforms
    fn world_transform(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    /// Per-frame update, called by `SceneManager::update`.
    fn update(&mut self, _delta_time: f32) {}

    /// Set by the object when it moved and needs octree relocation
    fn requires_node_update(&self) -> bool {
        false
    }

    fn set_requires_node_update(&mut self, _value: bool) {}

    /// Notification hook: the object was added to a scene manager.
    fn on_added_to_scene(&mut self, _key: SceneObjectKey) {}

    /// Notification hook: the object was removed from its scene manager.
    fn on_removed_from_scene(&mut self) {}

    /// Fine-grained picking test, run after the bounding sphere test passed.
    fn intersects_selection_ray(&self, ray: &Ray) -> bool {
        ray.intersects_sphere(&self.bounding_sphere()).is_some()
    }

    /// Notification hook: the holder node changed (`None` = detached).
    fn notify_parent_node(&mut self, _node: Option<NodeId>) {}
}

// ===== STORE ENTRY =====

/// An owned object plus its holder node.
pub(crate) struct ObjectEntry {
    pub(crate) object: Box<dyn SceneObject>,
    /// Node currently holding the object (`None` when not in the octree)
    pub(crate) node: Option<NodeId>,
    /// Whether the object sits in the far-objects list
    pub(crate) far: bool,
}

impl ObjectEntry {
    pub(crate) fn new(object: Box<dyn SceneObject>) -> Self {
        Self {
            object,
            node: None,
            far: false,
        }
    }
}
