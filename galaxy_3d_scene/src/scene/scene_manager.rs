//! Scene manager abstraction.
//!
//! A scene manager owns every object added to it, keeps them spatially
//! indexed, and answers the two per-frame queries of the scene layer:
//! "what is visible from this camera" and "what does this ray hit".

use slotmap::SlotMap;
use crate::batch::BatchData;
use crate::camera::Camera;
use crate::math::Ray;
use super::scene_node::NodeId;
use super::scene_object::{ObjectEntry, SceneObject, SceneObjectKey};

/// Predicate applied to picking candidates
pub type ObjectFilter<'a> = &'a dyn Fn(SceneObjectKey, &dyn SceneObject) -> bool;

/// Scene manager interface used by scene passes.
pub trait SceneManager {
    /// Take ownership of an object and index it.
    fn add_object(&mut self, object: Box<dyn SceneObject>) -> SceneObjectKey;

    /// Remove an object and hand it back to the caller.
    ///
    /// Returns `None` if the key is unknown (already removed).
    fn remove_object(&mut self, key: SceneObjectKey) -> Option<Box<dyn SceneObject>>;

    fn object(&self, key: SceneObjectKey) -> Option<&dyn SceneObject>;

    fn object_mut(&mut self, key: SceneObjectKey) -> Option<&mut dyn SceneObject>;

    /// Total number of objects, static and dynamic
    fn object_count(&self) -> usize;

    /// Holder node of an object (`None` when not in the spatial index)
    fn scene_node_of(&self, key: SceneObjectKey) -> Option<NodeId>;

    /// Per-frame update of every object, relocating the ones that moved.
    fn update(&mut self, delta_time: f32);

    /// Add every object visible from `camera` to `batch`.
    fn prepare_visible_objects(&mut self, camera: &Camera, batch: &mut BatchData);

    /// Nearest object hit by `ray` (nearest by bounding-sphere center),
    /// optionally restricted by `filter`.
    fn find_object(&mut self, ray: &Ray, filter: Option<ObjectFilter<'_>>) -> Option<SceneObjectKey>;
}

// ===== OBJECT STORE =====

/// Flat list of every object owned by a manager.
pub(crate) struct SceneObjectStore {
    objects: SlotMap<SceneObjectKey, ObjectEntry>,
}

impl SceneObjectStore {
    pub(crate) fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }

    pub(crate) fn insert(&mut self, object: Box<dyn SceneObject>) -> SceneObjectKey {
        self.objects.insert(ObjectEntry::new(object))
    }

    pub(crate) fn remove(&mut self, key: SceneObjectKey) -> Option<ObjectEntry> {
        self.objects.remove(key)
    }

    pub(crate) fn get(&self, key: SceneObjectKey) -> Option<&ObjectEntry> {
        self.objects.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: SceneObjectKey) -> Option<&mut ObjectEntry> {
        self.objects.get_mut(key)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (SceneObjectKey, &mut ObjectEntry)> {
        self.objects.iter_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.len()
    }
}
