/// Octree-indexed scene manager.
///
/// Static objects are pushed down a lazily built octree. Two flat lists
/// complete the index:
/// - far objects: static objects centered outside the root box
/// - dynamic objects: every object whose type is dynamic, scanned each frame
///
/// A dynamic object that reports a move during `update` is also reinserted
/// into the octree (or the far list). Queries skip dynamic objects met in
/// the octree or far list, so each object is reported at most once.

use std::collections::VecDeque;
use std::sync::Arc;
use glam::Vec3;
use crate::batch::BatchData;
use crate::camera::Camera;
use crate::log::Logger;
use crate::math::{BoundingSphere, Ray};
use crate::{engine_debug, engine_trace};
use super::octree_scene_node::{Octree, OctreeBox, OctreeSceneNode};
use super::scene_manager::{ObjectFilter, SceneManager, SceneObjectStore};
use super::scene_node::NodeId;
use super::scene_object::{ObjectEntry, SceneObject, SceneObjectKey};

const LOG_SOURCE: &str = "galaxy3d::OctreeSceneManager";

/// Level-of-detail thresholds, in multiples of the bounding sphere radius
const LEVEL_THRESHOLDS: [f32; 4] = [1.4, 2.5, 4.0, 5.5];

// ===== CONFIG =====

/// Octree scene manager configuration
#[derive(Debug, Clone, Copy)]
pub struct OctreeSceneManagerConfig {
    /// Center of the indexed cube
    pub world_center: Vec3,
    /// Edge length of the indexed cube
    pub world_size: f32,
    /// Nodes are not subdivided into octants whose quarter length would
    /// not exceed this size
    pub minimum_bv_size: f32,
}

impl Default for OctreeSceneManagerConfig {
    fn default() -> Self {
        Self {
            world_center: Vec3::ZERO,
            world_size: 2048.0,
            minimum_bv_size: 16.0,
        }
    }
}

// ===== MANAGER =====

pub struct OctreeSceneManager {
    logger: Arc<dyn Logger>,
    store: SceneObjectStore,
    octree: Octree,
    /// Root bounds, computed once at construction
    root_min: Vec3,
    root_max: Vec3,
    far_objects: Vec<SceneObjectKey>,
    dynamic_objects: Vec<SceneObjectKey>,
    /// Breadth-first traversal queue, reused across queries
    queue: VecDeque<NodeId>,
    /// Objects flagged for relocation during `update`
    relocations: Vec<SceneObjectKey>,
}

impl OctreeSceneManager {
    pub fn new(config: OctreeSceneManagerConfig, logger: Arc<dyn Logger>) -> Self {
        let root_box = OctreeBox::new(config.world_center, config.world_size);

        engine_debug!(logger, LOG_SOURCE,
            "Created octree: center {:?}, size {}, minimum BV size {}",
            config.world_center, config.world_size, config.minimum_bv_size);

        Self {
            logger,
            store: SceneObjectStore::new(),
            octree: Octree::new(root_box, config.minimum_bv_size),
            root_min: root_box.get_min(),
            root_max: root_box.get_max(),
            far_objects: Vec::new(),
            dynamic_objects: Vec::new(),
            queue: VecDeque::new(),
            relocations: Vec::new(),
        }
    }

    // ===== STATISTICS =====

    /// Number of octree nodes created so far (root included)
    pub fn node_count(&self) -> usize {
        self.octree.node_count()
    }

    pub fn root(&self) -> &OctreeSceneNode {
        self.octree.root()
    }

    pub fn node(&self, id: NodeId) -> Option<&OctreeSceneNode> {
        (id.0 < self.octree.node_count()).then(|| self.octree.node(id))
    }

    /// Depth of the node holding an object (root = 0)
    pub fn depth_of(&self, key: SceneObjectKey) -> Option<u32> {
        let holder = self.store.get(key)?.node?;
        Some(self.octree.node(holder).depth())
    }

    pub fn is_far_object(&self, key: SceneObjectKey) -> bool {
        self.store.get(key).is_some_and(|entry| entry.far)
    }

    pub fn is_dynamic_object(&self, key: SceneObjectKey) -> bool {
        self.dynamic_objects.contains(&key)
    }

    pub fn far_objects(&self) -> &[SceneObjectKey] {
        &self.far_objects
    }

    pub fn dynamic_objects(&self) -> &[SceneObjectKey] {
        &self.dynamic_objects
    }

    // ===== CLASSIFICATION =====

    /// Whether a position lies outside the root box (the boundary is inside).
    pub fn qualifies_far_object(&self, position: Vec3) -> bool {
        position.x < self.root_min.x || position.x > self.root_max.x
            || position.y < self.root_min.y || position.y > self.root_max.y
            || position.z < self.root_min.z || position.z > self.root_max.z
    }

    /// Place an object either in the far list or in the octree.
    fn add_static_object(&mut self, key: SceneObjectKey) {
        let Some(center) = self.store.get(key).map(|entry| entry.object.bounding_sphere().center) else {
            return;
        };
        let far = self.qualifies_far_object(center);
        let Some(entry) = self.store.get_mut(key) else {
            return;
        };

        if far {
            if !entry.far {
                entry.far = true;
                self.far_objects.push(key);
            }
            return;
        }

        if entry.far {
            entry.far = false;
            self.far_objects.retain(|&k| k != key);
        }
        let holder = self.octree.add_object(NodeId::ROOT, key, entry);
        engine_trace!(self.logger, LOG_SOURCE, "Object {:?} attached to node {}", key, holder.index());
    }

    /// Detach an object from the octree and the far list.
    fn remove_from_index(
        octree: &mut Octree,
        far_objects: &mut Vec<SceneObjectKey>,
        key: SceneObjectKey,
        entry: &mut ObjectEntry,
    ) {
        if entry.node.is_some() {
            octree.remove_object(NodeId::ROOT, key, entry);
        }
        // Safe no-op when the object is not listed
        entry.far = false;
        far_objects.retain(|&k| k != key);
    }

    /// Level-of-detail bucket from the eye distance (0..=3, or 4 when
    /// beyond every threshold).
    pub fn get_level(eye_position: Vec3, sphere: &BoundingSphere) -> usize {
        let distance = eye_position.distance(sphere.center);
        LEVEL_THRESHOLDS.iter()
            .position(|&threshold| distance < threshold * sphere.radius)
            .unwrap_or(LEVEL_THRESHOLDS.len())
    }

    fn add_to_batch(camera: &Camera, object: &dyn SceneObject, sphere: &BoundingSphere, batch: &mut BatchData) {
        let level = Self::get_level(camera.eye_position(), sphere);
        if object.has_sub_objects() {
            object.prepare_visible_objects(camera, batch);
        }
        batch.add_visible_object(object, level);
    }
}

impl SceneManager for OctreeSceneManager {
    fn add_object(&mut self, object: Box<dyn SceneObject>) -> SceneObjectKey {
        let dynamic = object.is_dynamic();
        let key = self.store.insert(object);
        if let Some(entry) = self.store.get_mut(key) {
            entry.object.on_added_to_scene(key);
        }

        if dynamic {
            self.dynamic_objects.push(key);
        } else {
            self.add_static_object(key);
        }
        key
    }

    fn remove_object(&mut self, key: SceneObjectKey) -> Option<Box<dyn SceneObject>> {
        let entry = self.store.get_mut(key)?;

        if entry.object.is_dynamic() {
            self.dynamic_objects.retain(|&k| k != key);
        }
        Self::remove_from_index(&mut self.octree, &mut self.far_objects, key, entry);
        entry.object.on_removed_from_scene();

        self.store.remove(key).map(|entry| entry.object)
    }

    fn object(&self, key: SceneObjectKey) -> Option<&dyn SceneObject> {
        self.store.get(key).map(|entry| entry.object.as_ref())
    }

    fn object_mut(&mut self, key: SceneObjectKey) -> Option<&mut dyn SceneObject> {
        let entry = self.store.get_mut(key)?;
        let object: &mut dyn SceneObject = entry.object.as_mut();
        Some(object)
    }

    fn object_count(&self) -> usize {
        self.store.len()
    }

    fn scene_node_of(&self, key: SceneObjectKey) -> Option<NodeId> {
        self.store.get(key)?.node
    }

    fn update(&mut self, delta_time: f32) {
        self.relocations.clear();
        for (key, entry) in self.store.iter_mut() {
            entry.object.update(delta_time);
            if entry.object.is_dynamic() && entry.object.requires_node_update() {
                entry.object.set_requires_node_update(false);
                self.relocations.push(key);
            }
        }

        let relocations = std::mem::take(&mut self.relocations);
        for &key in &relocations {
            if let Some(entry) = self.store.get_mut(key) {
                Self::remove_from_index(&mut self.octree, &mut self.far_objects, key, entry);
            }
            self.add_static_object(key);
        }
        self.relocations = relocations;
    }

    fn prepare_visible_objects(&mut self, camera: &Camera, batch: &mut BatchData) {
        let frustum = camera.frustum();

        self.queue.clear();
        self.queue.push_back(NodeId::ROOT);

        while let Some(id) = self.queue.pop_front() {
            let node = self.octree.node(id);
            if !frustum.intersects_sphere(node.bounding_sphere()) {
                continue;
            }
            self.queue.extend(node.children());

            for &key in node.objects() {
                let Some(entry) = self.store.get(key) else { continue };
                if entry.object.is_dynamic() {
                    continue;
                }
                let sphere = entry.object.bounding_sphere();
                if frustum.intersects_sphere(&sphere) {
                    Self::add_to_batch(camera, entry.object.as_ref(), &sphere, batch);
                }
            }
        }

        for &key in &self.far_objects {
            let Some(entry) = self.store.get(key) else { continue };
            if entry.object.is_dynamic() {
                continue;
            }
            let sphere = entry.object.bounding_sphere();
            if frustum.intersects_sphere(&sphere) {
                Self::add_to_batch(camera, entry.object.as_ref(), &sphere, batch);
            }
        }

        for &key in &self.dynamic_objects {
            let Some(entry) = self.store.get(key) else { continue };
            let sphere = entry.object.bounding_sphere();
            if frustum.intersects_sphere(&sphere) {
                Self::add_to_batch(camera, entry.object.as_ref(), &sphere, batch);
            }
        }
    }

    fn find_object(&mut self, ray: &Ray, filter: Option<ObjectFilter<'_>>) -> Option<SceneObjectKey> {
        assert!(self.queue.is_empty(), "find_object entered with a non-empty traversal queue");

        let mut nearest: Option<(SceneObjectKey, f32)> = None;
        let store = &self.store;
        let mut consider = |key: SceneObjectKey, entry: &ObjectEntry| {
            let sphere = entry.object.bounding_sphere();
            if ray.intersects_sphere(&sphere).is_none() || !entry.object.intersects_selection_ray(ray) {
                return;
            }
            if let Some(filter) = filter {
                if !filter(key, entry.object.as_ref()) {
                    return;
                }
            }
            let distance = sphere.distance_squared(ray.origin);
            if nearest.map_or(true, |(_, best)| distance < best) {
                nearest = Some((key, distance));
            }
        };

        self.queue.push_back(NodeId::ROOT);
        while let Some(id) = self.queue.pop_front() {
            let node = self.octree.node(id);
            if ray.intersects_sphere(node.bounding_sphere()).is_none() {
                continue;
            }
            self.queue.extend(node.children());

            for &key in node.objects() {
                if let Some(entry) = store.get(key) {
                    if !entry.object.is_dynamic() {
                        consider(key, entry);
                    }
                }
            }
        }

        for &key in &self.far_objects {
            if let Some(entry) = store.get(key) {
                if !entry.object.is_dynamic() {
                    consider(key, entry);
                }
            }
        }
        for &key in &self.dynamic_objects {
            if let Some(entry) = store.get(key) {
                consider(key, entry);
            }
        }

        nearest.map(|(key, _)| key)
    }
}

#[cfg(test)]
#[path = "octree_scene_manager_tests.rs"]
mod tests;
