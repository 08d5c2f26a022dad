/// Scene object used by unit tests: a sphere with one operation list
/// per level of detail.

use std::sync::Arc;
use glam::{Mat4, Vec3};
use crate::camera::Camera;
use crate::math::BoundingSphere;
use crate::renderer::{GeometryData, Material, MaterialDesc, RenderOperation};
use super::scene_node::NodeId;
use super::scene_object::{SceneObject, SceneObjectKey};

pub(crate) struct TestObject {
    pub sphere: BoundingSphere,
    pub dynamic: bool,
    /// Indexed by level; the last list serves every deeper level
    pub levels: Vec<Vec<RenderOperation>>,
    pub velocity: Vec3,
    pub moved: bool,
    pub parent: Option<NodeId>,
    pub key: Option<SceneObjectKey>,
}

impl TestObject {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            sphere: BoundingSphere::new(center, radius),
            dynamic: false,
            levels: Vec::new(),
            velocity: Vec3::ZERO,
            moved: false,
            parent: None,
            key: None,
        }
    }

    pub fn dynamic(mut self, velocity: Vec3) -> Self {
        self.dynamic = true;
        self.velocity = velocity;
        self
    }

    pub fn with_operations(mut self, operations: Vec<RenderOperation>) -> Self {
        self.levels.push(operations);
        self
    }

    /// One operation drawing `geometry` with `material`
    pub fn drawing(self, material: &Arc<Material>, geometry: &Arc<GeometryData>) -> Self {
        self.with_operations(vec![RenderOperation::new(material.clone(), geometry.clone())])
    }

    pub fn boxed(self) -> Box<dyn SceneObject> {
        Box::new(self)
    }
}

impl SceneObject for TestObject {
    fn bounding_sphere(&self) -> BoundingSphere {
        self.sphere
    }

    fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    fn render_operation(&self, level: usize) -> &[RenderOperation] {
        self.levels.get(level)
            .or_else(|| self.levels.last())
            .map_or(&[][..], Vec::as_slice)
    }

    fn world_transform(&self) -> Mat4 {
        Mat4::from_translation(self.sphere.center)
    }

    fn update(&mut self, delta_time: f32) {
        if self.velocity != Vec3::ZERO {
            self.sphere.center += self.velocity * delta_time;
            self.moved = true;
        }
    }

    fn requires_node_update(&self) -> bool {
        self.moved
    }

    fn set_requires_node_update(&mut self, value: bool) {
        self.moved = value;
    }

    fn on_added_to_scene(&mut self, key: SceneObjectKey) {
        self.key = Some(key);
    }

    fn on_removed_from_scene(&mut self) {
        self.key = None;
    }

    fn notify_parent_node(&mut self, node: Option<NodeId>) {
        self.parent = node;
    }
}

/// Material with a name and pass flags, priority 0
pub(crate) fn material(name: &str, pass_flags: u64) -> Arc<Material> {
    Arc::new(Material::new(MaterialDesc {
        name: name.to_string(),
        pass_flags,
        ..Default::default()
    }))
}

/// Camera at `eye` looking at `target`, 45 degree field of view
pub(crate) fn camera_looking_at(eye: Vec3, target: Vec3) -> Camera {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 1000.0);
    let view = Mat4::look_at_rh(eye, target, Vec3::Y);
    Camera::new(view, projection)
}
