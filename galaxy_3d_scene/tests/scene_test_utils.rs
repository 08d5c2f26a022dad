//! Shared test utilities for integration tests
//!
//! Provides a recording render device, in-memory resource factories, a
//! sphere-shaped scene object and a capturing logger, all built on the
//! public API only.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use galaxy_3d_scene::galaxy3d::camera::Camera;
use galaxy_3d_scene::galaxy3d::log::{LogEntry, LogSeverity, Logger};
use galaxy_3d_scene::galaxy3d::math::BoundingSphere;
use galaxy_3d_scene::galaxy3d::render::{
    ClearFlags, DepthFormat, DepthStencilBuffer, DepthStencilDesc, Effect, GeometryData, Material,
    MaterialDesc, ObjectFactory, PixelFormat, RenderDevice, RenderOperation, RenderTarget,
    RenderTargetDesc, ResourceProvider, Texture,
};
use galaxy_3d_scene::galaxy3d::scene::SceneObject;
use galaxy_3d_scene::galaxy3d::Galaxy3dResult;
use galaxy_3d_scene::glam::{Mat4, Vec3, Vec4};

// ============================================================================
// RECORDING DEVICE
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Clear(ClearFlags),
    RenderTarget(u32, Option<(u32, u32)>),
    DepthStencil(Option<(u32, u32)>),
    Render { material: String, operations: usize, selector: i32 },
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    pub calls: Vec<Call>,
}

impl RecordingDevice {
    pub fn take(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }
}

impl RenderDevice for RecordingDevice {
    fn clear(&mut self, flags: ClearFlags, _color: Vec4, _depth: f32, _stencil: i32) -> Galaxy3dResult<()> {
        self.calls.push(Call::Clear(flags));
        Ok(())
    }

    fn set_render_target(&mut self, index: u32, target: Option<&Arc<dyn RenderTarget>>) -> Galaxy3dResult<()> {
        self.calls.push(Call::RenderTarget(index, target.map(|t| (t.width(), t.height()))));
        Ok(())
    }

    fn set_depth_stencil_buffer(&mut self, buffer: Option<&Arc<dyn DepthStencilBuffer>>) -> Galaxy3dResult<()> {
        self.calls.push(Call::DepthStencil(buffer.map(|b| (b.width(), b.height()))));
        Ok(())
    }

    fn render(&mut self, material: &Material, operations: &[RenderOperation], selector_id: i32) -> Galaxy3dResult<()> {
        self.calls.push(Call::Render {
            material: material.name().to_string(),
            operations: operations.len(),
            selector: selector_id,
        });
        Ok(())
    }
}

// ============================================================================
// RESOURCES
// ============================================================================

#[derive(Debug)]
struct Target(RenderTargetDesc);

impl RenderTarget for Target {
    fn width(&self) -> u32 { self.0.width }
    fn height(&self) -> u32 { self.0.height }
    fn format(&self) -> PixelFormat { self.0.format }
    fn sample_count(&self) -> u32 { self.0.sample_count }
}

#[derive(Debug)]
struct Depth(DepthStencilDesc);

impl DepthStencilBuffer for Depth {
    fn width(&self) -> u32 { self.0.width }
    fn height(&self) -> u32 { self.0.height }
    fn format(&self) -> DepthFormat { self.0.format }
}

#[derive(Debug, Default)]
pub struct Factory {
    pub created: usize,
}

impl ObjectFactory for Factory {
    fn create_render_target(&mut self, desc: &RenderTargetDesc) -> Galaxy3dResult<Arc<dyn RenderTarget>> {
        self.created += 1;
        Ok(Arc::new(Target(*desc)))
    }

    fn create_depth_stencil_buffer(&mut self, desc: &DepthStencilDesc) -> Galaxy3dResult<Arc<dyn DepthStencilBuffer>> {
        self.created += 1;
        Ok(Arc::new(Depth(*desc)))
    }
}

#[derive(Debug)]
pub struct NamedEffect {
    pub name: String,
    pub parameters: Vec<String>,
}

impl Effect for NamedEffect {
    fn name(&self) -> &str {
        &self.name
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.parameters.iter().any(|p| p == name)
    }
}

#[derive(Debug, Default)]
pub struct Resources {
    pub effects: Vec<Arc<dyn Effect>>,
}

impl Resources {
    pub fn with_effect(mut self, name: &str, parameters: &[&str]) -> Self {
        self.effects.push(Arc::new(NamedEffect {
            name: name.to_string(),
            parameters: parameters.iter().map(|p| p.to_string()).collect(),
        }));
        self
    }
}

impl ResourceProvider for Resources {
    fn effect(&self, name: &str) -> Option<Arc<dyn Effect>> {
        self.effects.iter().find(|e| e.name() == name).cloned()
    }

    fn texture(&self, _name: &str) -> Option<Arc<dyn Texture>> {
        None
    }
}

// ============================================================================
// SCENE OBJECTS
// ============================================================================

/// Sphere drawing one operation, optionally moving every update
pub struct Ball {
    pub sphere: BoundingSphere,
    pub velocity: Option<Vec3>,
    pub moved: bool,
    pub operations: Vec<RenderOperation>,
}

impl Ball {
    pub fn new(center: Vec3, radius: f32, material: &Arc<Material>, geometry: &Arc<GeometryData>) -> Self {
        Self {
            sphere: BoundingSphere::new(center, radius),
            velocity: None,
            moved: false,
            operations: vec![RenderOperation::new(material.clone(), geometry.clone())],
        }
    }

    pub fn moving(mut self, velocity: Vec3) -> Self {
        self.velocity = Some(velocity);
        self
    }
}

impl SceneObject for Ball {
    fn bounding_sphere(&self) -> BoundingSphere {
        self.sphere
    }

    fn is_dynamic(&self) -> bool {
        self.velocity.is_some()
    }

    fn render_operation(&self, _level: usize) -> &[RenderOperation] {
        &self.operations
    }

    fn world_transform(&self) -> Mat4 {
        Mat4::from_translation(self.sphere.center)
    }

    fn update(&mut self, delta_time: f32) {
        if let Some(velocity) = self.velocity {
            self.sphere.center += velocity * delta_time;
            self.moved = true;
        }
    }

    fn requires_node_update(&self) -> bool {
        self.moved
    }

    fn set_requires_node_update(&mut self, value: bool) {
        self.moved = value;
    }
}

pub fn material(name: &str, priority: i32, pass_flags: u64) -> Arc<Material> {
    Arc::new(Material::new(MaterialDesc {
        name: name.to_string(),
        priority,
        pass_flags,
        ..Default::default()
    }))
}

pub fn camera(eye: Vec3, target: Vec3) -> Camera {
    let projection = Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 16.0 / 9.0, 0.1, 5000.0);
    Camera::new(Mat4::look_at_rh(eye, target, Vec3::Y), projection)
}

// ============================================================================
// LOGGER
// ============================================================================

/// Logger capturing entries for verification
#[derive(Default)]
pub struct TestLogger {
    entries: Mutex<Vec<LogEntry>>,
}

impl TestLogger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn count(&self, severity: LogSeverity) -> usize {
        self.entries().iter().filter(|e| e.severity == severity).count()
    }
}

impl Logger for TestLogger {
    fn log(&self, entry: &LogEntry) {
        self.entries.lock().unwrap().push(entry.clone());
    }
}
