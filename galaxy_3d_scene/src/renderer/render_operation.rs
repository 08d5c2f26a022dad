/// One draw of one geometry with one material.
///
/// Scene objects hand out operation buffers per level of detail.
/// `BatchData` copies the operations it accepts, so the object keeps
/// ownership of its own buffer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use glam::Mat4;
use super::material::Material;

static NEXT_GEOMETRY_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a geometry descriptor, allocated at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(u64);

/// Geometry descriptor shared by every operation drawing the same mesh part
#[derive(Debug)]
pub struct GeometryData {
    id: GeometryId,
    vertex_count: u32,
    primitive_count: u32,
    discard: bool,
}

impl GeometryData {
    pub fn new(vertex_count: u32, primitive_count: u32) -> Self {
        Self {
            id: GeometryId(NEXT_GEOMETRY_ID.fetch_add(1, Ordering::Relaxed)),
            vertex_count,
            primitive_count,
            discard: false,
        }
    }

    /// Mark this geometry as discarded.
    ///
    /// When `BatchData::render_batch` meets a discarded geometry it stops
    /// drawing the remaining geometries of that material for the pass.
    pub fn discarded(mut self) -> Self {
        self.discard = true;
        self
    }

    pub fn id(&self) -> GeometryId {
        self.id
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn primitive_count(&self) -> u32 {
        self.primitive_count
    }

    pub fn discard(&self) -> bool {
        self.discard
    }
}

/// One draw call description
#[derive(Debug, Clone)]
pub struct RenderOperation {
    pub material: Option<Arc<Material>>,
    pub geometry: Option<Arc<GeometryData>>,
    /// Transform relative to the owning object (or world, if final)
    pub root_transform: Mat4,
    /// When set, `root_transform` is already in world space and is not
    /// multiplied by the object's world transform at batching time.
    pub root_transform_is_final: bool,
}

impl RenderOperation {
    pub fn new(material: Arc<Material>, geometry: Arc<GeometryData>) -> Self {
        Self {
            material: Some(material),
            geometry: Some(geometry),
            root_transform: Mat4::IDENTITY,
            root_transform_is_final: false,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.root_transform = transform;
        self
    }

    pub fn with_final_transform(mut self, transform: Mat4) -> Self {
        self.root_transform = transform;
        self.root_transform_is_final = true;
        self
    }
}
