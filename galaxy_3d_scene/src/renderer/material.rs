/// Material: the rendering state shared by a group of operations.
///
/// Batches are keyed by material identity (`MaterialId`), so two materials
/// with identical settings still form separate groups.
///
/// Architecture:
/// - Priority: coarse draw-order bucket, clamped by `BatchData`
/// - Pass flags: bit N set = draw this material in passes with selector N
/// - Effect: shader program family (optional, resolved by the device)
/// - Parameters: named values bound to the effect at draw time

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use glam::{Mat4, Vec2, Vec3, Vec4};
use super::render_device::{Effect, RenderTarget, Texture};

static NEXT_MATERIAL_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a material, allocated at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u64);

// ===== PARAMETER VALUES =====

/// A typed parameter value bound to an effect
#[derive(Debug, Clone)]
pub enum ParamValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Matrix(Mat4),
    FloatArray(Vec<f32>),
    Vec2Array(Vec<Vec2>),
    Texture(Arc<dyn Texture>),
    RenderTarget(Arc<dyn RenderTarget>),
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Vec2(a), Self::Vec2(b)) => a == b,
            (Self::Vec3(a), Self::Vec3(b)) => a == b,
            (Self::Vec4(a), Self::Vec4(b)) => a == b,
            (Self::Matrix(a), Self::Matrix(b)) => a == b,
            (Self::FloatArray(a), Self::FloatArray(b)) => a == b,
            (Self::Vec2Array(a), Self::Vec2Array(b)) => a == b,
            // Handles compare by identity
            (Self::Texture(a), Self::Texture(b)) => Arc::ptr_eq(a, b),
            (Self::RenderTarget(a), Self::RenderTarget(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

// ===== DESCRIPTOR =====

/// Material creation descriptor
#[derive(Clone, Default)]
pub struct MaterialDesc {
    pub name: String,
    /// Draw-order bucket, clamped to `[0, MAX_PRIORITY - 1]` when batched
    pub priority: i32,
    /// Bitmask of pass selectors that draw this material
    pub pass_flags: u64,
    pub effect: Option<Arc<dyn Effect>>,
    pub params: Vec<(String, ParamValue)>,
}

// ===== MATERIAL =====

pub struct Material {
    id: MaterialId,
    name: String,
    priority: i32,
    pass_flags: u64,
    effect: Option<Arc<dyn Effect>>,
    params: Vec<(String, ParamValue)>,
}

impl Material {
    /// Create a material with a fresh identity.
    pub fn new(desc: MaterialDesc) -> Self {
        Self {
            id: MaterialId(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed)),
            name: desc.name,
            priority: desc.priority,
            pass_flags: desc.pass_flags,
            effect: desc.effect,
            params: desc.params,
        }
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn pass_flags(&self) -> u64 {
        self.pass_flags
    }

    pub fn effect(&self) -> Option<&Arc<dyn Effect>> {
        self.effect.as_ref()
    }

    /// All bound parameters, in binding order
    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }

    /// Look up a parameter by name
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl fmt::Debug for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Material")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("pass_flags", &format_args!("{:#x}", self.pass_flags))
            .field("effect", &self.effect.as_ref().map(|e| e.name().to_string()))
            .field("params", &self.params.len())
            .finish()
    }
}
