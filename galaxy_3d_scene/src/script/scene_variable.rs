/// Named, typed globals of a scene procedure.
///
/// Declared by `<Declare>` elements and shared by every pass of the
/// procedure. Scalar and vector payloads fit in `SCENE_VARIABLE_WORDS`
/// 32-bit words (the largest, a 4x4 matrix, fills all of them); resource
/// variables hold a handle that stays `None` when it could not be resolved
/// or created.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::renderer::{DepthStencilBuffer, Effect, ParamValue, RenderTarget, Texture};
use super::gauss_blur_filter::GaussBlurFilter;

/// Capacity of a variable payload, in 32-bit words
pub const SCENE_VARIABLE_WORDS: usize = 16;

const _: () = assert!(std::mem::size_of::<Mat4>() == SCENE_VARIABLE_WORDS * 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneVariableType {
    RenderTarget,
    DepthStencil,
    Matrix,
    Vector4,
    Vector3,
    Vector2,
    Single,
    Texture,
    Integer,
    Boolean,
    Effect,
    GaussBlurFilter,
}

impl SceneVariableType {
    /// Parse a `Type` attribute (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        const NAMES: [(&str, SceneVariableType); 12] = [
            ("RenderTarget", SceneVariableType::RenderTarget),
            ("DepthStencil", SceneVariableType::DepthStencil),
            ("Matrix", SceneVariableType::Matrix),
            ("Vector4", SceneVariableType::Vector4),
            ("Vector3", SceneVariableType::Vector3),
            ("Vector2", SceneVariableType::Vector2),
            ("Single", SceneVariableType::Single),
            ("Texture", SceneVariableType::Texture),
            ("Integer", SceneVariableType::Integer),
            ("Boolean", SceneVariableType::Boolean),
            ("Effect", SceneVariableType::Effect),
            ("GaussBlurFilter", SceneVariableType::GaussBlurFilter),
        ];
        NAMES.iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name.trim()))
            .map(|(_, t)| *t)
    }
}

#[derive(Debug, Clone)]
pub enum SceneVariableValue {
    RenderTarget(Option<Arc<dyn RenderTarget>>),
    DepthStencil(Option<Arc<dyn DepthStencilBuffer>>),
    Matrix(Mat4),
    Vector4(Vec4),
    Vector3(Vec3),
    Vector2(Vec2),
    Single(f32),
    Texture(Option<Arc<dyn Texture>>),
    Integer(i32),
    Boolean(bool),
    Effect(Option<Arc<dyn Effect>>),
    GaussBlurFilter(GaussBlurFilter),
}

impl SceneVariableValue {
    pub fn variable_type(&self) -> SceneVariableType {
        match self {
            Self::RenderTarget(_) => SceneVariableType::RenderTarget,
            Self::DepthStencil(_) => SceneVariableType::DepthStencil,
            Self::Matrix(_) => SceneVariableType::Matrix,
            Self::Vector4(_) => SceneVariableType::Vector4,
            Self::Vector3(_) => SceneVariableType::Vector3,
            Self::Vector2(_) => SceneVariableType::Vector2,
            Self::Single(_) => SceneVariableType::Single,
            Self::Texture(_) => SceneVariableType::Texture,
            Self::Integer(_) => SceneVariableType::Integer,
            Self::Boolean(_) => SceneVariableType::Boolean,
            Self::Effect(_) => SceneVariableType::Effect,
            Self::GaussBlurFilter(_) => SceneVariableType::GaussBlurFilter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SceneVariable {
    name: String,
    value: SceneVariableValue,
}

impl SceneVariable {
    pub fn new(name: impl Into<String>, value: SceneVariableValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &SceneVariableValue {
        &self.value
    }

    pub fn variable_type(&self) -> SceneVariableType {
        self.value.variable_type()
    }

    pub fn set_value(&mut self, value: SceneVariableValue) {
        self.value = value;
    }

    /// Overwrite a boolean variable. Other types are left untouched.
    pub fn set_boolean(&mut self, value: bool) -> bool {
        match &mut self.value {
            SceneVariableValue::Boolean(b) => {
                *b = value;
                true
            }
            _ => false,
        }
    }

    /// Whether a resource variable holds its handle (always true for values)
    pub fn is_resolved(&self) -> bool {
        match &self.value {
            SceneVariableValue::RenderTarget(rt) => rt.is_some(),
            SceneVariableValue::DepthStencil(ds) => ds.is_some(),
            SceneVariableValue::Texture(t) => t.is_some(),
            SceneVariableValue::Effect(e) => e.is_some(),
            _ => true,
        }
    }

    pub fn render_target(&self) -> Option<&Arc<dyn RenderTarget>> {
        match &self.value {
            SceneVariableValue::RenderTarget(rt) => rt.as_ref(),
            _ => None,
        }
    }

    pub fn depth_stencil(&self) -> Option<&Arc<dyn DepthStencilBuffer>> {
        match &self.value {
            SceneVariableValue::DepthStencil(ds) => ds.as_ref(),
            _ => None,
        }
    }

    pub fn effect(&self) -> Option<&Arc<dyn Effect>> {
        match &self.value {
            SceneVariableValue::Effect(effect) => effect.as_ref(),
            _ => None,
        }
    }

    /// First two payload words, as loaded on the operand stack.
    ///
    /// Handles load their size (zero when unset), so they test true once
    /// resolved.
    pub fn leading_words(&self) -> [u32; 2] {
        match &self.value {
            SceneVariableValue::RenderTarget(rt) => rt.as_ref().map_or([0, 0], |t| [t.width(), t.height()]),
            SceneVariableValue::DepthStencil(ds) => ds.as_ref().map_or([0, 0], |b| [b.width(), b.height()]),
            SceneVariableValue::Texture(t) => t.as_ref().map_or([0, 0], |t| [t.width(), t.height()]),
            SceneVariableValue::Effect(e) => [e.is_some() as u32, 0],
            SceneVariableValue::Matrix(m) => {
                let words: [u32; SCENE_VARIABLE_WORDS] = bytemuck::cast(m.to_cols_array());
                [words[0], words[1]]
            }
            SceneVariableValue::Vector4(v) => [v.x.to_bits(), v.y.to_bits()],
            SceneVariableValue::Vector3(v) => [v.x.to_bits(), v.y.to_bits()],
            SceneVariableValue::Vector2(v) => bytemuck::cast(*v),
            SceneVariableValue::Single(f) => [f.to_bits(), 0],
            SceneVariableValue::Integer(i) => [*i as u32, 0],
            SceneVariableValue::Boolean(b) => [*b as u32, 0],
            SceneVariableValue::GaussBlurFilter(filter) => [filter.sample_weights().len() as u32, 0],
        }
    }

    /// The whole variable as an effect parameter value.
    pub fn to_param(&self) -> Option<ParamValue> {
        let value = match &self.value {
            SceneVariableValue::RenderTarget(rt) => ParamValue::RenderTarget(rt.clone()?),
            SceneVariableValue::Texture(t) => ParamValue::Texture(t.clone()?),
            SceneVariableValue::Matrix(m) => ParamValue::Matrix(*m),
            SceneVariableValue::Vector4(v) => ParamValue::Vec4(*v),
            SceneVariableValue::Vector3(v) => ParamValue::Vec3(*v),
            SceneVariableValue::Vector2(v) => ParamValue::Vec2(*v),
            SceneVariableValue::Single(f) => ParamValue::Float(*f),
            SceneVariableValue::Integer(i) => ParamValue::Int(*i),
            SceneVariableValue::Boolean(b) => ParamValue::Bool(*b),
            SceneVariableValue::GaussBlurFilter(filter) => {
                ParamValue::FloatArray(filter.sample_weights().to_vec())
            }
            SceneVariableValue::DepthStencil(_) | SceneVariableValue::Effect(_) => return None,
        };
        Some(value)
    }

    /// Named property (`Width`, `Height`, `Size`, `X`..`W`,
    /// `SampleOffsets`, `SampleWeights`), case-insensitive.
    pub fn property(&self, name: &str) -> Option<ParamValue> {
        let name = name.trim().to_ascii_lowercase();

        let size = match &self.value {
            SceneVariableValue::RenderTarget(Some(t)) => Some((t.width(), t.height())),
            SceneVariableValue::DepthStencil(Some(b)) => Some((b.width(), b.height())),
            SceneVariableValue::Texture(Some(t)) => Some((t.width(), t.height())),
            _ => None,
        };
        if let Some((width, height)) = size {
            return match name.as_str() {
                "width" => Some(ParamValue::Int(width as i32)),
                "height" => Some(ParamValue::Int(height as i32)),
                "size" => Some(ParamValue::Vec2(Vec2::new(width as f32, height as f32))),
                _ => None,
            };
        }

        let components = match &self.value {
            SceneVariableValue::Vector4(v) => Some((4, v.to_array())),
            SceneVariableValue::Vector3(v) => Some((3, v.extend(0.0).to_array())),
            SceneVariableValue::Vector2(v) => Some((2, [v.x, v.y, 0.0, 0.0])),
            _ => None,
        };
        if let Some((count, components)) = components {
            let index = match name.as_str() {
                "x" => 0,
                "y" => 1,
                "z" => 2,
                "w" => 3,
                _ => return None,
            };
            return (index < count).then(|| ParamValue::Float(components[index]));
        }

        match (&self.value, name.as_str()) {
            (SceneVariableValue::GaussBlurFilter(filter), "sampleoffsets") => {
                Some(ParamValue::FloatArray(filter.sample_offsets().to_vec()))
            }
            (SceneVariableValue::GaussBlurFilter(filter), "sampleweights") => {
                Some(ParamValue::FloatArray(filter.sample_weights().to_vec()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "scene_variable_tests.rs"]
mod tests;
