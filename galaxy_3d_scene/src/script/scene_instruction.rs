/// Scene instruction set.
///
/// A scene pass is a flat array of instructions run by a small operand
/// stack machine. Stack values are two 32-bit words: booleans, integers
/// and floats use the first word, wider values contribute their first two.
/// Jump targets are absolute instruction indices, back-patched by the
/// script parser once the jumped-over block is emitted.

use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::renderer::ParamValue;
use super::scene_variable::SceneVariable;

/// Two-word operand stack value
pub type StackValue = [u32; 2];

// ===== PARAMETER TYPES =====

/// Declared type of a value read from a script attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Bool,
    Int,
    Float,
    Vector2,
    Vector3,
    Vector4,
    Matrix,
    Texture,
    FloatArray,
}

impl ParamType {
    /// Parse a type name as written in `<Param Type=...>` (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        let ty = match name.trim().to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Self::Bool,
            "int" | "integer" => Self::Int,
            "float" | "single" => Self::Float,
            "vector2" | "float2" => Self::Vector2,
            "vector3" | "float3" => Self::Vector3,
            "vector4" | "float4" => Self::Vector4,
            "matrix" | "float4x4" => Self::Matrix,
            "texture" => Self::Texture,
            "floatarray" => Self::FloatArray,
            _ => return None,
        };
        Some(ty)
    }
}

/// Parse immediate text for `ty`.
///
/// Vectors and matrices are comma-separated floats; a single float is
/// splatted to every vector component. A `Vector4` also accepts
/// `0xAARRGGBB` colors.
pub fn parse_immediate(text: &str, ty: ParamType) -> Option<ParamValue> {
    let text = text.trim();
    match ty {
        ParamType::Bool => parse_bool(text).map(ParamValue::Bool),
        ParamType::Int => text.parse().ok().map(ParamValue::Int),
        ParamType::Float => text.parse().ok().map(ParamValue::Float),
        ParamType::Vector2 => parse_floats::<2>(text).map(|v| ParamValue::Vec2(Vec2::from_array(v))),
        ParamType::Vector3 => parse_floats::<3>(text).map(|v| ParamValue::Vec3(Vec3::from_array(v))),
        ParamType::Vector4 => parse_color(text)
            .or_else(|| parse_floats::<4>(text).map(Vec4::from_array))
            .map(ParamValue::Vec4),
        ParamType::Matrix => parse_floats::<16>(text).map(|v| ParamValue::Matrix(Mat4::from_cols_array(&v))),
        ParamType::FloatArray => text.split(',')
            .map(|part| part.trim().parse::<f32>().ok())
            .collect::<Option<Vec<_>>>()
            .map(ParamValue::FloatArray),
        ParamType::Texture => None,
    }
}

/// `true`/`false` (case-insensitive) or an integer, non-zero meaning true
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        text.parse::<i64>().ok().map(|v| v != 0)
    }
}

fn parse_floats<const N: usize>(text: &str) -> Option<[f32; N]> {
    let values = text.split(',')
        .map(|part| part.trim().parse::<f32>().ok())
        .collect::<Option<Vec<_>>>()?;
    match values.len() {
        1 => Some([values[0]; N]),
        n if n == N => values.try_into().ok(),
        _ => None,
    }
}

fn parse_color(text: &str) -> Option<Vec4> {
    let hex = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X"))?;
    let argb = u32::from_str_radix(hex, 16).ok()?;
    let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
    Some(Vec4::new(channel(16), channel(8), channel(0), channel(24)))
}

/// Convert a value to `ty`, when a conversion makes sense.
pub fn coerce(value: &ParamValue, ty: ParamType) -> Option<ParamValue> {
    use ParamValue as P;
    let converted = match (ty, value) {
        (ParamType::Bool, P::Bool(b)) => P::Bool(*b),
        (ParamType::Bool, P::Int(i)) => P::Bool(*i != 0),
        (ParamType::Bool, P::Float(f)) => P::Bool(*f != 0.0),

        (ParamType::Int, P::Bool(b)) => P::Int(*b as i32),
        (ParamType::Int, P::Int(i)) => P::Int(*i),
        (ParamType::Int, P::Float(f)) => P::Int(*f as i32),

        (ParamType::Float, P::Bool(b)) => P::Float(*b as i32 as f32),
        (ParamType::Float, P::Int(i)) => P::Float(*i as f32),
        (ParamType::Float, P::Float(f)) => P::Float(*f),

        (ParamType::Vector2, P::Float(f)) => P::Vec2(Vec2::splat(*f)),
        (ParamType::Vector2, P::Vec2(v)) => P::Vec2(*v),
        (ParamType::Vector2, P::Vec3(v)) => P::Vec2(v.truncate()),
        (ParamType::Vector2, P::Vec4(v)) => P::Vec2(v.truncate().truncate()),

        (ParamType::Vector3, P::Float(f)) => P::Vec3(Vec3::splat(*f)),
        (ParamType::Vector3, P::Vec2(v)) => P::Vec3(v.extend(0.0)),
        (ParamType::Vector3, P::Vec3(v)) => P::Vec3(*v),
        (ParamType::Vector3, P::Vec4(v)) => P::Vec3(v.truncate()),

        (ParamType::Vector4, P::Float(f)) => P::Vec4(Vec4::splat(*f)),
        (ParamType::Vector4, P::Vec2(v)) => P::Vec4(v.extend(0.0).extend(0.0)),
        (ParamType::Vector4, P::Vec3(v)) => P::Vec4(v.extend(0.0)),
        (ParamType::Vector4, P::Vec4(v)) => P::Vec4(*v),

        (ParamType::Matrix, P::Matrix(m)) => P::Matrix(*m),

        (ParamType::Texture, P::Texture(_) | P::RenderTarget(_)) => value.clone(),

        (ParamType::FloatArray, P::Float(f)) => P::FloatArray(vec![*f]),
        (ParamType::FloatArray, P::FloatArray(_) | P::Vec2Array(_)) => value.clone(),

        _ => return None,
    };
    Some(converted)
}

/// First two words of a value, as pushed by `Load`.
pub fn param_words(value: &ParamValue) -> StackValue {
    match value {
        ParamValue::Bool(b) => [*b as u32, 0],
        ParamValue::Int(i) => [*i as u32, 0],
        ParamValue::Float(f) => [f.to_bits(), 0],
        ParamValue::Vec2(v) => bytemuck::cast(*v),
        ParamValue::Vec3(v) => [v.x.to_bits(), v.y.to_bits()],
        ParamValue::Vec4(v) => [v.x.to_bits(), v.y.to_bits()],
        ParamValue::Matrix(m) => {
            let words: [u32; 16] = bytemuck::cast(m.to_cols_array());
            [words[0], words[1]]
        }
        ParamValue::FloatArray(values) => [
            values.first().map_or(0, |f| f.to_bits()),
            values.get(1).map_or(0, |f| f.to_bits()),
        ],
        ParamValue::Vec2Array(values) => values.first().map_or([0, 0], |v| bytemuck::cast(*v)),
        ParamValue::Texture(texture) => [texture.width(), texture.height()],
        ParamValue::RenderTarget(target) => [target.width(), target.height()],
    }
}

// ===== OPERANDS =====

/// Instruction operand: an immediate value or a variable reference.
///
/// Scripts write variable references as `[name]` or `[name.Property]`.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneOpArg {
    Immediate(ParamValue),
    Variable {
        index: usize,
        property: Option<String>,
    },
}

impl SceneOpArg {
    /// Resolve to a value (`None` for an unknown property or an unset handle).
    pub fn resolve(&self, variables: &[SceneVariable]) -> Option<ParamValue> {
        match self {
            Self::Immediate(value) => Some(value.clone()),
            Self::Variable { index, property } => {
                let variable = variables.get(*index)?;
                match property {
                    Some(property) => variable.property(property),
                    None => variable.to_param(),
                }
            }
        }
    }

    /// Two-word stack value of the operand.
    pub fn words(&self, variables: &[SceneVariable]) -> StackValue {
        match self {
            Self::Immediate(value) => param_words(value),
            Self::Variable { index, property: None } => variables.get(*index)
                .map_or([0, 0], SceneVariable::leading_words),
            Self::Variable { .. } => self.resolve(variables)
                .map_or([0, 0], |value| param_words(&value)),
        }
    }

    /// Variable index, for operands that must name a variable
    pub fn variable_index(&self) -> Option<usize> {
        match self {
            Self::Variable { index, .. } => Some(*index),
            Self::Immediate(_) => None,
        }
    }
}

// ===== INSTRUCTIONS =====

/// Operands of a `Clear` instruction
#[derive(Debug, Clone, PartialEq)]
pub struct ClearArgs {
    pub clear_color: SceneOpArg,
    pub clear_depth: SceneOpArg,
    pub clear_stencil: SceneOpArg,
    pub depth: SceneOpArg,
    pub stencil: SceneOpArg,
    pub color: SceneOpArg,
}

/// Named effect parameter bound by `RenderQuad`
#[derive(Debug, Clone, PartialEq)]
pub struct QuadParam {
    pub name: String,
    pub ty: ParamType,
    pub value: SceneOpArg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneInstruction {
    /// Push the operand's two words
    Load(SceneOpArg),
    And,
    Or,
    Not,
    /// Pop; jump to `target` if the value is zero
    Jz { target: usize },
    /// Pop; jump to `target` if the value is non-zero
    Jnz { target: usize },
    /// Pop into a boolean variable
    Pop { variable: usize },
    Clear(ClearArgs),
    /// Bind the render target variable (an immediate unbinds) at `index`
    UseRT { index: SceneOpArg, target: SceneOpArg },
    /// Bind the depth-stencil variable (an immediate unbinds)
    UseDS { target: SceneOpArg },
    /// Submit the batch for the pass selector
    Render,
    /// Draw the unit quad scaled by `scale` with `effect`
    RenderQuad {
        scale: SceneOpArg,
        effect: SceneOpArg,
        params: Vec<QuadParam>,
    },
    /// Store whether the batch holds anything for `selector` into `result`
    VisibleTo { selector: SceneOpArg, result: usize },
}

#[cfg(test)]
#[path = "scene_instruction_tests.rs"]
mod tests;
