/// Builds a `SceneProcedure` from a script tree.
///
/// Script shape:
///
/// ```text
/// <Scene Name="...">
///   <Declare Name="..." Type="RenderTarget|DepthStencil|Matrix|Vector4|Vector3|
///            Vector2|Single|Texture|Integer|Boolean|Effect|GaussBlurFilter">
///     <Width/> <Height/> | <WidthP/> <HeightP/>  <Format/> <SampleCount/>
///     <Value/> <Source/> <BlurAmount/>
///   </Declare>
///   <Pass Name="..." SelectorID="N" CameraID="N">
///     <If E="expr"> ... </If>
///     <E S="expr" Ret="booleanVar"/>
///     <C S="clear|usert|useds|render|renderquad|visibleto" .../>
///   </Pass>
/// </Scene>
/// ```
///
/// Attribute values are immediates, or variable references written
/// `[name]` / `[name.Property]`. Content problems (unknown elements or
/// types, malformed values, unresolved names) are logged as warnings and
/// skipped. Only malformed expressions and a non-`Scene` root fail.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::error::{Galaxy3dError, Galaxy3dResult};
use crate::log::Logger;
use crate::procedure::{ScenePass, SceneProcedure};
use crate::renderer::{
    DepthFormat, DepthStencilDesc, ObjectFactory, ParamValue, PixelFormat, RenderTargetDesc,
    ResourceProvider,
};
use crate::{engine_debug, engine_warn};
use super::expression_compiler::ExpressionCompiler;
use super::gauss_blur_filter::GaussBlurFilter;
use super::scene_instruction::{
    parse_immediate, ClearArgs, ParamType, QuadParam, SceneInstruction, SceneOpArg,
};
use super::scene_variable::{SceneVariable, SceneVariableType, SceneVariableValue};
use super::script_element::ScriptElement;

const LOG_SOURCE: &str = "galaxy3d::SceneRenderScriptParser";

/// Values needed while loading a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLoadContext {
    /// Reference width for `WidthP` percentages
    pub viewport_width: u32,
    /// Reference height for `HeightP` percentages
    pub viewport_height: u32,
}

impl Default for ScriptLoadContext {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

pub struct SceneRenderScriptParser {
    logger: Arc<dyn Logger>,
    compiler: ExpressionCompiler,
    context: ScriptLoadContext,
}

impl SceneRenderScriptParser {
    pub fn new(context: ScriptLoadContext, logger: Arc<dyn Logger>) -> Self {
        Self {
            compiler: ExpressionCompiler::new(logger.clone()),
            logger,
            context,
        }
    }

    pub fn context(&self) -> &ScriptLoadContext {
        &self.context
    }

    /// Parse a `<Scene>` tree into a procedure.
    ///
    /// Render targets and depth-stencil buffers are created through
    /// `factory`; textures and effects are looked up in `resources`.
    pub fn parse(
        &self,
        root: &ScriptElement,
        factory: &mut dyn ObjectFactory,
        resources: &dyn ResourceProvider,
    ) -> Galaxy3dResult<SceneProcedure> {
        if !root.is("Scene") {
            return Err(Galaxy3dError::InvalidScript(format!(
                "root element is <{}>, expected <Scene>", root.name
            )));
        }
        let name = root.attribute("Name").unwrap_or_default().to_string();

        let mut variables: Vec<SceneVariable> = Vec::new();
        for element in root.children.iter().filter(|e| e.is("Declare")) {
            if let Some(variable) = self.parse_declaration(element, &variables, factory, resources) {
                variables.push(variable);
            }
        }

        let mut passes = Vec::new();
        for element in &root.children {
            if element.is("Pass") {
                passes.push(self.parse_pass(element, &variables)?);
            } else if !element.is("Declare") {
                engine_warn!(self.logger, LOG_SOURCE,
                    "Scene '{}': unknown element <{}> skipped", name, element.name);
            }
        }

        engine_debug!(self.logger, LOG_SOURCE,
            "Scene '{}' parsed: {} variables, {} passes", name, variables.len(), passes.len());

        Ok(SceneProcedure::new(name, variables, passes, self.logger.clone()))
    }

    // ===== DECLARATIONS =====

    fn parse_declaration(
        &self,
        element: &ScriptElement,
        declared: &[SceneVariable],
        factory: &mut dyn ObjectFactory,
        resources: &dyn ResourceProvider,
    ) -> Option<SceneVariable> {
        let Some(name) = element.attribute("Name").filter(|n| !n.is_empty()) else {
            engine_warn!(self.logger, LOG_SOURCE, "<Declare> without a Name skipped");
            return None;
        };
        if declared.iter().any(|v| v.name() == name) {
            engine_warn!(self.logger, LOG_SOURCE, "Variable '{}' declared twice, second declaration skipped", name);
            return None;
        }
        let type_name = element.attribute("Type").unwrap_or_default();
        let Some(variable_type) = SceneVariableType::parse(type_name) else {
            engine_warn!(self.logger, LOG_SOURCE, "Variable '{}': unknown type '{}' skipped", name, type_name);
            return None;
        };

        let value = match variable_type {
            SceneVariableType::RenderTarget => {
                let (width, height) = self.parse_size(element, name);
                let format = self.parse_enum(element, name, "Format", PixelFormat::parse)
                    .unwrap_or(PixelFormat::A8R8G8B8);
                let sample_count = self.parse_value(element, name, "SampleCount", |t| t.parse::<u32>().ok())
                    .unwrap_or(1);
                let desc = RenderTargetDesc { width, height, format, sample_count };
                let target = match factory.create_render_target(&desc) {
                    Ok(target) => Some(target),
                    Err(error) => {
                        engine_warn!(self.logger, LOG_SOURCE,
                            "Variable '{}': render target creation failed: {}", name, error);
                        None
                    }
                };
                SceneVariableValue::RenderTarget(target)
            }
            SceneVariableType::DepthStencil => {
                let (width, height) = self.parse_size(element, name);
                let format = self.parse_enum(element, name, "Format", DepthFormat::parse)
                    .unwrap_or(DepthFormat::D24S8);
                let desc = DepthStencilDesc { width, height, format };
                let buffer = match factory.create_depth_stencil_buffer(&desc) {
                    Ok(buffer) => Some(buffer),
                    Err(error) => {
                        engine_warn!(self.logger, LOG_SOURCE,
                            "Variable '{}': depth-stencil creation failed: {}", name, error);
                        None
                    }
                };
                SceneVariableValue::DepthStencil(buffer)
            }
            SceneVariableType::Matrix => SceneVariableValue::Matrix(
                match self.parse_typed_value(element, name, ParamType::Matrix) {
                    Some(ParamValue::Matrix(m)) => m,
                    _ => Mat4::IDENTITY,
                },
            ),
            SceneVariableType::Vector4 => SceneVariableValue::Vector4(
                match self.parse_typed_value(element, name, ParamType::Vector4) {
                    Some(ParamValue::Vec4(v)) => v,
                    _ => Vec4::ZERO,
                },
            ),
            SceneVariableType::Vector3 => SceneVariableValue::Vector3(
                match self.parse_typed_value(element, name, ParamType::Vector3) {
                    Some(ParamValue::Vec3(v)) => v,
                    _ => Vec3::ZERO,
                },
            ),
            SceneVariableType::Vector2 => SceneVariableValue::Vector2(
                match self.parse_typed_value(element, name, ParamType::Vector2) {
                    Some(ParamValue::Vec2(v)) => v,
                    _ => Vec2::ZERO,
                },
            ),
            SceneVariableType::Single => SceneVariableValue::Single(
                match self.parse_typed_value(element, name, ParamType::Float) {
                    Some(ParamValue::Float(f)) => f,
                    _ => 0.0,
                },
            ),
            SceneVariableType::Integer => SceneVariableValue::Integer(
                match self.parse_typed_value(element, name, ParamType::Int) {
                    Some(ParamValue::Int(i)) => i,
                    _ => 0,
                },
            ),
            SceneVariableType::Boolean => SceneVariableValue::Boolean(
                matches!(self.parse_typed_value(element, name, ParamType::Bool), Some(ParamValue::Bool(true))),
            ),
            SceneVariableType::Texture => {
                let texture = self.source(element, name).and_then(|source| {
                    let texture = resources.texture(source);
                    if texture.is_none() {
                        engine_warn!(self.logger, LOG_SOURCE, "Variable '{}': texture '{}' not found", name, source);
                    }
                    texture
                });
                SceneVariableValue::Texture(texture)
            }
            SceneVariableType::Effect => {
                let effect = self.source(element, name).and_then(|source| {
                    let effect = resources.effect(source);
                    if effect.is_none() {
                        engine_warn!(self.logger, LOG_SOURCE, "Variable '{}': effect '{}' not found", name, source);
                    }
                    effect
                });
                SceneVariableValue::Effect(effect)
            }
            SceneVariableType::GaussBlurFilter => {
                let amount = self.parse_value(element, name, "BlurAmount", |t| t.parse::<f32>().ok())
                    .unwrap_or(1.0);
                let amount = if amount > 0.0 {
                    amount
                } else {
                    engine_warn!(self.logger, LOG_SOURCE,
                        "Variable '{}': BlurAmount must be positive, using 1", name);
                    1.0
                };
                SceneVariableValue::GaussBlurFilter(GaussBlurFilter::new(amount))
            }
        };

        Some(SceneVariable::new(name, value))
    }

    /// Pixel size from `Width`/`Height` or viewport percentages
    /// `WidthP`/`HeightP`. Missing dimensions default to the viewport.
    fn parse_size(&self, element: &ScriptElement, name: &str) -> (u32, u32) {
        let resolve = |pixels: &str, percent: &str, viewport: u32| -> u32 {
            if let Some(value) = self.parse_value(element, name, pixels, |t| t.parse::<u32>().ok()) {
                return value.max(1);
            }
            if let Some(value) = self.parse_value(element, name, percent, |t| t.parse::<f32>().ok()) {
                return ((viewport as f32 * value / 100.0).round() as u32).max(1);
            }
            viewport.max(1)
        };
        (
            resolve("Width", "WidthP", self.context.viewport_width),
            resolve("Height", "HeightP", self.context.viewport_height),
        )
    }

    /// Read a child element (or attribute) and parse it, warning when the
    /// text is present but malformed.
    fn parse_value<T>(
        &self,
        element: &ScriptElement,
        name: &str,
        field: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Option<T> {
        let text = field_text(element, field)?;
        let value = parse(text);
        if value.is_none() {
            engine_warn!(self.logger, LOG_SOURCE,
                "Variable '{}': malformed <{}> '{}' ignored", name, field, text);
        }
        value
    }

    fn parse_enum<T>(
        &self,
        element: &ScriptElement,
        name: &str,
        field: &str,
        parse: fn(&str) -> Option<T>,
    ) -> Option<T> {
        self.parse_value(element, name, field, parse)
    }

    fn parse_typed_value(&self, element: &ScriptElement, name: &str, ty: ParamType) -> Option<ParamValue> {
        self.parse_value(element, name, "Value", |t| parse_immediate(t, ty))
    }

    fn source<'e>(&self, element: &'e ScriptElement, name: &str) -> Option<&'e str> {
        let source = field_text(element, "Source").filter(|s| !s.is_empty());
        if source.is_none() {
            engine_warn!(self.logger, LOG_SOURCE, "Variable '{}': missing <Source>", name);
        }
        source
    }

    // ===== PASSES =====

    fn parse_pass(&self, element: &ScriptElement, variables: &[SceneVariable]) -> Galaxy3dResult<ScenePass> {
        let name = element.attribute("Name").unwrap_or_default().to_string();
        let selector_id = self.parse_int_attribute(element, &name, "SelectorID", -1);
        let camera_id = self.parse_int_attribute(element, &name, "CameraID", 0);
        let camera_id = usize::try_from(camera_id).unwrap_or_else(|_| {
            engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': negative CameraID, using 0", name);
            0
        });

        let mut instructions = Vec::new();
        self.parse_block(&element.children, &name, selector_id, variables, &mut instructions)?;

        Ok(ScenePass::new(name, selector_id, camera_id, instructions, self.logger.clone()))
    }

    fn parse_int_attribute(&self, element: &ScriptElement, pass: &str, attribute: &str, default: i32) -> i32 {
        match element.attribute(attribute) {
            None => default,
            Some(text) => text.parse().unwrap_or_else(|_| {
                engine_warn!(self.logger, LOG_SOURCE,
                    "Pass '{}': malformed {} '{}', using {}", pass, attribute, text, default);
                default
            }),
        }
    }

    fn parse_block(
        &self,
        elements: &[ScriptElement],
        pass: &str,
        selector_id: i32,
        variables: &[SceneVariable],
        out: &mut Vec<SceneInstruction>,
    ) -> Galaxy3dResult<()> {
        for element in elements {
            if element.is("If") {
                let Some(expression) = element.attribute("E") else {
                    engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': <If> without E skipped", pass);
                    continue;
                };
                self.compiler.compile(expression, variables, out)?;
                let jump = out.len();
                out.push(SceneInstruction::Jz { target: 0 });
                self.parse_block(&element.children, pass, selector_id, variables, out)?;
                out[jump] = SceneInstruction::Jz { target: out.len() };
            } else if element.is("E") {
                self.parse_store(element, pass, variables, out)?;
            } else if element.is("C") {
                if let Some(instruction) = self.parse_command(element, pass, selector_id, variables) {
                    out.push(instruction);
                }
            } else {
                engine_warn!(self.logger, LOG_SOURCE,
                    "Pass '{}': unknown element <{}> skipped", pass, element.name);
            }
        }
        Ok(())
    }

    /// `<E S="expr" Ret="var"/>`: evaluate and store into a boolean variable.
    fn parse_store(
        &self,
        element: &ScriptElement,
        pass: &str,
        variables: &[SceneVariable],
        out: &mut Vec<SceneInstruction>,
    ) -> Galaxy3dResult<()> {
        let Some(expression) = element.attribute("S") else {
            engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': <E> without S skipped", pass);
            return Ok(());
        };
        let Some(variable) = self.boolean_variable(element.attribute("Ret"), pass, variables) else {
            return Ok(());
        };
        self.compiler.compile(expression, variables, out)?;
        out.push(SceneInstruction::Pop { variable });
        Ok(())
    }

    fn parse_command(
        &self,
        element: &ScriptElement,
        pass: &str,
        selector_id: i32,
        variables: &[SceneVariable],
    ) -> Option<SceneInstruction> {
        let command = element.attribute("S").unwrap_or_default().to_ascii_lowercase();
        let arg = |attribute: &str, ty: ParamType, default: ParamValue| {
            self.parse_arg(element.attribute(attribute), ty, default, pass, variables)
        };

        let instruction = match command.as_str() {
            "clear" => SceneInstruction::Clear(ClearArgs {
                clear_color: arg("ClearColor", ParamType::Bool, ParamValue::Bool(false)),
                clear_depth: arg("ClearDepth", ParamType::Bool, ParamValue::Bool(false)),
                clear_stencil: arg("ClearStencil", ParamType::Bool, ParamValue::Bool(false)),
                depth: arg("Depth", ParamType::Float, ParamValue::Float(1.0)),
                stencil: arg("Stencil", ParamType::Int, ParamValue::Int(0)),
                color: arg("Color", ParamType::Vector4, ParamValue::Vec4(Vec4::ZERO)),
            }),
            "usert" => SceneInstruction::UseRT {
                index: arg("Index", ParamType::Int, ParamValue::Int(0)),
                target: self.parse_handle_arg(element.attribute("RT"), SceneVariableType::RenderTarget, pass, variables),
            },
            "useds" => SceneInstruction::UseDS {
                target: self.parse_handle_arg(element.attribute("DS"), SceneVariableType::DepthStencil, pass, variables),
            },
            "render" => SceneInstruction::Render,
            "renderquad" => {
                let effect = self.parse_handle_arg(element.attribute("Effect"), SceneVariableType::Effect, pass, variables);
                let Some(effect_index) = effect.variable_index() else {
                    engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': renderquad without an effect skipped", pass);
                    return None;
                };
                SceneInstruction::RenderQuad {
                    scale: arg("Scale", ParamType::Vector2, ParamValue::Vec2(Vec2::ONE)),
                    params: self.parse_quad_params(element, pass, &variables[effect_index], variables),
                    effect,
                }
            }
            "visibleto" => {
                let result = self.boolean_variable(element.attribute("Ret"), pass, variables)?;
                SceneInstruction::VisibleTo {
                    selector: arg("SelectorID", ParamType::Int, ParamValue::Int(selector_id)),
                    result,
                }
            }
            _ => {
                engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': unknown command '{}' skipped", pass, command);
                return None;
            }
        };
        Some(instruction)
    }

    fn parse_quad_params(
        &self,
        element: &ScriptElement,
        pass: &str,
        effect: &SceneVariable,
        variables: &[SceneVariable],
    ) -> Vec<QuadParam> {
        let mut params = Vec::new();

        for child in &element.children {
            if !child.is("Param") {
                engine_warn!(self.logger, LOG_SOURCE,
                    "Pass '{}': unknown renderquad child <{}> skipped", pass, child.name);
                continue;
            }
            let Some(name) = child.attribute("Name").filter(|n| !n.is_empty()) else {
                engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': <Param> without Name skipped", pass);
                continue;
            };
            let type_name = child.attribute("Type").unwrap_or_default();
            let Some(ty) = ParamType::parse(type_name) else {
                engine_warn!(self.logger, LOG_SOURCE,
                    "Pass '{}': parameter '{}' has unknown type '{}'", pass, name, type_name);
                continue;
            };
            if let Some(effect) = effect.effect() {
                if !effect.has_parameter(name) {
                    engine_warn!(self.logger, LOG_SOURCE,
                        "Pass '{}': effect '{}' has no parameter '{}'", pass, effect.name(), name);
                    continue;
                }
            }
            let Some(text) = child.attribute("Value") else {
                engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': parameter '{}' has no Value", pass, name);
                continue;
            };

            let value = match parse_reference(text) {
                Some(_) => self.parse_arg(Some(text), ty, ParamValue::Bool(false), pass, variables),
                None => match parse_immediate(text, ty) {
                    Some(value) => SceneOpArg::Immediate(value),
                    None => {
                        engine_warn!(self.logger, LOG_SOURCE,
                            "Pass '{}': parameter '{}' has malformed value '{}'", pass, name, text);
                        continue;
                    }
                },
            };
            params.push(QuadParam { name: name.to_string(), ty, value });
        }

        params
    }

    // ===== OPERANDS =====

    /// Operand from an attribute: a variable reference or an immediate of
    /// type `ty`, falling back to `default` when absent or unusable.
    fn parse_arg(
        &self,
        text: Option<&str>,
        ty: ParamType,
        default: ParamValue,
        pass: &str,
        variables: &[SceneVariable],
    ) -> SceneOpArg {
        let Some(text) = text else {
            return SceneOpArg::Immediate(default);
        };

        if let Some((name, property)) = parse_reference(text) {
            return match variables.iter().position(|v| v.name() == name) {
                Some(index) => SceneOpArg::Variable {
                    index,
                    property: property.map(str::to_string),
                },
                None => {
                    engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': unknown variable '{}'", pass, name);
                    SceneOpArg::Immediate(default)
                }
            };
        }

        match parse_immediate(text, ty) {
            Some(value) => SceneOpArg::Immediate(value),
            None => {
                engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': malformed value '{}'", pass, text);
                SceneOpArg::Immediate(default)
            }
        }
    }

    /// Operand naming a resource variable. Anything but a reference to a
    /// variable of type `expected` is an immediate (unbind).
    fn parse_handle_arg(
        &self,
        text: Option<&str>,
        expected: SceneVariableType,
        pass: &str,
        variables: &[SceneVariable],
    ) -> SceneOpArg {
        let unbind = SceneOpArg::Immediate(ParamValue::Bool(false));
        let Some((name, _)) = text.and_then(parse_reference) else {
            return unbind;
        };

        match variables.iter().position(|v| v.name() == name) {
            Some(index) if variables[index].variable_type() == expected => SceneOpArg::Variable { index, property: None },
            Some(index) => {
                engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': variable '{}' is a {:?}, expected {:?}",
                    pass, name, variables[index].variable_type(), expected);
                unbind
            }
            None => {
                engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': unknown variable '{}'", pass, name);
                unbind
            }
        }
    }

    fn boolean_variable(&self, text: Option<&str>, pass: &str, variables: &[SceneVariable]) -> Option<usize> {
        let Some(text) = text else {
            engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': missing Ret variable, element skipped", pass);
            return None;
        };
        let name = parse_reference(text).map_or(text, |(name, _)| name);

        match variables.iter().position(|v| v.name() == name) {
            Some(index) if variables[index].variable_type() == SceneVariableType::Boolean => Some(index),
            Some(_) => {
                engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': Ret variable '{}' is not a Boolean", pass, name);
                None
            }
            None => {
                engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': unknown Ret variable '{}'", pass, name);
                None
            }
        }
    }
}

/// Split `[name]` / `[name.Property]`
fn parse_reference(text: &str) -> Option<(&str, Option<&str>)> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?.trim();
    match inner.split_once('.') {
        Some((name, property)) => Some((name.trim(), Some(property.trim()))),
        None => Some((inner, None)),
    }
}

/// Text of a `<field>` child, or of a `field` attribute
fn field_text<'e>(element: &'e ScriptElement, field: &str) -> Option<&'e str> {
    element.child_text(field).or_else(|| element.attribute(field))
}

#[cfg(test)]
#[path = "script_parser_tests.rs"]
mod tests;
