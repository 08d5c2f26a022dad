/// One stage of a scene procedure.
///
/// A pass picks its camera, refreshes the batch when the camera differs
/// from the one the procedure used last, then runs its instruction array
/// on a small operand stack machine.

use std::sync::Arc;
use glam::{Mat4, Vec2, Vec3, Vec4};
use crate::batch::{selection_mask, BatchData};
use crate::camera::Camera;
use crate::error::Galaxy3dResult;
use crate::log::Logger;
use crate::renderer::{
    ClearFlags, GeometryData, Material, MaterialDesc, ParamValue, RenderDevice, RenderOperation,
};
use crate::scene::SceneManager;
use crate::script::{coerce, ClearArgs, ParamType, QuadParam, SceneInstruction, SceneOpArg, SceneVariable, StackValue};
use crate::{engine_trace, engine_warn};

const LOG_SOURCE: &str = "galaxy3d::ScenePass";

/// Operand stack depth
pub const OPERAND_STACK_SIZE: usize = 32;

/// Collaborators a pass renders with
pub struct PassContext<'a> {
    pub cameras: &'a [Camera],
    /// Renderer-wide camera index, replacing each pass's own
    pub camera_override: Option<usize>,
    pub scene: &'a mut dyn SceneManager,
    pub batch: &'a mut BatchData,
    pub device: &'a mut dyn RenderDevice,
}

struct OperandStack {
    values: [StackValue; OPERAND_STACK_SIZE],
    len: usize,
}

impl OperandStack {
    fn new() -> Self {
        Self {
            values: [[0; 2]; OPERAND_STACK_SIZE],
            len: 0,
        }
    }

    fn push(&mut self, value: StackValue) {
        assert!(self.len < OPERAND_STACK_SIZE, "operand stack overflow");
        self.values[self.len] = value;
        self.len += 1;
    }

    fn pop(&mut self) -> StackValue {
        assert!(self.len > 0, "operand stack underflow");
        self.len -= 1;
        self.values[self.len]
    }

    fn pop_bool(&mut self) -> bool {
        self.pop() != [0, 0]
    }

    fn push_bool(&mut self, value: bool) {
        self.push([value as u32, 0]);
    }
}

pub struct ScenePass {
    name: String,
    selector_id: i32,
    camera_id: usize,
    instructions: Vec<SceneInstruction>,
    /// Unit quad drawn by `RenderQuad`
    quad: Arc<GeometryData>,
    logger: Arc<dyn Logger>,
}

impl ScenePass {
    pub fn new(
        name: impl Into<String>,
        selector_id: i32,
        camera_id: usize,
        instructions: Vec<SceneInstruction>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            name: name.into(),
            selector_id,
            camera_id,
            instructions,
            quad: Arc::new(GeometryData::new(4, 2)),
            logger,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn selector_id(&self) -> i32 {
        self.selector_id
    }

    pub fn camera_id(&self) -> usize {
        self.camera_id
    }

    pub fn instructions(&self) -> &[SceneInstruction] {
        &self.instructions
    }

    /// Run the pass.
    ///
    /// `last_camera` is the camera index the owning procedure used last; the
    /// batch is only cleared and refilled when this pass selects another one.
    pub fn invoke(
        &self,
        context: &mut PassContext<'_>,
        variables: &mut [SceneVariable],
        last_camera: &mut Option<usize>,
    ) -> Galaxy3dResult<()> {
        let camera_index = context.camera_override.unwrap_or(self.camera_id);

        match context.cameras.get(camera_index) {
            Some(camera) => {
                if *last_camera != Some(camera_index) {
                    context.batch.clear();
                    context.scene.prepare_visible_objects(camera, context.batch);
                    *last_camera = Some(camera_index);
                }
            }
            None => {
                engine_warn!(self.logger, LOG_SOURCE,
                    "Pass '{}': camera {} not found ({} cameras), visibility not refreshed",
                    self.name, camera_index, context.cameras.len());
            }
        }

        self.execute(variables, context.batch, context.device)
    }

    /// Run the instruction array against the current batch contents.
    ///
    /// `And`, `Or` and `Not` treat each two-word stack value as one boolean,
    /// true when any bit is set, so wide values such as render target sizes
    /// combine by presence rather than bit by bit. Programs built by the
    /// expression compiler never exceed `OPERAND_STACK_SIZE`; a hand-built
    /// program that does panics.
    pub fn execute(
        &self,
        variables: &mut [SceneVariable],
        batch: &mut BatchData,
        device: &mut dyn RenderDevice,
    ) -> Galaxy3dResult<()> {
        engine_trace!(self.logger, LOG_SOURCE,
            "Pass '{}': executing {} instructions", self.name, self.instructions.len());

        let mut stack = OperandStack::new();
        let mut ip = 0;

        while let Some(instruction) = self.instructions.get(ip) {
            ip += 1;

            match instruction {
                SceneInstruction::Load(arg) => stack.push(arg.words(variables)),
                SceneInstruction::And => {
                    let right = stack.pop_bool();
                    let left = stack.pop_bool();
                    stack.push_bool(left && right);
                }
                SceneInstruction::Or => {
                    let right = stack.pop_bool();
                    let left = stack.pop_bool();
                    stack.push_bool(left || right);
                }
                SceneInstruction::Not => {
                    let value = stack.pop_bool();
                    stack.push_bool(!value);
                }
                SceneInstruction::Jz { target } => {
                    if !stack.pop_bool() {
                        ip = *target;
                    }
                }
                SceneInstruction::Jnz { target } => {
                    if stack.pop_bool() {
                        ip = *target;
                    }
                }
                SceneInstruction::Pop { variable } => {
                    let value = stack.pop_bool();
                    if let Some(variable) = variables.get_mut(*variable) {
                        variable.set_boolean(value);
                    }
                }
                SceneInstruction::Clear(args) => self.clear(args, variables, device)?,
                SceneInstruction::UseRT { index, target } => {
                    let index = resolve_int(index, variables, 0);
                    let Ok(index) = u32::try_from(index) else {
                        engine_warn!(self.logger, LOG_SOURCE,
                            "Pass '{}': negative render target index {}", self.name, index);
                        continue;
                    };
                    let target = target.variable_index()
                        .and_then(|i| variables.get(i))
                        .and_then(SceneVariable::render_target);
                    device.set_render_target(index, target)?;
                }
                SceneInstruction::UseDS { target } => {
                    let buffer = target.variable_index()
                        .and_then(|i| variables.get(i))
                        .and_then(SceneVariable::depth_stencil);
                    device.set_depth_stencil_buffer(buffer)?;
                }
                SceneInstruction::Render => batch.render_batch(device, self.selector_id)?,
                SceneInstruction::RenderQuad { scale, effect, params } => {
                    self.render_quad(scale, effect, params, variables, device)?;
                }
                SceneInstruction::VisibleTo { selector, result } => {
                    let selector = resolve_int(selector, variables, self.selector_id);
                    let visible = batch.has_visible_material(selector);
                    if let Some(variable) = variables.get_mut(*result) {
                        variable.set_boolean(visible);
                    }
                }
            }
        }

        Ok(())
    }

    fn clear(&self, args: &ClearArgs, variables: &[SceneVariable], device: &mut dyn RenderDevice) -> Galaxy3dResult<()> {
        let mut flags = ClearFlags::empty();
        flags.set(ClearFlags::TARGET, resolve_bool(&args.clear_color, variables));
        flags.set(ClearFlags::DEPTH, resolve_bool(&args.clear_depth, variables));
        flags.set(ClearFlags::STENCIL, resolve_bool(&args.clear_stencil, variables));

        let depth = match resolve(&args.depth, variables, ParamType::Float) {
            Some(ParamValue::Float(depth)) => depth,
            _ => 1.0,
        };
        let stencil = resolve_int(&args.stencil, variables, 0);
        let color = match resolve(&args.color, variables, ParamType::Vector4) {
            Some(ParamValue::Vec4(color)) => color,
            _ => Vec4::ZERO,
        };

        device.clear(flags, color, depth, stencil)
    }

    fn render_quad(
        &self,
        scale: &SceneOpArg,
        effect: &SceneOpArg,
        params: &[QuadParam],
        variables: &[SceneVariable],
        device: &mut dyn RenderDevice,
    ) -> Galaxy3dResult<()> {
        let Some(effect) = effect.variable_index()
            .and_then(|i| variables.get(i))
            .and_then(SceneVariable::effect)
        else {
            engine_warn!(self.logger, LOG_SOURCE, "Pass '{}': renderquad effect is not set", self.name);
            return Ok(());
        };

        let scale = match resolve(scale, variables, ParamType::Vector2) {
            Some(ParamValue::Vec2(scale)) => scale,
            _ => Vec2::ONE,
        };

        let mut bound = Vec::with_capacity(params.len());
        for param in params {
            match resolve(&param.value, variables, param.ty) {
                Some(value) => bound.push((param.name.clone(), value)),
                None => engine_warn!(self.logger, LOG_SOURCE,
                    "Pass '{}': parameter '{}' could not be resolved as {:?}", self.name, param.name, param.ty),
            }
        }

        let material = Arc::new(Material::new(MaterialDesc {
            name: format!("{}::quad", self.name),
            priority: 0,
            pass_flags: selection_mask(self.selector_id),
            effect: Some(effect.clone()),
            params: bound,
        }));

        let operation = RenderOperation::new(material.clone(), self.quad.clone())
            .with_final_transform(Mat4::from_scale(Vec3::new(scale.x, scale.y, 1.0)));

        device.render(&material, std::slice::from_ref(&operation), self.selector_id)
    }
}

fn resolve(arg: &SceneOpArg, variables: &[SceneVariable], ty: ParamType) -> Option<ParamValue> {
    arg.resolve(variables).and_then(|value| coerce(&value, ty))
}

fn resolve_bool(arg: &SceneOpArg, variables: &[SceneVariable]) -> bool {
    matches!(resolve(arg, variables, ParamType::Bool), Some(ParamValue::Bool(true)))
}

fn resolve_int(arg: &SceneOpArg, variables: &[SceneVariable], default: i32) -> i32 {
    match resolve(arg, variables, ParamType::Int) {
        Some(ParamValue::Int(value)) => value,
        _ => default,
    }
}

#[cfg(test)]
#[path = "scene_pass_tests.rs"]
mod tests;
