/// SceneProcedure: an ordered list of scene passes sharing a set of
/// declared variables.

use std::sync::Arc;
use crate::error::Galaxy3dResult;
use crate::log::Logger;
use crate::script::{SceneVariable, SceneVariableType};
use crate::engine_debug;
use super::scene_pass::{PassContext, ScenePass};

const LOG_SOURCE: &str = "galaxy3d::SceneProcedure";

pub struct SceneProcedure {
    name: String,
    variables: Vec<SceneVariable>,
    passes: Vec<ScenePass>,
    /// Camera index the batch was last filled for, during the current frame
    last_camera: Option<usize>,
    logger: Arc<dyn Logger>,
}

impl SceneProcedure {
    pub fn new(
        name: impl Into<String>,
        variables: Vec<SceneVariable>,
        passes: Vec<ScenePass>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            name: name.into(),
            variables,
            passes,
            last_camera: None,
            logger,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[SceneVariable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&SceneVariable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    /// Mutable access, for hosts feeding values (matrices, flags) between frames
    pub fn variable_mut(&mut self, name: &str) -> Option<&mut SceneVariable> {
        self.variables.iter_mut().find(|v| v.name() == name)
    }

    pub fn passes(&self) -> &[ScenePass] {
        &self.passes
    }

    pub fn last_camera(&self) -> Option<usize> {
        self.last_camera
    }

    /// Whether every effect, render target and depth-stencil variable holds
    /// its handle.
    pub fn is_available(&self) -> bool {
        self.variables.iter()
            .filter(|v| matches!(
                v.variable_type(),
                SceneVariableType::Effect | SceneVariableType::RenderTarget | SceneVariableType::DepthStencil
            ))
            .all(SceneVariable::is_resolved)
    }

    /// Run every pass in order.
    ///
    /// The first pass always fills the batch; later passes refill it only
    /// when they select another camera.
    pub fn render(&mut self, context: &mut PassContext<'_>) -> Galaxy3dResult<()> {
        engine_debug!(self.logger, LOG_SOURCE,
            "Procedure '{}': rendering {} passes", self.name, self.passes.len());

        self.last_camera = None;
        for pass in &self.passes {
            pass.invoke(context, &mut self.variables, &mut self.last_camera)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "scene_procedure_tests.rs"]
mod tests;
