/// SceneRenderer renders the scene with the first usable procedure.
///
/// Procedures form a fallback chain: the first one whose resources all
/// resolved is selected each frame. The batch is reset whenever the
/// selection changes, since another procedure batches other materials.

use std::sync::Arc;
use crate::batch::BatchData;
use crate::camera::Camera;
use crate::error::Galaxy3dResult;
use crate::log::Logger;
use crate::renderer::RenderDevice;
use crate::scene::SceneManager;
use crate::{engine_info, engine_warn};
use super::scene_pass::PassContext;
use super::scene_procedure::SceneProcedure;

const LOG_SOURCE: &str = "galaxy3d::SceneRenderer";

pub struct SceneRenderer {
    procedures: Vec<SceneProcedure>,
    selected: Option<usize>,
    /// Whether a selection was made at least once
    has_selected: bool,
    camera_override: Option<usize>,
    logger: Arc<dyn Logger>,
}

impl SceneRenderer {
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            procedures: Vec::new(),
            selected: None,
            has_selected: false,
            camera_override: None,
            logger,
        }
    }

    /// Append a procedure to the fallback chain. Returns its index.
    pub fn add_procedure(&mut self, procedure: SceneProcedure) -> usize {
        self.procedures.push(procedure);
        self.procedures.len() - 1
    }

    pub fn procedures(&self) -> &[SceneProcedure] {
        &self.procedures
    }

    pub fn procedure_mut(&mut self, index: usize) -> Option<&mut SceneProcedure> {
        self.procedures.get_mut(index)
    }

    /// Camera index used by every pass instead of its own `CameraID`
    pub fn set_camera_override(&mut self, camera: Option<usize>) {
        self.camera_override = camera;
    }

    pub fn camera_override(&self) -> Option<usize> {
        self.camera_override
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_procedure(&self) -> Option<&SceneProcedure> {
        self.selected.and_then(|i| self.procedures.get(i))
    }

    /// Select the first available procedure, resetting `batch` on change.
    pub fn select_procedure(&mut self, batch: &mut BatchData) -> Option<usize> {
        let choice = self.procedures.iter().position(SceneProcedure::is_available);

        if !self.has_selected || choice != self.selected {
            batch.reset();
            match choice {
                Some(index) => engine_info!(self.logger, LOG_SOURCE,
                    "Procedure '{}' selected", self.procedures[index].name()),
                None => engine_warn!(self.logger, LOG_SOURCE,
                    "No available procedure among {}, nothing will be rendered", self.procedures.len()),
            }
            self.selected = choice;
            self.has_selected = true;
        }

        choice
    }

    /// Render one frame with the selected procedure.
    pub fn render_scene(
        &mut self,
        cameras: &[Camera],
        scene: &mut dyn SceneManager,
        batch: &mut BatchData,
        device: &mut dyn RenderDevice,
    ) -> Galaxy3dResult<()> {
        let Some(index) = self.select_procedure(batch) else {
            return Ok(());
        };

        let mut context = PassContext {
            cameras,
            camera_override: self.camera_override,
            scene,
            batch,
            device,
        };
        self.procedures[index].render(&mut context)
    }
}

#[cfg(test)]
#[path = "scene_renderer_tests.rs"]
mod tests;
