//! Scene procedures
//!
//! A `SceneRenderer` holds a fallback chain of `SceneProcedure`s. Each
//! procedure runs its `ScenePass`es in order; a pass is a small program
//! of scene instructions.

mod scene_pass;
mod scene_procedure;
mod scene_renderer;

pub use scene_pass::{PassContext, ScenePass, OPERAND_STACK_SIZE};
pub use scene_procedure::SceneProcedure;
pub use scene_renderer::SceneRenderer;
