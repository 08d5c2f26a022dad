/*!
# Galaxy 3D Scene

Scene graph and visibility layer of the Galaxy 3D engine.

The crate decides what gets drawn and in which order; the GPU work itself
goes through collaborator traits implemented by a rendering backend.

## Architecture

- **OctreeSceneManager**: octree of static objects, plus a far-object
  list for objects outside the world box and a dynamic-object list
- **BatchData**: groups visible render operations by priority, material and
  geometry, with pooled containers from a `BatchDataBufferCache`
- **ScenePass**: executes a small scene-instruction program (clears,
  target binds, batch submission, full-screen quads)
- **SceneRenderScriptParser / ExpressionCompiler**: build scene procedures
  from script trees, compiling boolean conditions to instructions
- **SceneRenderer**: selects the first usable `SceneProcedure` each frame

Per frame: `SceneManager::prepare_visible_objects` fills the batch, then
`SceneRenderer::render_scene` runs the selected procedure's passes, which
submit the batch through `RenderDevice`.
*/

// Internal modules
mod error;
pub mod log;
pub mod math;
pub mod camera;
pub mod renderer;
pub mod scene;
pub mod batch;
pub mod script;
pub mod procedure;

// Main galaxy3d namespace module
pub mod galaxy3d {
    // Error types
    pub use crate::error::{Galaxy3dError, Galaxy3dResult};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, NullLogger};
    }

    pub mod math {
        pub use crate::math::*;
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    // Render sub-module with the collaborator interfaces
    pub mod render {
        pub use crate::renderer::*;
    }

    pub mod scene {
        pub use crate::scene::*;
    }

    pub mod batch {
        pub use crate::batch::*;
    }

    pub mod script {
        pub use crate::script::*;
    }

    pub mod procedure {
        pub use crate::procedure::*;
    }
}

// Re-export math library at crate root
pub use glam;
