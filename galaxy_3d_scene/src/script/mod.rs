//! Scene render scripts
//!
//! Script trees, scene variables, the instruction set, the boolean
//! expression compiler and the parser turning a `<Scene>` tree into a
//! `SceneProcedure`.

mod script_element;
mod gauss_blur_filter;
mod scene_variable;
mod scene_instruction;
mod expression_compiler;
mod script_parser;

pub use script_element::ScriptElement;
pub use gauss_blur_filter::{GaussBlurFilter, GAUSS_BLUR_SAMPLE_COUNT};
pub use scene_variable::{SceneVariable, SceneVariableType, SceneVariableValue, SCENE_VARIABLE_WORDS};
pub use scene_instruction::{
    coerce, param_words, parse_bool, parse_immediate,
    ClearArgs, ParamType, QuadParam, SceneInstruction, SceneOpArg, StackValue,
};
pub use expression_compiler::{ExpressionCompiler, ExpressionNode};
pub use script_parser::{SceneRenderScriptParser, ScriptLoadContext};
