//! Error types for the Galaxy3D scene layer
//!
//! Content problems in scene scripts (unknown elements, bad declarations,
//! unresolved names) are never errors: they are logged and skipped.
//! The variants below cover the few hard failures left.

use thiserror::Error;

/// Result type for Galaxy3D scene operations
pub type Galaxy3dResult<T> = std::result::Result<T, Galaxy3dError>;

/// Galaxy3D scene errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Galaxy3dError {
    /// Malformed operator sequence in a script condition, or a condition
    /// too deep for the pass operand stack
    #[error("Expression syntax error in '{expression}': {message}")]
    ExpressionSyntax {
        /// Full expression text being compiled
        expression: String,
        /// What the operator-precedence parser choked on
        message: String,
    },

    /// Script tree does not describe a scene procedure
    #[error("Invalid script: {0}")]
    InvalidScript(String),

    /// Failure reported by a collaborator (device, object factory)
    #[error("Backend error: {0}")]
    BackendError(String),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
