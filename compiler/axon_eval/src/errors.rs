//! Typed evaluation errors raised by the interpreter core.
//!
//! Errors surface to the caller without being caught inside the core;
//! messages name the expected and the actual kind.

use thiserror::Error;

/// Result of an interpretation step.
pub type EvalResult<T> = Result<T, EvalError>;

/// Error raised by interpreter contexts, the host binding layer, and the
/// lowering passes.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A value had the wrong kind for the requested operation.
    #[error("type error: expected {expected}, got {actual}")]
    Type { expected: String, actual: String },

    /// Unknown attribute on a foreign value.
    #[error("attribute error: `{type_name}` has no attribute `{attribute}`")]
    Attribute {
        type_name: String,
        attribute: String,
    },

    /// Out-of-range access on a list-like value.
    #[error("index error: index {index} is out of range for length {len}")]
    Index { index: i64, len: usize },

    /// Structural violation detected during lowering. The ANF input is
    /// expected to come from a trusted builder or an already-validated
    /// JSON parse, so this is a programmer error rather than a
    /// recoverable condition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl EvalError {
    #[cold]
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        EvalError::Type {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    #[cold]
    pub fn attribute(type_name: impl Into<String>, attribute: impl Into<String>) -> Self {
        EvalError::Attribute {
            type_name: type_name.into(),
            attribute: attribute.into(),
        }
    }

    #[cold]
    pub fn index(index: i64, len: usize) -> Self {
        EvalError::Index { index, len }
    }

    #[cold]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        EvalError::InvalidArgument(message.into())
    }
}
