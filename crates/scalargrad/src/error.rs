//! Error types for scalargrad.

use thiserror::Error;

/// Errors that can occur while building or consuming a computation graph.
///
/// Floating-point domain conditions (overflow, division by zero) are not
/// errors: they surface as IEEE special values in the node payloads.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// An operation received an argument outside its contract.
    #[error("invalid argument to {op}: {message}")]
    InvalidArgument { op: &'static str, message: String },

    /// Two sequences that must pair up element-wise differ in length.
    #[error("length mismatch: expected {expected} elements, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl EngineError {
    pub(crate) fn invalid_argument(op: &'static str, message: impl Into<String>) -> Self {
        EngineError::InvalidArgument {
            op,
            message: message.into(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
