//! Engine error types.

use thiserror::Error;

/// Contract violations by the integrating code.
///
/// Invalid state references and unmatched inputs are not errors: they are
/// reported through the fallback. These variants cover the cases where the
/// engine cannot even do that.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("engine not initialized: call reset before step or state")]
    NotInitialized,

    #[error("no fallback installed to handle: {reason}")]
    FallbackUnset { reason: String },
}

impl EngineError {
    /// Returns a stable error code for this variant.
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::NotInitialized => "NOT_INITIALIZED",
            EngineError::FallbackUnset { .. } => "FALLBACK_UNSET",
        }
    }
}
