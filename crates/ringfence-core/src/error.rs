//! Error types for the ringfence engine.

use thiserror::Error;

/// Result type alias using `EngineError`.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur during engine operation.
///
/// Nothing here is fatal to the enforcement loop: malformed records are
/// dropped one at a time, transport failures degrade a cycle to "no new
/// detections", and detector failures are caught at the detector boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A ledger record failed validation (bad timestamp or amount).
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The ledger feed or alert log is unreachable.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// A detector failed on this cycle's snapshot.
    #[error("Analysis failure: {0}")]
    Analysis(String),

    /// Configuration failed validation or could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Create a malformed-record error.
    #[must_use]
    pub fn malformed(msg: impl Into<String>) -> Self {
        EngineError::MalformedRecord(msg.into())
    }

    /// Create a transport error.
    #[must_use]
    pub fn transport(msg: impl Into<String>) -> Self {
        EngineError::Transport(msg.into())
    }

    /// Create an analysis error.
    #[must_use]
    pub fn analysis(msg: impl Into<String>) -> Self {
        EngineError::Analysis(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        EngineError::Config(msg.into())
    }

    /// Returns true if the enforcement loop can continue after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EngineError::MalformedRecord(_)
                | EngineError::Transport(_)
                | EngineError::Analysis(_)
        )
    }
}
