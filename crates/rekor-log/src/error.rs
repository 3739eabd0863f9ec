//! Error types for rekor-log

use rekor_merkle::ErrorKind;
use thiserror::Error;

/// Errors that can occur while checking Rekor responses
#[derive(Error, Debug)]
pub enum Error {
    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field is present but holds an unusable value
    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// Invalid checkpoint format
    #[error("Invalid checkpoint format: {0}")]
    InvalidCheckpoint(String),

    /// Checkpoint disagrees with the proof it accompanies
    #[error("Checkpoint mismatch: {0}")]
    CheckpointMismatch(String),

    /// Log state reported by the server is inconsistent with the claim
    #[error("Log state mismatch: {0}")]
    LogStateMismatch(String),

    /// Merkle proof error
    #[error("Merkle proof error: {0}")]
    Merkle(#[from] rekor_merkle::Error),
}

impl Error {
    /// Classify the error the same way `rekor-merkle` does
    ///
    /// Disagreements between values the server reported count as mismatches;
    /// anything that could not be parsed or is missing is structural.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Merkle(e) => e.kind(),
            Error::CheckpointMismatch(_) | Error::LogStateMismatch(_) => ErrorKind::Mismatch,
            Error::Json(_)
            | Error::MissingField(_)
            | Error::InvalidField { .. }
            | Error::InvalidCheckpoint(_) => ErrorKind::Structural,
        }
    }
}

/// Result type for rekor-log operations
pub type Result<T> = std::result::Result<T, Error>;
