// src/error.rs
use thiserror::Error;

/// Failures surfaced by the ingestion entry point.
#[derive(Error, Debug)]
pub enum IngestError {
    /// The raw event was not a JSON object.
    #[error("raw event must be a JSON object, got {found}")]
    TypeMismatch { found: &'static str },

    /// One or more required fields were missing, not strings, or empty.
    #[error("missing required fields: {}", .missing.join(", "))]
    Validation { missing: Vec<&'static str> },

    #[error(transparent)]
    Persist(anyhow::Error),

    #[error(transparent)]
    Enqueue(anyhow::Error),
}

impl IngestError {
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, IngestError::TypeMismatch { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, IngestError::Validation { .. })
    }

    /// Short label used for the `reason` metric label and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::TypeMismatch { .. } => "type_mismatch",
            IngestError::Validation { .. } => "validation",
            IngestError::Persist(_) => "persist",
            IngestError::Enqueue(_) => "enqueue",
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
