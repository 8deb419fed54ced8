//! Error types for zr-export

use crate::types::{ExportKind, FormatKind};
use std::path::PathBuf;
use thiserror::Error;

/// Failure while turning a payload into a file body
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The generator cannot handle this payload kind
    #[error("{format} generation is not supported for {kind}")]
    Unsupported { kind: ExportKind, format: FormatKind },

    /// Serialization error (non-finite numbers, writer failures)
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// The render target failed to produce an image
    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    /// Image export requested without a render target
    #[error("No render target supplied for image capture")]
    MissingRenderTarget,

    /// Cancelled or timed out before completion
    #[error("Generation cancelled")]
    Cancelled,
}

impl From<serde_json::Error> for GenerationError {
    fn from(err: serde_json::Error) -> Self {
        GenerationError::SerializationFailed(err.to_string())
    }
}

impl From<csv::Error> for GenerationError {
    fn from(err: csv::Error) -> Self {
        GenerationError::SerializationFailed(err.to_string())
    }
}

/// Failure in the artifact store
#[derive(Debug, Error)]
pub enum StoreError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact not found
    #[error("Artifact not found: {0}")]
    NotFound(PathBuf),

    /// Path does not belong to the store root
    #[error("Path is outside the export directory: {0}")]
    OutsideRoot(PathBuf),

    /// Base name rejected
    #[error("Invalid artifact name: {0}")]
    InvalidName(String),

    /// Cancelled before the artifact became visible
    #[error("Write cancelled")]
    Cancelled,
}

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Main error type for export requests
#[derive(Debug, Error)]
pub enum ExportError {
    /// Requested format is not valid for the payload kind
    #[error("Export of {kind} as {format} is not supported")]
    UnsupportedCombination { kind: ExportKind, format: FormatKind },

    /// Payload could not be converted
    #[error("Generation failed: {0}")]
    GenerationFailed(#[source] GenerationError),

    /// Artifact could not be persisted
    #[error("Storage failed: {0}")]
    StorageFailed(#[source] StoreError),

    /// Some stale artifacts survived cap enforcement
    #[error("Eviction removed {removed} artifact(s) but {remaining} remain above cap {cap}")]
    EvictionPartialFailure {
        removed: usize,
        remaining: usize,
        cap: usize,
    },

    /// Cancelled or timed out; nothing was written
    #[error("Export cancelled")]
    Cancelled,
}

impl From<GenerationError> for ExportError {
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Cancelled => ExportError::Cancelled,
            GenerationError::Unsupported { kind, format } => {
                ExportError::UnsupportedCombination { kind, format }
            }
            other => ExportError::GenerationFailed(other),
        }
    }
}

impl From<StoreError> for ExportError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cancelled => ExportError::Cancelled,
            other => ExportError::StorageFailed(other),
        }
    }
}

/// User-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Unsupported,
    Generation,
    Storage,
    Cancelled,
}

impl ErrorCategory {
    /// Translation key for the message shown to the user
    pub fn message_key(&self) -> &'static str {
        match self {
            ErrorCategory::Unsupported => "export.not_supported",
            ErrorCategory::Generation | ErrorCategory::Storage => "export.export_failed",
            ErrorCategory::Cancelled => "export.export_cancelled",
        }
    }
}

impl ExportError {
    /// Get the user-facing category
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExportError::UnsupportedCombination { .. } => ErrorCategory::Unsupported,
            ExportError::GenerationFailed(_) => ErrorCategory::Generation,
            ExportError::StorageFailed(_) | ExportError::EvictionPartialFailure { .. } => {
                ErrorCategory::Storage
            }
            ExportError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Whether re-invoking with the same inputs can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExportError::GenerationFailed(_) | ExportError::Cancelled)
    }

    /// Whether the caller should offer a retry action
    pub fn offers_retry(&self) -> bool {
        matches!(
            self,
            ExportError::GenerationFailed(_) | ExportError::StorageFailed(_) | ExportError::Cancelled
        )
    }
}

/// Result type alias for export requests
pub type Result<T> = std::result::Result<T, ExportError>;
