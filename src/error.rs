//! Error types for media-dl
//!
//! This module provides the error taxonomy shared by every component:
//! - Fetcher errors (binary lookup, spawn, metadata parsing, non-zero exit)
//! - Artifact validation errors raised by the pipeline
//! - Catalog errors raised by the store's write protocol
//!
//! Every error also carries a user-facing message (see [`Error::user_message`])
//! which is the exact text relayed in `error`-stage progress events.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// The fetcher executable does not exist at the resolved path
    #[error("fetcher binary not found at {}", path.display())]
    BinaryNotFound {
        /// Path that was tried when spawning
        path: PathBuf,
    },

    /// The fetcher executable exists but could not be started
    #[error("failed to spawn {}: {source}", binary.display())]
    ProcessSpawn {
        /// Binary that failed to start
        binary: PathBuf,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// Metadata output was not a valid JSON document
    #[error("failed to parse media info: {0}")]
    MetadataParse(String),

    /// The fetcher exited with a non-zero status
    #[error("{message}")]
    FetchFailed {
        /// Exit code (None when killed by a signal)
        exit_code: Option<i32>,
        /// Classified or fallback message
        message: String,
    },

    /// The produced media file failed post-fetch validation
    #[error("invalid artifact at {}: {reason}", path.display())]
    ArtifactInvalid {
        /// Path of the expected artifact
        path: PathBuf,
        /// Why validation failed
        reason: ArtifactProblem,
    },

    /// Catalog-level error (verification or write failure)
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Rejected request input (e.g., empty URL)
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons an artifact is rejected by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArtifactProblem {
    /// No file at the expected path
    #[error("file is missing")]
    Missing,

    /// The file exists but is empty
    #[error("file is empty")]
    Empty,

    /// The file is smaller than the minimum plausible size for its kind
    #[error("file is {size} bytes, expected at least {minimum} bytes")]
    TooSmall {
        /// Actual size in bytes
        size: u64,
        /// Minimum accepted size in bytes
        minimum: u64,
    },
}

/// Catalog store errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A freshly written catalog failed re-read verification
    #[error("catalog verification failed: {0}")]
    Corrupt(String),

    /// The write protocol failed (after attempting to restore from backup)
    #[error("catalog write failed: {cause}")]
    WriteFailed {
        /// Description of the failing step
        cause: String,
    },
}

impl Error {
    /// Message shown to the user for this error
    ///
    /// Fetch failures already carry a classified message; everything else uses
    /// the display text. The pipeline puts exactly this string into the
    /// `error` field of its final progress event.
    pub fn user_message(&self) -> String {
        match self {
            Error::FetchFailed { message, .. } => message.clone(),
            Error::ArtifactInvalid { reason, .. } => {
                format!("Downloaded file is invalid: {}", reason)
            }
            other => other.to_string(),
        }
    }

    /// Whether this error came from the external fetcher process
    pub fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Error::BinaryNotFound { .. }
                | Error::ProcessSpawn { .. }
                | Error::MetadataParse(_)
                | Error::FetchFailed { .. }
        )
    }

    /// Machine-readable error code for transport responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::BinaryNotFound { .. } => "binary_not_found",
            Error::ProcessSpawn { .. } => "process_spawn_failed",
            Error::MetadataParse(_) => "metadata_parse_error",
            Error::FetchFailed { .. } => "fetch_failed",
            Error::ArtifactInvalid { .. } => "artifact_invalid",
            Error::Catalog(CatalogError::Corrupt(_)) => "catalog_corrupt",
            Error::Catalog(CatalogError::WriteFailed { .. }) => "catalog_write_failed",
            Error::InvalidUrl(_) => "invalid_url",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
        }
    }
}

/// Error response format for request dispatch
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "fetch_failed",
///     "message": "Age-restricted video, cannot download",
///     "details": {
///       "exit_code": 1
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for dispatch responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (see [`Error::error_code`])
    pub code: String,

    /// Human-readable message, identical to the `error` field of the
    /// matching `error`-stage progress event
    pub message: String,

    /// Optional additional context (exit code, artifact path)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let details = match &error {
            Error::FetchFailed { exit_code, .. } => Some(serde_json::json!({
                "exit_code": exit_code,
            })),
            Error::ArtifactInvalid { path, reason } => Some(serde_json::json!({
                "path": path,
                "reason": reason.to_string(),
            })),
            Error::BinaryNotFound { path } => Some(serde_json::json!({
                "path": path,
            })),
            _ => None,
        };

        Self {
            error: ErrorDetail {
                code: error.error_code().to_string(),
                message: error.user_message(),
                details,
            },
        }
    }
}
