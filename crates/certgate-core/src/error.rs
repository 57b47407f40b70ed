//! Error types for certgate.

use thiserror::Error;

use crate::models::validation::ValidationErrors;

#[derive(Debug, Error)]
pub enum CertgateError {
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    #[error("Invalid form operation: {reason}")]
    Form { reason: String },

    #[error("Certificate generation failed: {0}")]
    Generation(String),

    #[error("Certificate retrieval failed: {0}")]
    Retrieval(String),

    #[error("No certificate available to download.")]
    NothingToDownload,

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Failed to save {path}: {reason}")]
    Save { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type CertgateResult<T> = Result<T, CertgateError>;
