//! HTTP-specific error types and conversions.

use certgate_core::error::CertgateError;

/// HTTP-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid backend URL: {0}")]
    Url(String),

    #[error("Invalid root certificate: {0}")]
    RootCertificate(String),

    #[error("Backend answered {status}: {message}")]
    Status { status: u16, message: String },
}

impl From<HttpError> for CertgateError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Url(_) | HttpError::RootCertificate(_) => {
                CertgateError::Config(err.to_string())
            }
            other => CertgateError::Download(other.to_string()),
        }
    }
}
