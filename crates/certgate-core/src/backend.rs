//! Trait definitions for everything the form logic talks to.
//!
//! All operations are async. Form logic is generic over these traits so
//! it has no dependency on the HTTP crate or on a terminal.

use std::path::PathBuf;

use crate::error::CertgateResult;
use crate::models::request::{CertificateRequest, GenerationResponse};
use crate::models::secret::SecretReference;

// ---------------------------------------------------------------------------
// Issuing backend
// ---------------------------------------------------------------------------

pub trait CertificateBackend: Send + Sync {
    /// Ask the backend to generate a key pair and certificate.
    ///
    /// `chain` selects the `/generate_certificate/{chain}/{purpose}`
    /// variant of the endpoint.
    fn generate(
        &self,
        chain: Option<&str>,
        request: &CertificateRequest,
    ) -> impl Future<Output = CertgateResult<GenerationResponse>> + Send;

    /// Fetch the one-time bundle. The backend deletes the private key
    /// once this succeeds.
    fn retrieve(
        &self,
        secret: &SecretReference,
    ) -> impl Future<Output = CertgateResult<Vec<u8>>> + Send;
}

// ---------------------------------------------------------------------------
// Operator interaction
// ---------------------------------------------------------------------------

/// Asks the operator a yes/no question.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> impl Future<Output = bool> + Send;
}

/// Where retrieved files end up.
pub trait BundleSink: Send + Sync {
    /// Store `contents` under `file_name` and return the final location.
    fn save(
        &self,
        file_name: &str,
        contents: &[u8],
    ) -> impl Future<Output = CertgateResult<PathBuf>> + Send;
}
