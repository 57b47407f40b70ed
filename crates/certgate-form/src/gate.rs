//! One-time download gate.
//!
//! The backend deletes the private key after the first successful
//! retrieval. The gate mirrors that on the client: it asks for explicit
//! confirmation before the only transfer, keeps the secret reference
//! across failed attempts, and refuses to touch the network once the
//! bundle has been consumed. The server remains the enforcement point.

use std::path::PathBuf;

use certgate_core::backend::{BundleSink, CertificateBackend, Confirm};
use certgate_core::error::{CertgateError, CertgateResult};
use certgate_core::models::secret::SecretReference;
use tracing::{info, warn};

use crate::error::FormError;

/// Prompt shown before the only transfer.
pub const ONE_TIME_WARNING: &str = "Warning: This certificate and private key can only be \
     downloaded ONCE. After that, the private key will be deleted from the server. \
     Do you want to proceed?";

/// Standing notice once the bundle has been retrieved.
pub const KEY_DELETED_NOTICE: &str = "The private key has been deleted for security reasons. \
     Please generate another certificate if you need it.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GateState {
    /// Nothing generated yet.
    #[default]
    Idle,
    /// A bundle is waiting on the backend.
    Ready(SecretReference),
    /// The bundle was retrieved; the backend no longer holds the key.
    Consumed(SecretReference),
}

/// Outcome of a retrieval attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// Bundle retrieved and saved at this location.
    Saved(PathBuf),
    /// The operator declined the one-time warning; the gate is still ready.
    Declined,
    /// The bundle was already retrieved; no request was made.
    AlreadyConsumed,
}

impl Retrieval {
    /// Message to show the operator, if any.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            Retrieval::AlreadyConsumed => Some(KEY_DELETED_NOTICE),
            Retrieval::Saved(_) | Retrieval::Declined => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct DownloadGate {
    state: GateState,
}

impl DownloadGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn secret(&self) -> Option<&SecretReference> {
        match &self.state {
            GateState::Idle => None,
            GateState::Ready(secret) | GateState::Consumed(secret) => Some(secret),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, GateState::Ready(_))
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self.state, GateState::Consumed(_))
    }

    /// Make a freshly generated bundle available, replacing any previous
    /// one that was never retrieved.
    pub fn arm(&mut self, secret: SecretReference) -> CertgateResult<()> {
        if self.is_consumed() {
            return Err(FormError::GateConsumed.into());
        }
        info!(
            certificate_id = %secret.certificate_id,
            ca = %secret.ca_id,
            "one-time bundle ready for retrieval"
        );
        self.state = GateState::Ready(secret);
        Ok(())
    }

    /// Attempt the one-time retrieval.
    ///
    /// Only a confirmed, successful transfer consumes the gate. A failed
    /// transfer leaves it ready with the same secret so the operator can
    /// try again.
    pub async fn retrieve<B, C, S>(
        &mut self,
        backend: &B,
        confirm: &C,
        sink: &S,
    ) -> CertgateResult<Retrieval>
    where
        B: CertificateBackend,
        C: Confirm,
        S: BundleSink,
    {
        let secret = match &self.state {
            GateState::Idle => {
                warn!("download requested before any certificate was generated");
                return Err(FormError::NothingToDownload.into());
            }
            GateState::Consumed(secret) => {
                warn!(
                    certificate_id = %secret.certificate_id,
                    "download requested for a bundle that was already retrieved"
                );
                return Ok(Retrieval::AlreadyConsumed);
            }
            GateState::Ready(secret) => secret.clone(),
        };

        if !confirm.confirm(ONE_TIME_WARNING).await {
            info!(certificate_id = %secret.certificate_id, "one-time download declined");
            return Ok(Retrieval::Declined);
        }

        let bundle = backend.retrieve(&secret).await.map_err(|e| {
            warn!(
                certificate_id = %secret.certificate_id,
                error = %e,
                "bundle retrieval failed; it may still be available"
            );
            match e {
                CertgateError::Retrieval(_) => e,
                other => CertgateError::Retrieval(other.to_string()),
            }
        })?;

        // The backend has deleted the key at this point, whatever happens
        // to the local copy.
        let file_name = secret.bundle_file_name();
        self.state = GateState::Consumed(secret);
        info!(file = %file_name, bytes = bundle.len(), "one-time bundle retrieved");

        let path = sink.save(&file_name, &bundle).await?;
        Ok(Retrieval::Saved(path))
    }
}
