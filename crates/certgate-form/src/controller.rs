//! Submission controller — validate, generate, arm the download gate.

use certgate_core::backend::{BundleSink, CertificateBackend, Confirm};
use certgate_core::error::{CertgateError, CertgateResult};
use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::FormConfig;
use crate::error::FormError;
use crate::form::FormState;
use crate::gate::{DownloadGate, Retrieval};

/// What the post-generation panel shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCertificate {
    pub certificate_id: String,
    /// PEM text of the certificate, if the backend returned it.
    pub certificate: Option<String>,
    pub filename: Option<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// Form visible, submit allowed.
    Editing,
    /// Form hidden, generation request outstanding.
    Pending,
    /// Certificate generated; the gate is ready.
    Generated(GeneratedCertificate),
    /// Generation failed; a new controller is needed to try again.
    Failed(String),
}

/// Drives one form from submit to download.
///
/// Generic over the backend so the controller has no dependency on the
/// HTTP crate.
pub struct SubmissionController<B: CertificateBackend> {
    backend: B,
    form: FormState,
    gate: DownloadGate,
    phase: SubmissionPhase,
}

impl<B: CertificateBackend> SubmissionController<B> {
    pub fn new(backend: B, config: FormConfig) -> Self {
        Self {
            backend,
            form: FormState::new(config),
            gate: DownloadGate::new(),
            phase: SubmissionPhase::Editing,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn gate(&self) -> &DownloadGate {
        &self.gate
    }

    pub fn phase(&self) -> &SubmissionPhase {
        &self.phase
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Submit the form once.
    ///
    /// The form is hidden before anything else happens so no second
    /// request can start. Validation failures bring the form back with
    /// its errors attached; generation failures leave it hidden.
    pub async fn submit(&mut self) -> CertgateResult<GeneratedCertificate> {
        if self.phase != SubmissionPhase::Editing {
            return Err(FormError::AlreadySubmitted.into());
        }
        self.form.hide();
        self.phase = SubmissionPhase::Pending;

        // 1. Validate.
        let request = match self.form.validate() {
            Ok(request) => request,
            Err(errors) => {
                self.form.show();
                self.phase = SubmissionPhase::Editing;
                return Err(CertgateError::Validation(errors));
            }
        };

        info!(
            form_id = %self.form.id(),
            purpose = %request.purpose,
            cn_type = request.common_name_type.map(|k| k.as_str()).unwrap_or(""),
            common_name = %request.common_name,
            algorithm = %request.algorithm,
            "requesting certificate generation"
        );

        // 2. Generate.
        let chain = self.form.config().chain.as_deref();
        let response = match self.backend.generate(chain, &request).await {
            Ok(response) => response,
            Err(e) => {
                error!(form_id = %self.form.id(), error = %e, "certificate generation failed");
                let message = e.to_string();
                self.phase = SubmissionPhase::Failed(message.clone());
                return Err(match e {
                    CertgateError::Generation(_) => e,
                    _ => CertgateError::Generation(message),
                });
            }
        };

        // 3. Arm the gate and reveal the result.
        self.gate.arm(response.secret())?;
        let generated = GeneratedCertificate {
            certificate_id: response.certificate_id,
            certificate: response.certificate,
            filename: response.filename,
            generated_at: Utc::now(),
        };
        info!(
            form_id = %self.form.id(),
            certificate_id = %generated.certificate_id,
            "certificate generated successfully"
        );
        self.phase = SubmissionPhase::Generated(generated.clone());
        Ok(generated)
    }

    /// Retrieve the one-time bundle through the gate.
    pub async fn download<C: Confirm, S: BundleSink>(
        &mut self,
        confirm: &C,
        sink: &S,
    ) -> CertgateResult<Retrieval> {
        self.gate.retrieve(&self.backend, confirm, sink).await
    }
}
