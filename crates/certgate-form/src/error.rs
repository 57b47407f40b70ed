//! Form error types.

use certgate_core::error::CertgateError;
use certgate_core::models::identifier::IdentifierKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("no identifier slot at index {0}")]
    NoSuchSlot(usize),

    #[error("the {kind} input of slot {slot} is hidden")]
    InactiveInput { slot: usize, kind: IdentifierKind },

    #[error("this form has no device purpose selector")]
    NoClassifier,

    #[error("the form has already been submitted; reload to request another certificate")]
    AlreadySubmitted,

    #[error("no certificate available to download")]
    NothingToDownload,

    #[error("the certificate has already been retrieved; generate a new one")]
    GateConsumed,
}

impl From<FormError> for CertgateError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::NothingToDownload => CertgateError::NothingToDownload,
            FormError::NoSuchSlot(_)
            | FormError::InactiveInput { .. }
            | FormError::NoClassifier
            | FormError::AlreadySubmitted
            | FormError::GateConsumed => CertgateError::Form {
                reason: err.to_string(),
            },
        }
    }
}
