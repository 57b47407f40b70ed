//! Form configuration.

use certgate_core::models::request::CertificatePurpose;

/// How strictly FQDN inputs are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FqdnCheck {
    /// Any non-blank value is accepted.
    NonEmpty,
    /// Dot-separated labels ending in a 2–6 letter top-level label.
    #[default]
    Grammar,
}

/// Configuration of one certificate request form.
///
/// Whether a device classifier is shown and whether an identifier is
/// required at all follow from `purpose`.
#[derive(Debug, Clone)]
pub struct FormConfig {
    pub purpose: CertificatePurpose,
    /// Key algorithm identifier (e.g. `rsa2048`, `mldsa65`), passed to
    /// the backend unchanged.
    pub algorithm: String,
    /// Number of identifier slots on the form (1 for the legacy
    /// single-identifier variant).
    pub slot_count: usize,
    pub fqdn_check: FqdnCheck,
    /// Optional chain segment of the generation endpoint
    /// (`/generate_certificate/{chain}/{purpose}`).
    pub chain: Option<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            purpose: CertificatePurpose::TlsServer,
            algorithm: "rsa2048".into(),
            slot_count: 1,
            fqdn_check: FqdnCheck::Grammar,
            chain: None,
        }
    }
}

impl FormConfig {
    pub fn for_purpose(purpose: CertificatePurpose) -> Self {
        Self {
            purpose,
            ..Self::default()
        }
    }

    pub fn has_device_classifier(&self) -> bool {
        self.purpose.requires_device_purpose()
    }
}
