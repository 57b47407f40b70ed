//! Certificate request models and the generation wire format.
//!
//! A [`CertificateRequest`] is what the validator produces; the backend
//! receives it as a [`GenerationBody`] and answers with a
//! [`GenerationResponse`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::device::DevicePurpose;
use super::identifier::IdentifierKind;
use super::secret::SecretReference;

/// What the requested certificate will be used for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum CertificatePurpose {
    TlsServer,
    TlsClient,
    CodeSigning,
    IotDevice,
}

impl CertificatePurpose {
    pub const ALL: [CertificatePurpose; 4] = [
        CertificatePurpose::TlsServer,
        CertificatePurpose::TlsClient,
        CertificatePurpose::CodeSigning,
        CertificatePurpose::IotDevice,
    ];

    /// Path segment and JSON value used by the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificatePurpose::TlsServer => "tls-server",
            CertificatePurpose::TlsClient => "tls-client",
            CertificatePurpose::CodeSigning => "code-signing",
            CertificatePurpose::IotDevice => "iot-device",
        }
    }

    /// Code-signing certificates carry no subject identifier.
    pub fn requires_identifier(&self) -> bool {
        !matches!(self, CertificatePurpose::CodeSigning)
    }

    pub fn requires_device_purpose(&self) -> bool {
        matches!(self, CertificatePurpose::IotDevice)
    }
}

impl fmt::Display for CertificatePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CertificatePurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CertificatePurpose::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "unknown certificate purpose: {s} \
                     (expected tls-server, tls-client, code-signing or iot-device)"
                )
            })
    }
}

/// A validated, unambiguous certificate request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRequest {
    /// `None` only for code-signing requests.
    pub common_name_type: Option<IdentifierKind>,
    /// Empty only for code-signing requests.
    pub common_name: String,
    /// Key algorithm identifier, passed through unchanged.
    pub algorithm: String,
    pub purpose: CertificatePurpose,
    /// Present iff `purpose` is [`CertificatePurpose::IotDevice`].
    pub device_purpose: Option<DevicePurpose>,
}

impl CertificateRequest {
    /// A code-signing request: no identifier, no device class.
    pub fn code_signing(algorithm: impl Into<String>) -> Self {
        Self {
            common_name_type: None,
            common_name: String::new(),
            algorithm: algorithm.into(),
            purpose: CertificatePurpose::CodeSigning,
            device_purpose: None,
        }
    }

    /// JSON body sent to the generation endpoint.
    pub fn to_body(&self) -> GenerationBody {
        GenerationBody {
            common_name: self.common_name.clone(),
            algorithm: self.algorithm.clone(),
            purpose: self.purpose,
            cn_type: self
                .common_name_type
                .map(|k| k.as_str().to_string())
                .unwrap_or_default(),
            device: self.device_purpose,
        }
    }
}

/// Body of `POST /generate_certificate/...`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationBody {
    pub common_name: String,
    pub algorithm: String,
    pub purpose: CertificatePurpose,
    /// `"fqdn"`, `"ip"`, or empty for code-signing.
    pub cn_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<DevicePurpose>,
}

/// Successful answer of the generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerationResponse {
    /// PEM preview of the issued certificate, if the backend returns one.
    #[serde(default)]
    pub certificate: Option<String>,
    pub ca: String,
    pub certificate_id: String,
    #[serde(default)]
    pub pki: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl GenerationResponse {
    /// Where the one-time bundle for this certificate lives.
    pub fn secret(&self) -> SecretReference {
        SecretReference {
            pki_path: self.pki.clone(),
            ca_id: self.ca.clone(),
            certificate_id: self.certificate_id.clone(),
        }
    }
}

/// Error body returned by the backend on failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl fmt::Display for BackendErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{} ({details})", self.error),
            None => f.write_str(&self.error),
        }
    }
}
