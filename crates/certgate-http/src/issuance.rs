//! Issuing a certificate for an operator-supplied CSR.
//!
//! Unlike generated certificates there is no private key on the backend,
//! so the result is an ordinary download.

use std::fmt;
use std::str::FromStr;

/// Extended key usage requested for a CSR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrPurpose {
    Server,
    Client,
}

impl CsrPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            CsrPurpose::Server => "server",
            CsrPurpose::Client => "client",
        }
    }
}

impl fmt::Display for CsrPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CsrPurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "server" => Ok(CsrPurpose::Server),
            "client" => Ok(CsrPurpose::Client),
            _ => Err(format!("unknown CSR purpose: {s} (expected server or client)")),
        }
    }
}

/// Encoding of the issued certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Pem,
    Der,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pem => "pem",
            OutputFormat::Der => "der",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pem" => Ok(OutputFormat::Pem),
            "der" => Ok(OutputFormat::Der),
            _ => Err(format!("unknown output format: {s} (expected pem or der)")),
        }
    }
}

/// Fields of `POST /issue_from_csr`.
#[derive(Debug, Clone)]
pub struct CsrIssuance {
    /// Issuing chain (e.g. `certs`, `pki-65`, `pki-44`).
    pub chain: String,
    pub purpose: CsrPurpose,
    pub out_format: OutputFormat,
    /// Return the leaf followed by its CA chain.
    pub include_chain: bool,
    pub csr_file_name: String,
    pub csr: Vec<u8>,
}

impl CsrIssuance {
    /// Name used when the backend does not send one.
    pub fn fallback_file_name(&self) -> String {
        let stem = if self.include_chain { "leaf_bundle" } else { "leaf" };
        format!("{stem}-{}-{}.{}", self.purpose, self.chain, self.out_format)
    }
}
