//! Command-line arguments.

use std::path::PathBuf;
use std::str::FromStr;

use certgate_core::models::device::DevicePurpose;
use certgate_core::models::identifier::IdentifierKind;
use certgate_core::models::request::CertificatePurpose;
use certgate_http::{CsrPurpose, OutputFormat};
use clap::{Args, Parser, Subcommand};

/// Request certificates from a PKI backend and retrieve the one-time
/// key bundle.
#[derive(Parser, Debug)]
#[command(name = "certgate")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct BackendArgs {
    /// Base URL of the PKI backend
    #[arg(long, env = "CERTGATE_URL", default_value = "https://127.0.0.1:5000", global = true)]
    pub url: String,

    /// Extra PEM root certificate to trust for the backend's TLS
    #[arg(long, env = "CERTGATE_CA_CERT", global = true)]
    pub ca_cert: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a key pair and certificate, then retrieve the one-time bundle
    Generate(GenerateArgs),

    /// Download a CA certificate
    CaCert(CaArgs),

    /// Download the certificate revocation list of a CA
    Crl(CaArgs),

    /// Have the backend sign a certificate signing request
    IssueCsr(IssueCsrArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Certificate purpose: tls-server, tls-client, code-signing or iot-device
    #[arg(long, default_value = "tls-server")]
    pub purpose: CertificatePurpose,

    /// Identifier slot, in slot order: `fqdn=<name>`, `ip=<address>` or `none`
    #[arg(long = "cn", value_name = "KIND=VALUE")]
    pub identifiers: Vec<IdentifierArg>,

    /// Key algorithm, passed to the backend unchanged
    #[arg(long, default_value = "rsa2048")]
    pub algorithm: String,

    /// Device class for iot-device certificates: mpu, mcu or tls
    #[arg(long)]
    pub device: Option<DevicePurpose>,

    /// Issuing chain segment of the generation endpoint (e.g. pki-65)
    #[arg(long)]
    pub chain: Option<String>,

    /// Only require FQDN inputs to be non-empty
    #[arg(long)]
    pub lenient_fqdn: bool,

    /// Directory the bundle is saved into
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Answer the one-time download warning with yes
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Extra attempts after a failed bundle transfer
    #[arg(long, default_value_t = 2)]
    pub retries: usize,
}

#[derive(Args, Debug)]
pub struct CaArgs {
    /// Chain the CA belongs to (e.g. certs, pki-65)
    #[arg(long)]
    pub chain: String,

    /// CA identifier (e.g. qubip-root-ca)
    #[arg(long)]
    pub ca: String,

    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct IssueCsrArgs {
    /// PEM or DER encoded CSR
    pub csr: PathBuf,

    #[arg(long)]
    pub chain: String,

    /// Extended key usage: server or client
    #[arg(long, default_value = "server")]
    pub purpose: CsrPurpose,

    /// Encoding of the issued certificate: pem or der
    #[arg(long, default_value = "pem")]
    pub out_format: OutputFormat,

    /// Append the CA chain to the issued certificate
    #[arg(long)]
    pub include_chain: bool,

    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

/// One `--cn` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierArg {
    /// Leave the slot unset.
    Unset,
    Set(IdentifierKind, String),
}

impl FromStr for IdentifierArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(IdentifierArg::Unset);
        }
        let (kind, value) = s
            .split_once('=')
            .ok_or_else(|| format!("expected fqdn=<name>, ip=<address> or none, got {s}"))?;
        let kind = match kind.trim().to_ascii_lowercase().as_str() {
            "fqdn" => IdentifierKind::Fqdn,
            "ip" => IdentifierKind::Ip,
            other => return Err(format!("unknown identifier kind: {other} (expected fqdn or ip)")),
        };
        Ok(IdentifierArg::Set(kind, value.to_string()))
    }
}
