//! certgate — request X.509 credentials from a PKI backend.
//!
//! # Usage
//!
//! ```bash
//! certgate --url https://pki.example.org:5000 generate --purpose tls-server --cn fqdn=example.com
//! certgate generate --purpose iot-device --device mcu --chain pki-44 --cn ip=10.0.0.7
//! certgate ca-cert --chain certs --ca qubip-root-ca
//! certgate issue-csr web.csr --chain certs --purpose server --include-chain
//! ```

mod args;
mod operator;

use std::path::Path;

use certgate_core::backend::BundleSink;
use certgate_core::error::CertgateError;
use certgate_core::models::identifier::IdentifierKind;
use certgate_form::{
    FormConfig, FormState, FqdnCheck, Retrieval, SubmissionController, gate::KEY_DELETED_NOTICE,
};
use certgate_http::{ClientConfig, CsrIssuance, DownloadedFile, HttpCertificateBackend};
use clap::Parser;
use eyre::{Result, WrapErr, eyre};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::{BackendArgs, Cli, Command, GenerateArgs, IdentifierArg, IssueCsrArgs};
use operator::{DirectorySink, TerminalPrompt};

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    setup_logging(cli.log_json)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to start the async runtime")?;
    runtime.block_on(run(cli))
}

/// Logs go to stderr so stdout carries only certificate text.
fn setup_logging(json: bool) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("certgate=info".parse()?);
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
    .map_err(|e| eyre!("failed to install the log subscriber: {e}"))
}

async fn run(cli: Cli) -> Result<()> {
    let backend = connect(&cli.backend).await?;
    match cli.command {
        Command::Generate(args) => generate(backend, args).await,
        Command::CaCert(args) => {
            let file = backend
                .download_ca_certificate(&args.chain, &args.ca)
                .await?;
            write_file(&args.out_dir, file).await
        }
        Command::Crl(args) => {
            let file = backend.download_crl(&args.chain, &args.ca).await?;
            write_file(&args.out_dir, file).await
        }
        Command::IssueCsr(args) => issue_csr(backend, args).await,
    }
}

async fn connect(args: &BackendArgs) -> Result<HttpCertificateBackend> {
    let root_ca_pem = match &args.ca_cert {
        Some(path) => Some(
            tokio::fs::read(path)
                .await
                .wrap_err_with(|| format!("failed to read {}", path.display()))?,
        ),
        None => None,
    };
    let config = ClientConfig {
        base_url: args.url.clone(),
        root_ca_pem,
        ..ClientConfig::default()
    };
    Ok(HttpCertificateBackend::new(&config)?)
}

async fn generate(backend: HttpCertificateBackend, args: GenerateArgs) -> Result<()> {
    let config = FormConfig {
        purpose: args.purpose,
        algorithm: args.algorithm.clone(),
        slot_count: args.identifiers.len().max(1),
        fqdn_check: if args.lenient_fqdn {
            FqdnCheck::NonEmpty
        } else {
            FqdnCheck::Grammar
        },
        chain: args.chain.clone(),
    };
    let mut controller = SubmissionController::new(backend, config);

    let form = controller.form_mut();
    for (index, identifier) in args.identifiers.iter().enumerate() {
        if let IdentifierArg::Set(kind, value) = identifier {
            form.set_mode(index, (*kind).into())?;
            form.set_value(index, *kind, value)?;
        }
    }
    if let Some(device) = args.device {
        form.select_device(Some(device))
            .wrap_err("--device only applies to iot-device certificates")?;
    }

    let generated = match controller.submit().await {
        Ok(generated) => generated,
        Err(CertgateError::Validation(_)) => {
            report_form_errors(controller.form());
            return Err(eyre!("certificate request is invalid"));
        }
        Err(e) => return Err(e.into()),
    };

    if let Some(pem) = &generated.certificate {
        println!("{}", pem.trim_end());
    }
    info!(
        certificate_id = %generated.certificate_id,
        generated_at = %generated.generated_at,
        "certificate generated"
    );

    let prompt = if args.yes {
        TerminalPrompt::AssumeYes
    } else {
        TerminalPrompt::Interactive
    };
    let sink = DirectorySink::new(&args.out_dir);

    let mut attempt = 0;
    loop {
        match controller.download(&prompt, &sink).await {
            Ok(Retrieval::Saved(path)) => {
                eprintln!("Certificate bundle saved to {}", path.display());
                eprintln!("{KEY_DELETED_NOTICE}");
                return Ok(());
            }
            Ok(Retrieval::Declined) => {
                warn!(
                    certificate_id = %generated.certificate_id,
                    "bundle not downloaded; the private key stays on the backend"
                );
                return Ok(());
            }
            Ok(Retrieval::AlreadyConsumed) => {
                eprintln!("{KEY_DELETED_NOTICE}");
                return Ok(());
            }
            Err(e @ CertgateError::Retrieval(_)) if attempt < args.retries => {
                attempt += 1;
                warn!(error = %e, attempt, "retrying bundle download");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Print the errors attached to the form the way a page would show them.
fn report_form_errors(form: &FormState) {
    for (index, slot) in form.slots().iter().enumerate() {
        for kind in [IdentifierKind::Fqdn, IdentifierKind::Ip] {
            if let Some(message) = slot.error(kind) {
                eprintln!(
                    "--cn #{} ({kind}={}): {message}",
                    index + 1,
                    slot.input_value(kind)
                );
            }
        }
    }
    for error in form.top_level_errors() {
        eprintln!("{}", error.message());
    }
}

async fn issue_csr(backend: HttpCertificateBackend, args: IssueCsrArgs) -> Result<()> {
    let csr = tokio::fs::read(&args.csr)
        .await
        .wrap_err_with(|| format!("failed to read {}", args.csr.display()))?;
    let csr_file_name = args
        .csr
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("request.csr")
        .to_string();
    let issuance = CsrIssuance {
        chain: args.chain.clone(),
        purpose: args.purpose,
        out_format: args.out_format,
        include_chain: args.include_chain,
        csr_file_name,
        csr,
    };
    let file = backend.issue_from_csr(&issuance).await?;
    write_file(&args.out_dir, file).await
}

async fn write_file(out_dir: &Path, file: DownloadedFile) -> Result<()> {
    let path = DirectorySink::new(out_dir)
        .save(&file.file_name, &file.contents)
        .await?;
    info!(path = %path.display(), bytes = file.contents.len(), "download saved");
    println!("{}", path.display());
    Ok(())
}
