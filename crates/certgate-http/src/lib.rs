//! certgate HTTP — reqwest-backed access to the PKI backend.
//!
//! This crate provides:
//! - The [`CertificateBackend`](certgate_core::backend::CertificateBackend)
//!   implementation used by the form ([`HttpCertificateBackend`])
//! - Client configuration ([`ClientConfig`])
//! - Plain downloads with no one-time semantics: CA certificates, CRLs,
//!   and certificates issued from an uploaded CSR
//! - Error types ([`HttpError`])

mod client;
mod config;
mod error;
pub mod issuance;

pub use client::{DownloadedFile, HttpCertificateBackend, attachment_file_name};
pub use config::ClientConfig;
pub use error::HttpError;
pub use issuance::{CsrIssuance, CsrPurpose, OutputFormat};
