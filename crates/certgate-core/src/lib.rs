//! certgate core — domain models, error types, and the traits that
//! separate form logic from the backend, the operator prompt, and the
//! local file system.

pub mod backend;
pub mod error;
pub mod models;

pub use error::{CertgateError, CertgateResult};
