//! certgate form — identifier slots, request validation, submission
//! orchestration, and the one-time download gate.

pub mod config;
pub mod controller;
pub mod error;
pub mod form;
pub mod gate;
pub mod validator;

pub use config::{FormConfig, FqdnCheck};
pub use controller::{GeneratedCertificate, SubmissionController, SubmissionPhase};
pub use error::FormError;
pub use form::{FormState, IdentifierSlot, PurposeClassifier};
pub use gate::{DownloadGate, GateState, Retrieval};
