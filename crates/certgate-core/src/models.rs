//! Domain models for certgate.
//!
//! Plain data shared by the form logic, the HTTP backend, and the CLI.

pub mod device;
pub mod identifier;
pub mod request;
pub mod secret;
pub mod validation;
