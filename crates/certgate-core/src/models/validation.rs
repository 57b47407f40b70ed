//! Validation error model.
//!
//! Field errors belong to one input of one identifier slot; top-level
//! errors belong to the form as a whole. The two classes are kept apart
//! so a front end can render each where it belongs.

use std::collections::BTreeMap;
use std::fmt;

use super::identifier::IdentifierKind;

/// Address of one input: slot index plus which of its two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldId {
    pub slot: usize,
    pub kind: IdentifierKind,
}

impl FieldId {
    pub fn new(slot: usize, kind: IdentifierKind) -> Self {
        Self { slot, kind }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.slot)
    }
}

/// Why a single identifier input was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    EmptyFqdn,
    InvalidFqdn,
    InvalidIp,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match self {
            FieldError::EmptyFqdn => "FQDN cannot be empty.",
            FieldError::InvalidFqdn => "Invalid FQDN format.",
            FieldError::InvalidIp => "Invalid IP address format.",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Form-wide selection errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopLevelError {
    /// No slot resolved to a valid identifier.
    NoIdentifier,
    /// A device-oriented form without a device class.
    NoDevicePurpose,
}

impl TopLevelError {
    pub fn message(&self) -> &'static str {
        match self {
            TopLevelError::NoIdentifier => "Please select at least one FQDN or IP address.",
            TopLevelError::NoDevicePurpose => "Please select a purpose.",
        }
    }
}

impl fmt::Display for TopLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Everything wrong with a form at validation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub field_errors: BTreeMap<FieldId, FieldError>,
    pub top_level: Vec<TopLevelError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.field_errors.is_empty() && self.top_level.is_empty()
    }

    pub fn field(&self, slot: usize, kind: IdentifierKind) -> Option<FieldError> {
        self.field_errors.get(&FieldId::new(slot, kind)).copied()
    }

    pub fn has_top_level(&self, error: TopLevelError) -> bool {
        self.top_level.contains(&error)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for error in &self.top_level {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
            first = false;
        }
        for (field, error) in &self.field_errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {error}")?;
            first = false;
        }
        Ok(())
    }
}
