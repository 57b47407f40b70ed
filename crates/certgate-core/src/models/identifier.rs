//! Subject identifier kinds and identifier slot modes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of subject identifier an input carries.
///
/// Also used as the `cn_type` of a certificate request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    /// Fully qualified domain name.
    Fqdn,
    /// Dotted-quad IPv4 address.
    Ip,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifierKind::Fqdn => "fqdn",
            IdentifierKind::Ip => "ip",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which input of an identifier slot is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotMode {
    #[default]
    Unset,
    Fqdn,
    Ip,
}

impl SlotMode {
    /// The identifier kind this mode selects, if any.
    pub fn kind(self) -> Option<IdentifierKind> {
        match self {
            SlotMode::Unset => None,
            SlotMode::Fqdn => Some(IdentifierKind::Fqdn),
            SlotMode::Ip => Some(IdentifierKind::Ip),
        }
    }
}

impl From<IdentifierKind> for SlotMode {
    fn from(kind: IdentifierKind) -> Self {
        match kind {
            IdentifierKind::Fqdn => SlotMode::Fqdn,
            IdentifierKind::Ip => SlotMode::Ip,
        }
    }
}
