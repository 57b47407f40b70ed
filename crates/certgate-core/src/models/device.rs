//! IoT device purpose classification.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Device class of an IoT certificate. Selects the issuing chain on the
/// backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DevicePurpose {
    /// Microprocessor-class device.
    Mpu,
    /// Microcontroller-class device.
    Mcu,
    /// TLS-only device.
    Tls,
}

impl DevicePurpose {
    pub const ALL: [DevicePurpose; 3] = [DevicePurpose::Mpu, DevicePurpose::Mcu, DevicePurpose::Tls];

    pub fn as_str(&self) -> &'static str {
        match self {
            DevicePurpose::Mpu => "mpu",
            DevicePurpose::Mcu => "mcu",
            DevicePurpose::Tls => "tls",
        }
    }
}

impl fmt::Display for DevicePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DevicePurpose {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DevicePurpose::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown device purpose: {s} (expected mpu, mcu or tls)"))
    }
}
