//! Reference to a one-time certificate bundle.

/// Opaque path components identifying where a generated bundle lives.
///
/// Held only in memory; the backend deletes the private key after the
/// first successful retrieval, so the reference is worthless afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretReference {
    /// Chain segment (e.g. `pki-65`). Older backends omit it.
    pub pki_path: Option<String>,
    pub ca_id: String,
    pub certificate_id: String,
}

impl SecretReference {
    /// Path segments after `/download_certificate/`, in order.
    pub fn path_segments(&self) -> Vec<&str> {
        let mut segments = Vec::with_capacity(3);
        if let Some(pki) = &self.pki_path {
            segments.push(pki.as_str());
        }
        segments.push(self.ca_id.as_str());
        segments.push(self.certificate_id.as_str());
        segments
    }

    /// Local file name the bundle is saved under.
    pub fn bundle_file_name(&self) -> String {
        format!("{}.zip", self.certificate_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_include_pki_when_present() {
        let secret = SecretReference {
            pki_path: Some("pki-65".into()),
            ca_id: "qubip-mpu-ca".into(),
            certificate_id: "0a1b2c3d4e-iot-device".into(),
        };
        assert_eq!(
            secret.path_segments(),
            ["pki-65", "qubip-mpu-ca", "0a1b2c3d4e-iot-device"]
        );
        assert_eq!(secret.bundle_file_name(), "0a1b2c3d4e-iot-device.zip");
    }

    #[test]
    fn segments_skip_missing_pki() {
        let secret = SecretReference {
            pki_path: None,
            ca_id: "qubip-tls-ca".into(),
            certificate_id: "abc".into(),
        };
        assert_eq!(secret.path_segments(), ["qubip-tls-ca", "abc"]);
    }
}
