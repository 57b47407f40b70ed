//! HTTP client configuration.

/// Configuration for talking to the PKI backend.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend (e.g., `https://pki.example.org:5000`).
    /// A path prefix is kept; endpoint paths are appended to it.
    pub base_url: String,
    /// Extra PEM root certificate(s) to trust, for backends served under
    /// a private CA.
    pub root_ca_pem: Option<Vec<u8>>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://127.0.0.1:5000".into(),
            root_ca_pem: None,
            user_agent: concat!("certgate/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}
