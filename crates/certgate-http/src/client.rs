//! reqwest implementation of [`CertificateBackend`] plus the auxiliary
//! downloads.

use std::path::Path;

use certgate_core::backend::CertificateBackend;
use certgate_core::error::{CertgateError, CertgateResult};
use certgate_core::models::request::{
    BackendErrorBody, CertificatePurpose, CertificateRequest, GenerationResponse,
};
use certgate_core::models::secret::SecretReference;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::HttpError;
use crate::issuance::CsrIssuance;

/// A file fetched from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// Talks to the PKI backend over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpCertificateBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpCertificateBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, HttpError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| HttpError::Url(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(HttpError::Url(format!("{} cannot be a base URL", config.base_url)));
        }

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(pem) = &config.root_ca_pem {
            let certificate = reqwest::Certificate::from_pem(pem)
                .map_err(|e| HttpError::RootCertificate(e.to_string()))?;
            builder = builder.add_root_certificate(certificate);
        }

        info!(base_url = %base_url, "PKI backend client ready");
        Ok(Self {
            http: builder.build()?,
            base_url,
        })
    }

    /// `POST` target for certificate generation.
    pub fn generation_url(
        &self,
        chain: Option<&str>,
        purpose: CertificatePurpose,
    ) -> Result<Url, HttpError> {
        let mut segments = vec!["generate_certificate"];
        segments.extend(chain);
        segments.push(purpose.as_str());
        self.endpoint(&segments)
    }

    /// `GET` target for the one-time bundle.
    pub fn download_url(&self, secret: &SecretReference) -> Result<Url, HttpError> {
        let mut segments = vec!["download_certificate"];
        segments.extend(secret.path_segments());
        self.endpoint(&segments)
    }

    pub fn ca_certificate_url(&self, chain: &str, ca: &str) -> Result<Url, HttpError> {
        self.endpoint(&[chain, ca, "certificate"])
    }

    pub fn crl_url(&self, chain: &str, ca: &str) -> Result<Url, HttpError> {
        self.endpoint(&[chain, ca, "crl"])
    }

    /// Download a CA certificate. Plain download, no one-time semantics.
    pub async fn download_ca_certificate(
        &self,
        chain: &str,
        ca: &str,
    ) -> CertgateResult<DownloadedFile> {
        let url = self.ca_certificate_url(chain, ca)?;
        let (contents, name) = self.get_bytes(url).await?;
        Ok(DownloadedFile {
            file_name: name.unwrap_or_else(|| format!("{ca}-cert.pem")),
            contents,
        })
    }

    /// Download the current CRL of a CA.
    pub async fn download_crl(&self, chain: &str, ca: &str) -> CertgateResult<DownloadedFile> {
        let url = self.crl_url(chain, ca)?;
        let (contents, name) = self.get_bytes(url).await?;
        Ok(DownloadedFile {
            file_name: name.unwrap_or_else(|| format!("{ca}.crl")),
            contents,
        })
    }

    /// Have the backend sign an operator-supplied CSR.
    pub async fn issue_from_csr(&self, issuance: &CsrIssuance) -> CertgateResult<DownloadedFile> {
        let url = self.endpoint(&["issue_from_csr"])?;

        let csr = Part::bytes(issuance.csr.clone())
            .file_name(issuance.csr_file_name.clone())
            .mime_str("application/pkcs10")
            .map_err(HttpError::from)?;
        let mut form = Form::new()
            .text("chain", issuance.chain.clone())
            .text("purpose", issuance.purpose.as_str())
            .text("out_format", issuance.out_format.as_str())
            .part("csr", csr);
        if issuance.include_chain {
            form = form.text("include_chain", "on");
        }

        debug!(%url, chain = %issuance.chain, purpose = %issuance.purpose, "POST CSR issuance");
        let response = self
            .http
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(HttpError::from)?;
        let response = check_status(response).await?;
        let name = response_file_name(&response);
        let contents = response.bytes().await.map_err(HttpError::from)?.to_vec();

        Ok(DownloadedFile {
            file_name: name.unwrap_or_else(|| issuance.fallback_file_name()),
            contents,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| HttpError::Url(format!("{} cannot be a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post_generation(
        &self,
        chain: Option<&str>,
        request: &CertificateRequest,
    ) -> Result<GenerationResponse, HttpError> {
        let url = self.generation_url(chain, request.purpose)?;
        debug!(%url, "POST certificate generation");
        let response = self.http.post(url).json(&request.to_body()).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<GenerationResponse>().await?)
    }

    async fn get_bytes(&self, url: Url) -> Result<(Vec<u8>, Option<String>), HttpError> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        let response = check_status(response).await?;
        let name = response_file_name(&response);
        Ok((response.bytes().await?.to_vec(), name))
    }
}

impl CertificateBackend for HttpCertificateBackend {
    async fn generate(
        &self,
        chain: Option<&str>,
        request: &CertificateRequest,
    ) -> CertgateResult<GenerationResponse> {
        self.post_generation(chain, request)
            .await
            .map_err(|e| CertgateError::Generation(e.to_string()))
    }

    async fn retrieve(&self, secret: &SecretReference) -> CertgateResult<Vec<u8>> {
        let url = self
            .download_url(secret)
            .map_err(|e| CertgateError::Retrieval(e.to_string()))?;
        self.get_bytes(url)
            .await
            .map(|(contents, _)| contents)
            .map_err(|e| CertgateError::Retrieval(e.to_string()))
    }
}

/// Turn any non-success status into [`HttpError::Status`], using the
/// backend's `{error, details}` body when there is one.
async fn check_status(response: Response) -> Result<Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<BackendErrorBody>(&text) {
        Ok(body) => body.to_string(),
        Err(_) if text.trim().is_empty() => status.canonical_reason().unwrap_or("").to_string(),
        Err(_) => text.trim().to_string(),
    };
    Err(HttpError::Status {
        status: status.as_u16(),
        message,
    })
}

fn response_file_name(response: &Response) -> Option<String> {
    response
        .headers()
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(attachment_file_name)
}

/// File name from a `Content-Disposition` header, stripped of any
/// directory components.
pub fn attachment_file_name(header: &str) -> Option<String> {
    let raw = header.split(';').map(str::trim).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("filename")
            .then(|| value.trim().trim_matches('"'))
    })?;
    let name = Path::new(raw).file_name()?.to_str()?;
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpCertificateBackend {
        HttpCertificateBackend::new(&ClientConfig {
            base_url: base.into(),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn generation_url_with_and_without_chain() {
        let b = backend("https://pki.example.org:5000");
        assert_eq!(
            b.generation_url(None, CertificatePurpose::TlsServer).unwrap().as_str(),
            "https://pki.example.org:5000/generate_certificate/tls-server"
        );
        assert_eq!(
            b.generation_url(Some("pki-65"), CertificatePurpose::IotDevice)
                .unwrap()
                .as_str(),
            "https://pki.example.org:5000/generate_certificate/pki-65/iot-device"
        );
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let b = backend("https://example.org/pki/");
        let secret = SecretReference {
            pki_path: Some("certs".into()),
            ca_id: "qubip-tls-ca".into(),
            certificate_id: "abc-tls-client".into(),
        };
        assert_eq!(
            b.download_url(&secret).unwrap().as_str(),
            "https://example.org/pki/download_certificate/certs/qubip-tls-ca/abc-tls-client"
        );
    }

    #[test]
    fn opaque_segments_are_escaped() {
        let b = backend("http://localhost:5000");
        let secret = SecretReference {
            pki_path: None,
            ca_id: "../etc".into(),
            certificate_id: "a/b".into(),
        };
        let url = b.download_url(&secret).unwrap();
        assert_eq!(url.path(), "/download_certificate/..%2Fetc/a%2Fb");
    }

    #[test]
    fn auxiliary_urls() {
        let b = backend("http://localhost:5000");
        assert_eq!(
            b.ca_certificate_url("pki-44", "qubip-mcu-ca").unwrap().path(),
            "/pki-44/qubip-mcu-ca/certificate"
        );
        assert_eq!(
            b.crl_url("certs", "qubip-tls-ca").unwrap().path(),
            "/certs/qubip-tls-ca/crl"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        for base in ["not a url", "mailto:pki@example.org"] {
            let err = HttpCertificateBackend::new(&ClientConfig {
                base_url: base.into(),
                ..ClientConfig::default()
            })
            .unwrap_err();
            assert!(matches!(err, HttpError::Url(_)), "{base}: {err:?}");
        }
    }

    #[test]
    fn parses_content_disposition() {
        assert_eq!(
            attachment_file_name("attachment; filename=leaf-server-certs.pem").as_deref(),
            Some("leaf-server-certs.pem")
        );
        assert_eq!(
            attachment_file_name(r#"attachment; filename="qubip-root-ca.crl""#).as_deref(),
            Some("qubip-root-ca.crl")
        );
        assert_eq!(
            attachment_file_name(r#"attachment; filename="../../etc/passwd""#).as_deref(),
            Some("passwd")
        );
        assert_eq!(attachment_file_name("inline"), None);
        assert_eq!(attachment_file_name("attachment; filename=\"\""), None);
    }
}
