//! In-memory fakes for the backend, the operator prompt, and the save sink.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use certgate_core::backend::{BundleSink, CertificateBackend, Confirm};
use certgate_core::error::{CertgateError, CertgateResult};
use certgate_core::models::request::{CertificateRequest, GenerationResponse};
use certgate_core::models::secret::SecretReference;

pub const BUNDLE: &[u8] = b"PK\x03\x04fake-zip";

/// Backend that records calls and answers from a script.
#[derive(Default)]
pub struct FakeBackend {
    pub generate_calls: AtomicUsize,
    pub retrieve_calls: AtomicUsize,
    pub fail_generation: AtomicBool,
    /// Number of retrieval attempts that fail before one succeeds.
    pub retrieval_failures: AtomicUsize,
    pub last_request: Mutex<Option<CertificateRequest>>,
    pub last_chain: Mutex<Option<String>>,
    pub retrieved: Mutex<Vec<SecretReference>>,
}

impl FakeBackend {
    pub fn failing_generation() -> Self {
        let backend = Self::default();
        backend.fail_generation.store(true, Ordering::SeqCst);
        backend
    }

    pub fn with_retrieval_failures(count: usize) -> Self {
        let backend = Self::default();
        backend.retrieval_failures.store(count, Ordering::SeqCst);
        backend
    }

    pub fn generate_count(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn retrieve_count(&self) -> usize {
        self.retrieve_calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CertificateRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

impl CertificateBackend for FakeBackend {
    async fn generate(
        &self,
        chain: Option<&str>,
        request: &CertificateRequest,
    ) -> CertgateResult<GenerationResponse> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        *self.last_chain.lock().unwrap() = chain.map(str::to_string);
        if self.fail_generation.load(Ordering::SeqCst) {
            return Err(CertgateError::Generation(
                "An unexpected error occurred (Invalid device: None)".into(),
            ));
        }
        Ok(GenerationResponse {
            certificate: Some("-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n".into()),
            ca: "qubip-tls-ca".into(),
            certificate_id: format!("3f9c0a1b2d-{}", request.purpose),
            pki: chain.map(str::to_string),
            filename: Some(format!("3f9c0a1b2d-{}.pem", request.purpose)),
        })
    }

    async fn retrieve(&self, secret: &SecretReference) -> CertgateResult<Vec<u8>> {
        self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.retrieval_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.retrieval_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CertgateError::Retrieval("backend answered 404 Not Found".into()));
        }
        self.retrieved.lock().unwrap().push(secret.clone());
        Ok(BUNDLE.to_vec())
    }
}

/// Answers prompts from a queue; defaults to "no" when exhausted.
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: Mutex<VecDeque<bool>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            prompts: Mutex::default(),
        }
    }

    pub fn always_yes() -> Self {
        Self::answering(&[true; 8])
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl Confirm for ScriptedConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}

/// Keeps saved files in memory.
#[derive(Default)]
pub struct MemorySink {
    pub saved: Mutex<Vec<(String, Vec<u8>)>>,
    pub fail: AtomicBool,
}

impl MemorySink {
    pub fn saved_names(&self) -> Vec<String> {
        self.saved.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl BundleSink for MemorySink {
    async fn save(&self, file_name: &str, contents: &[u8]) -> CertgateResult<PathBuf> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(CertgateError::Save {
                path: file_name.to_string(),
                reason: "disk full".into(),
            });
        }
        self.saved
            .lock()
            .unwrap()
            .push((file_name.to_string(), contents.to_vec()));
        Ok(PathBuf::from("/downloads").join(file_name))
    }
}

pub fn secret() -> SecretReference {
    SecretReference {
        pki_path: Some("certs".into()),
        ca_id: "qubip-tls-ca".into(),
        certificate_id: "5e6f7a8b9c-tls-server".into(),
    }
}
