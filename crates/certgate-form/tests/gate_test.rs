//! Integration tests for the one-time download gate.

mod support;

use std::sync::atomic::Ordering;

use certgate_core::error::CertgateError;
use certgate_form::gate::{KEY_DELETED_NOTICE, ONE_TIME_WARNING};
use certgate_form::{DownloadGate, GateState, Retrieval};
use support::{BUNDLE, FakeBackend, MemorySink, ScriptedConfirm, secret};

#[tokio::test]
async fn idle_gate_refuses_without_network_or_prompt() {
    let backend = FakeBackend::default();
    let confirm = ScriptedConfirm::always_yes();
    let sink = MemorySink::default();
    let mut gate = DownloadGate::new();

    let err = gate.retrieve(&backend, &confirm, &sink).await.unwrap_err();

    assert!(matches!(err, CertgateError::NothingToDownload));
    assert_eq!(err.to_string(), "No certificate available to download.");
    assert_eq!(backend.retrieve_count(), 0);
    assert_eq!(confirm.prompt_count(), 0);
    assert_eq!(gate.state(), &GateState::Idle);
}

#[tokio::test]
async fn confirmed_retrieval_consumes_the_gate() {
    let backend = FakeBackend::default();
    let confirm = ScriptedConfirm::always_yes();
    let sink = MemorySink::default();
    let mut gate = DownloadGate::new();
    gate.arm(secret()).unwrap();

    let outcome = gate.retrieve(&backend, &confirm, &sink).await.unwrap();

    assert_eq!(
        outcome,
        Retrieval::Saved("/downloads/5e6f7a8b9c-tls-server.zip".into())
    );
    assert_eq!(gate.state(), &GateState::Consumed(secret()));
    assert_eq!(backend.retrieve_count(), 1);
    assert_eq!(confirm.prompts.lock().unwrap().as_slice(), [ONE_TIME_WARNING]);
    let saved = sink.saved.lock().unwrap();
    assert_eq!(saved[0].0, "5e6f7a8b9c-tls-server.zip");
    assert_eq!(saved[0].1, BUNDLE);
}

#[tokio::test]
async fn consumed_gate_makes_no_further_requests() {
    let backend = FakeBackend::default();
    let confirm = ScriptedConfirm::always_yes();
    let sink = MemorySink::default();
    let mut gate = DownloadGate::new();
    gate.arm(secret()).unwrap();
    gate.retrieve(&backend, &confirm, &sink).await.unwrap();

    let outcome = gate.retrieve(&backend, &confirm, &sink).await.unwrap();

    assert_eq!(outcome, Retrieval::AlreadyConsumed);
    assert_eq!(outcome.notice(), Some(KEY_DELETED_NOTICE));
    assert_eq!(backend.retrieve_count(), 1);
    assert_eq!(confirm.prompt_count(), 1);
    assert_eq!(sink.saved_names().len(), 1);
}

#[tokio::test]
async fn failed_retrieval_keeps_the_same_secret() {
    let backend = FakeBackend::with_retrieval_failures(2);
    let confirm = ScriptedConfirm::always_yes();
    let sink = MemorySink::default();
    let mut gate = DownloadGate::new();
    gate.arm(secret()).unwrap();

    for attempt in 1..=2 {
        let err = gate.retrieve(&backend, &confirm, &sink).await.unwrap_err();
        assert!(
            matches!(err, CertgateError::Retrieval(_)),
            "attempt {attempt}: expected Retrieval, got {err:?}"
        );
        assert_eq!(gate.state(), &GateState::Ready(secret()));
    }

    let outcome = gate.retrieve(&backend, &confirm, &sink).await.unwrap();
    assert!(matches!(outcome, Retrieval::Saved(_)));
    assert!(gate.is_consumed());
    assert_eq!(backend.retrieve_count(), 3);
    assert_eq!(backend.retrieved.lock().unwrap().as_slice(), [secret()]);
}

#[tokio::test]
async fn declining_keeps_the_gate_ready() {
    let backend = FakeBackend::default();
    let confirm = ScriptedConfirm::answering(&[false, true]);
    let sink = MemorySink::default();
    let mut gate = DownloadGate::new();
    gate.arm(secret()).unwrap();

    let outcome = gate.retrieve(&backend, &confirm, &sink).await.unwrap();
    assert_eq!(outcome, Retrieval::Declined);
    assert!(gate.is_ready());
    assert_eq!(backend.retrieve_count(), 0);

    let outcome = gate.retrieve(&backend, &confirm, &sink).await.unwrap();
    assert!(matches!(outcome, Retrieval::Saved(_)));
}

#[tokio::test]
async fn arming_replaces_an_unretrieved_secret() {
    let mut gate = DownloadGate::new();
    gate.arm(secret()).unwrap();

    let mut newer = secret();
    newer.certificate_id = "0000000000-tls-server".into();
    gate.arm(newer.clone()).unwrap();

    assert_eq!(gate.secret(), Some(&newer));
}

#[tokio::test]
async fn consumed_gate_cannot_be_rearmed() {
    let backend = FakeBackend::default();
    let mut gate = DownloadGate::new();
    gate.arm(secret()).unwrap();
    gate.retrieve(&backend, &ScriptedConfirm::always_yes(), &MemorySink::default())
        .await
        .unwrap();

    let err = gate.arm(secret()).unwrap_err();
    assert!(matches!(err, CertgateError::Form { .. }));
    assert!(gate.is_consumed());
}

#[tokio::test]
async fn save_failure_after_transfer_still_consumes() {
    let backend = FakeBackend::default();
    let sink = MemorySink::default();
    sink.fail.store(true, Ordering::SeqCst);
    let mut gate = DownloadGate::new();
    gate.arm(secret()).unwrap();

    let err = gate
        .retrieve(&backend, &ScriptedConfirm::always_yes(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, CertgateError::Save { .. }));
    assert!(gate.is_consumed());
}
