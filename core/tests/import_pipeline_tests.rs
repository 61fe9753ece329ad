// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use terrarium_core::application::ImportService;
use terrarium_core::domain::config::ImportConfig;
use terrarium_core::domain::credentials::{DecryptedContent, KeySource, NormalizedSecretPayload};
use terrarium_core::domain::errors::{DecryptionError, ImportError, ParseError, PreconditionError, StoreError};
use terrarium_core::domain::key_schema::KeySchema;
use terrarium_core::domain::outcome::{ImportSummary, RegistrationOutcome};
use terrarium_core::domain::ports::{PassphrasePrompt, SealStatus, SecretPath, SecretStore};
use terrarium_core::infrastructure::bundle_cipher::encrypt_with_salt;

const PASSPHRASE: &str = "correct horse battery staple";

#[derive(Default)]
struct FakeStore {
    status: Option<SealStatus>,
    failing: HashSet<String>,
    writes: Mutex<Vec<(String, Value)>>,
}

impl FakeStore {
    fn ready() -> Self {
        Self {
            status: Some(SealStatus { initialized: true, sealed: false }),
            ..Default::default()
        }
    }

    fn with_status(status: Option<SealStatus>) -> Self {
        Self { status, ..Default::default() }
    }

    fn failing_for(mut self, path: &str) -> Self {
        self.failing.insert(path.to_string());
        self
    }

    fn writes(&self) -> Vec<(String, Value)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretStore for FakeStore {
    async fn seal_status(&self) -> Result<SealStatus, StoreError> {
        self.status
            .ok_or_else(|| StoreError::Transport("connection refused".to_string()))
    }

    async fn write_secret(
        &self,
        path: &SecretPath,
        payload: &NormalizedSecretPayload,
    ) -> Result<Option<u64>, StoreError> {
        let rendered = path.to_string();
        if self.failing.contains(&rendered) {
            return Err(StoreError::Transport(format!(
                "error sending request for url (http://127.0.0.1:8200/v1/{}): connection refused",
                path.data_path()
            )));
        }
        let mut writes = self.writes.lock().unwrap();
        writes.push((rendered, serde_json::to_value(payload).unwrap()));
        Ok(Some(writes.len() as u64))
    }
}

struct ScriptedPrompt {
    answers: Mutex<Vec<String>>,
    calls: Mutex<u32>,
    threads: Mutex<Vec<ThreadId>>,
}

impl ScriptedPrompt {
    fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().rev().map(|s| s.to_string()).collect()),
            calls: Mutex::new(0),
            threads: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> u32 {
        *self.calls.lock().unwrap()
    }

    fn threads(&self) -> Vec<ThreadId> {
        self.threads.lock().unwrap().clone()
    }
}

impl PassphrasePrompt for ScriptedPrompt {
    fn read_passphrase(&self, _attempt: u32, _max_attempts: u32) -> anyhow::Result<String> {
        *self.calls.lock().unwrap() += 1;
        self.threads.lock().unwrap().push(std::thread::current().id());
        self.answers
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| anyhow::anyhow!("stdin closed"))
    }
}

fn config_in(dir: &Path) -> ImportConfig {
    let mut config = ImportConfig::default();
    config.store.token = Some("s.test-token".to_string());
    config.credentials.bundle_path = dir.join("credentials.yaml.enc");
    config.credentials.default_key_file = dir.join(".tmp_enc_key");
    config
}

fn write_bundle(dir: &Path, yaml: &str) {
    std::fs::write(
        dir.join("credentials.yaml.enc"),
        encrypt_with_salt(yaml, PASSPHRASE, *b"terrarum"),
    )
    .unwrap();
}

fn service(config: ImportConfig, store: Arc<FakeStore>, prompt: Arc<ScriptedPrompt>) -> ImportService {
    ImportService::new(Arc::new(config), KeySchema::builtin(), store, prompt)
}

fn completed(summary: ImportSummary) -> terrarium_core::domain::outcome::ImportReport {
    match summary {
        ImportSummary::Completed(report) => report,
        ImportSummary::BundleMissing(path) => panic!("bundle unexpectedly missing: {:?}", path),
    }
}

const MIXED_BUNDLE: &str = r#"
credentialholder:
  admin:
    aws:
      ClientId: "A"
      ClientSecret: "B"
    gcp:
      ProjectID: ""
      ClientEmail: ""
      PrivateKey: ""
    azure:
      ClientId: "az-id"
      ClientSecret: "az-secret"
      TenantId: "az-tenant"
      SubscriptionId: ""
    nhn:
      Username: "nhn-user"
      Password: "nhn-pass"
"#;

#[tokio::test]
async fn test_aws_scenario_registers_normalized_payload() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(
        dir.path(),
        "credentialholder:\n  admin:\n    aws:\n      ClientId: \"A\"\n      ClientSecret: \"B\"\n",
    );
    std::fs::write(dir.path().join(".tmp_enc_key"), format!("{}\n", PASSPHRASE)).unwrap();

    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&[]));
    let report = completed(service(config_in(dir.path()), store.clone(), prompt.clone()).run().await.unwrap());

    assert_eq!(
        report.outcome_for("aws"),
        Some(&RegistrationOutcome::Ok {
            version: Some(1),
            mapped_keys: vec!["AWS_ACCESS_KEY_ID".into(), "AWS_SECRET_ACCESS_KEY".into()],
        })
    );
    assert_eq!(
        store.writes(),
        vec![(
            "secret/csp/aws".to_string(),
            json!({"AWS_ACCESS_KEY_ID": "A", "AWS_SECRET_ACCESS_KEY": "B"})
        )]
    );
    assert_eq!(prompt.calls(), 0);
}

#[tokio::test]
async fn test_one_outcome_per_provider_in_document_order() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), MIXED_BUNDLE);

    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&[PASSPHRASE]));
    let report = completed(service(config_in(dir.path()), store.clone(), prompt).run().await.unwrap());

    let providers: Vec<&str> = report.outcomes().iter().map(|o| o.provider.as_str()).collect();
    assert_eq!(providers, vec!["aws", "gcp", "azure", "nhn"]);

    let tally = report.tally();
    assert_eq!(tally.registered, 3);
    assert_eq!(tally.skipped, 1);
    assert_eq!(tally.failed, 0);
    assert_eq!(tally.total(), 4);
    assert!(!report.has_failures());

    match report.outcome_for("azure").unwrap() {
        RegistrationOutcome::Ok { mapped_keys, .. } => {
            assert_eq!(mapped_keys, &vec!["ARM_CLIENT_ID", "ARM_CLIENT_SECRET", "ARM_TENANT_ID"]);
        }
        other => panic!("unexpected azure outcome: {other:?}"),
    }
    match report.outcome_for("nhn").unwrap() {
        RegistrationOutcome::Ok { mapped_keys, .. } => {
            assert_eq!(mapped_keys, &vec!["Username", "Password"]);
        }
        other => panic!("unexpected nhn outcome: {other:?}"),
    }
}

#[tokio::test]
async fn test_all_empty_provider_is_skipped_without_write() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), MIXED_BUNDLE);

    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&[PASSPHRASE]));
    let report = completed(service(config_in(dir.path()), store.clone(), prompt).run().await.unwrap());

    assert_eq!(
        report.outcome_for("gcp"),
        Some(&RegistrationOutcome::Skip { reason: "No credential values".to_string() })
    );
    assert!(store.writes().iter().all(|(path, _)| path != "secret/csp/gcp"));
}

#[tokio::test]
async fn test_write_failure_does_not_stop_later_providers() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), MIXED_BUNDLE);

    let store = Arc::new(FakeStore::ready().failing_for("secret/csp/aws"));
    let prompt = Arc::new(ScriptedPrompt::new(&[PASSPHRASE]));
    let report = completed(service(config_in(dir.path()), store.clone(), prompt).run().await.unwrap());

    match report.outcome_for("aws").unwrap() {
        RegistrationOutcome::Fail { error } => assert!(error.contains("connection refused")),
        other => panic!("unexpected aws outcome: {other:?}"),
    }
    assert!(matches!(report.outcome_for("azure"), Some(RegistrationOutcome::Ok { .. })));
    assert!(matches!(report.outcome_for("nhn"), Some(RegistrationOutcome::Ok { .. })));
    assert!(report.has_failures());
    assert_eq!(report.tally().failed, 1);
    assert_eq!(report.tally().total(), 4);
    assert_eq!(store.writes().len(), 2);
}

#[tokio::test]
async fn test_three_wrong_passphrases_abort_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), MIXED_BUNDLE);

    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&["wrong-1", "wrong-2", "wrong-3"]));
    let err = service(config_in(dir.path()), store.clone(), prompt.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Decryption(DecryptionError::Exhausted { attempts: 3 })));
    assert_eq!(prompt.calls(), 3);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_stale_key_file_recovers_at_prompt() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), MIXED_BUNDLE);
    std::fs::write(dir.path().join(".tmp_enc_key"), "rotated-away").unwrap();

    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&[PASSPHRASE]));
    let report = completed(service(config_in(dir.path()), store, prompt.clone()).run().await.unwrap());

    assert_eq!(prompt.calls(), 1);
    assert_eq!(report.tally().total(), 4);
}

#[tokio::test]
async fn test_passphrase_prompt_runs_off_the_runtime_thread() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), MIXED_BUNDLE);

    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&["wrong", PASSPHRASE]));
    let report = completed(service(config_in(dir.path()), store, prompt.clone()).run().await.unwrap());

    assert_eq!(report.tally().total(), 4);
    // current_thread runtime: the test body owns the only worker
    let runtime_thread = std::thread::current().id();
    let threads = prompt.threads();
    assert_eq!(threads.len(), 2);
    assert!(threads.iter().all(|id| *id != runtime_thread));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_decrypt_on_multi_thread_runtime() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), MIXED_BUNDLE);

    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&[PASSPHRASE]));
    let svc = service(config_in(dir.path()), store.clone(), prompt.clone());

    let content = svc.decrypt().await.unwrap();
    assert_eq!(content.key_source(), &KeySource::Prompt { attempt: 1 });

    let report = svc.register_content(content).await.unwrap();
    assert_eq!(report.tally().total(), 4);
    assert_eq!(store.writes().len(), 3);
    assert_eq!(prompt.calls(), 1);
}

#[tokio::test]
async fn test_missing_bundle_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&[]));
    let config = config_in(dir.path());
    let expected = config.credentials.bundle_path.clone();

    let summary = service(config, store.clone(), prompt.clone()).run().await.unwrap();
    assert_eq!(summary, ImportSummary::BundleMissing(expected));
    assert_eq!(prompt.calls(), 0);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_parse_error_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), "credentialholder:\n  user:\n    aws: {}\n");

    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&[PASSPHRASE]));
    let err = service(config_in(dir.path()), store.clone(), prompt).run().await.unwrap_err();

    assert!(matches!(err, ImportError::Parse(ParseError::MissingSection(_))));
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_missing_token_is_checked_before_bundle() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path(), MIXED_BUNDLE);
    let mut config = config_in(dir.path());
    config.store.token = None;

    let prompt = Arc::new(ScriptedPrompt::new(&[PASSPHRASE]));
    let err = service(config, Arc::new(FakeStore::ready()), prompt.clone())
        .run()
        .await
        .unwrap_err();

    assert!(matches!(err, ImportError::Precondition(PreconditionError::MissingToken)));
    assert_eq!(prompt.calls(), 0);
}

#[tokio::test]
async fn test_store_state_preconditions() {
    let cases = [
        (None, "unreachable"),
        (Some(SealStatus { initialized: false, sealed: true }), "uninitialized"),
        (Some(SealStatus { initialized: true, sealed: true }), "sealed"),
    ];

    for (status, label) in cases {
        let dir = tempfile::tempdir().unwrap();
        write_bundle(dir.path(), MIXED_BUNDLE);
        let prompt = Arc::new(ScriptedPrompt::new(&[PASSPHRASE]));
        let err = service(config_in(dir.path()), Arc::new(FakeStore::with_status(status)), prompt.clone())
            .run()
            .await
            .unwrap_err();

        let matched = match (&err, label) {
            (ImportError::Precondition(PreconditionError::Unreachable { .. }), "unreachable") => true,
            (ImportError::Precondition(PreconditionError::Uninitialized), "uninitialized") => true,
            (ImportError::Precondition(PreconditionError::Sealed), "sealed") => true,
            _ => false,
        };
        assert!(matched, "{}: unexpected error {:?}", label, err);
        assert_eq!(prompt.calls(), 0, "{}: bundle must not be touched", label);
    }
}

#[tokio::test]
async fn test_rerun_creates_new_versions() {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(
        dir.path(),
        "credentialholder:\n  admin:\n    ibm:\n      ApiKey: \"ibm-key\"\n",
    );
    std::fs::write(dir.path().join(".tmp_enc_key"), PASSPHRASE).unwrap();

    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&[]));
    let service = service(config_in(dir.path()), store.clone(), prompt);

    let first = completed(service.run().await.unwrap());
    let second = completed(service.run().await.unwrap());

    assert!(matches!(first.outcome_for("ibm"), Some(RegistrationOutcome::Ok { version: Some(1), .. })));
    assert!(matches!(second.outcome_for("ibm"), Some(RegistrationOutcome::Ok { version: Some(2), .. })));
    assert_eq!(store.writes()[1].1, json!({"IC_API_KEY": "ibm-key"}));
}

#[tokio::test]
async fn test_requires_prompt_reflects_key_files() {
    let dir = tempfile::tempdir().unwrap();
    let prompt = Arc::new(ScriptedPrompt::new(&[]));
    let svc = service(config_in(dir.path()), Arc::new(FakeStore::ready()), prompt.clone());
    assert!(!svc.requires_prompt(), "no bundle, nothing to prompt for");

    write_bundle(dir.path(), MIXED_BUNDLE);
    assert!(svc.requires_prompt());

    std::fs::write(dir.path().join(".tmp_enc_key"), PASSPHRASE).unwrap();
    assert!(!svc.requires_prompt());
}

#[tokio::test]
async fn test_register_content_decrypted_ahead_of_time() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FakeStore::ready());
    let prompt = Arc::new(ScriptedPrompt::new(&[]));
    let svc = service(config_in(dir.path()), store.clone(), prompt.clone());

    let content = DecryptedContent::new(MIXED_BUNDLE.to_string(), KeySource::Prompt { attempt: 1 });
    let report = svc.register_content(content).await.unwrap();

    assert_eq!(report.tally().total(), 4);
    assert_eq!(store.writes().len(), 3);
    assert_eq!(prompt.calls(), 0);
}
