//! End-to-end runs against scripted host output and a recording transport

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hostinv_client::{DeliveryError, FormSubmission, Transport, TransportResponse};
use hostinv_core::{AgentConfig, ChangeDecision, ChangePolicy, Pipeline, PipelineError};
use hostinv_exec::ScriptedRunner;
use hostinv_pkg::dpkg::DPKG_QUERY;

const PACKAGES_V1: &str = "curl\t7.68.0\tinstall ok installed\n\
                           openssl\t1.1.1f-1ubuntu2\tinstall ok installed";
const PACKAGES_V2: &str = "curl\t7.68.0-1ubuntu2.21\tinstall ok installed\n\
                           openssl\t1.1.1f-1ubuntu2\tinstall ok installed";

#[derive(Default)]
struct RecordingTransport {
    forms: Mutex<Vec<FormSubmission>>,
}

impl RecordingTransport {
    fn count(&self) -> usize {
        self.forms.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn post_form(&self, form: FormSubmission) -> hostinv_client::Result<TransportResponse> {
        self.forms.lock().unwrap().push(form);
        Ok(TransportResponse {
            status: 200,
            body: "OK".to_string(),
        })
    }

    fn endpoint(&self) -> &str {
        "http://collector.test/"
    }
}

struct UnreachableTransport;

#[async_trait]
impl Transport for UnreachableTransport {
    async fn post_form(&self, _form: FormSubmission) -> hostinv_client::Result<TransportResponse> {
        Err(DeliveryError::Transport("connection refused".to_string()))
    }

    fn endpoint(&self) -> &str {
        "http://127.0.0.1:1/"
    }
}

fn config(dir: &Path) -> AgentConfig {
    let mut config = AgentConfig::default();
    config.agent.require_root = false;
    config.storage.dir = dir.to_path_buf();
    config.delivery.endpoint = "http://collector.test/".to_string();
    config.delivery.token = "token".to_string();
    config.delivery.server_id = "srv-1".to_string();
    config
}

fn host(packages: &str) -> Arc<ScriptedRunner> {
    Arc::new(
        ScriptedRunner::new()
            .with_output("id -u", "0")
            .with_output("hostname", "web01")
            .with_output(
                "cat /etc/os-release",
                "NAME=\"Ubuntu\"\nVERSION=\"20.04.6 LTS (Focal Fossa)\"\nID=ubuntu\nVERSION_ID=\"20.04\"",
            )
            .with_output("uname -r", "5.4.0-150-generic")
            .with_output("uname -m", "x86_64")
            .with_binary("dpkg")
            .with_output(DPKG_QUERY, packages)
            .with_output("apache2 -v", "Server version: Apache/2.4.41 (Ubuntu)"),
    )
}

#[tokio::test]
async fn test_first_run_delivers_and_records_fingerprint() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let transport = Arc::new(RecordingTransport::default());
    let pipeline = Pipeline::new(host(PACKAGES_V1), transport.clone(), &config);

    let report = pipeline.run().await.unwrap();

    assert_eq!(report.decision, ChangeDecision::SendFirstRun);
    assert_eq!(report.hostname, "web01");
    assert_eq!(report.total_packages(), 2);
    assert_eq!(report.software_detected, 1);
    assert_eq!(transport.count(), 1);
    assert!(pipeline.store().artifact_path().exists());
    assert_eq!(
        pipeline.store().load_fingerprint().unwrap(),
        Some(report.fingerprint)
    );
}

#[tokio::test]
async fn test_identical_second_run_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let transport = Arc::new(RecordingTransport::default());
    let first = Pipeline::new(host(PACKAGES_V1), transport.clone(), &config);
    first.run().await.unwrap();
    let artifact = std::fs::read(first.store().artifact_path()).unwrap();
    let fingerprint = std::fs::read(first.store().fingerprint_path()).unwrap();

    let second = Pipeline::new(host(PACKAGES_V1), transport.clone(), &config);
    let report = second.run().await.unwrap();

    assert_eq!(report.decision, ChangeDecision::SkipUnchanged);
    assert!(report.skipped());
    assert!(report.delivery.is_none());
    assert_eq!(transport.count(), 1);
    assert_eq!(std::fs::read(second.store().artifact_path()).unwrap(), artifact);
    assert_eq!(std::fs::read(second.store().fingerprint_path()).unwrap(), fingerprint);
}

#[tokio::test]
async fn test_changed_package_is_delivered() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let transport = Arc::new(RecordingTransport::default());
    let first = Pipeline::new(host(PACKAGES_V1), transport.clone(), &config)
        .run()
        .await
        .unwrap();

    let pipeline = Pipeline::new(host(PACKAGES_V2), transport.clone(), &config);
    let second = pipeline.run().await.unwrap();

    assert_eq!(second.decision, ChangeDecision::SendChanged);
    assert_ne!(second.fingerprint, first.fingerprint);
    assert_eq!(transport.count(), 2);
    assert_eq!(
        pipeline.store().load_fingerprint().unwrap(),
        Some(second.fingerprint)
    );
    let artifact = std::fs::read_to_string(pipeline.store().artifact_path()).unwrap();
    assert!(artifact.contains("7.68.0-1ubuntu2.21"));
}

#[tokio::test]
async fn test_unreachable_endpoint_keeps_artifact_and_retries() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let pipeline = Pipeline::new(host(PACKAGES_V1), Arc::new(UnreachableTransport), &config);

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::Delivery(_)));
    assert!(pipeline.store().artifact_path().exists());
    assert_eq!(pipeline.store().load_fingerprint().unwrap(), None);

    let transport = Arc::new(RecordingTransport::default());
    let retry = Pipeline::new(host(PACKAGES_V1), transport.clone(), &config)
        .run()
        .await
        .unwrap();
    assert_eq!(retry.decision, ChangeDecision::SendFirstRun);
    assert_eq!(transport.count(), 1);
}

#[tokio::test]
async fn test_forced_run_sends_unchanged_inventory() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let transport = Arc::new(RecordingTransport::default());
    Pipeline::new(host(PACKAGES_V1), transport.clone(), &config)
        .run()
        .await
        .unwrap();

    let report = Pipeline::new(host(PACKAGES_V1), transport.clone(), &config)
        .with_policy(ChangePolicy::AlwaysSend)
        .run()
        .await
        .unwrap();

    assert_eq!(report.decision, ChangeDecision::SendForced);
    assert_eq!(transport.count(), 2);
}

#[tokio::test]
async fn test_non_root_is_refused_before_collection() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path());
    config.agent.require_root = true;
    let runner = Arc::new(ScriptedRunner::new().with_output("id -u", "1000"));
    let transport = Arc::new(RecordingTransport::default());
    let pipeline = Pipeline::new(runner.clone(), transport.clone(), &config);

    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, PipelineError::NotRoot { ref uid } if uid == "1000"));
    assert_eq!(runner.calls(), vec!["id -u".to_string()]);
    assert_eq!(transport.count(), 0);
    assert!(!pipeline.store().artifact_path().exists());
}
