//! Integration tests for the `unarya` command.
//!
//! Commands that need a server run against one started in-process on an
//! ephemeral port.

use std::fs;
use std::net::SocketAddr;
use std::sync::Arc;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;
use unarya_core::{Config, HandlerTable, InferenceEngine, ModelServer};

async fn start_server() -> (ModelServer, SocketAddr) {
    let mut config = Config::default();
    config.server.address = "127.0.0.1:0".parse().unwrap();
    let engine = Arc::new(InferenceEngine::new(HandlerTable::builtin().unwrap(), config.cache.ttl()));
    let mut server = ModelServer::new(config, engine);
    let addr = server.start().await.unwrap();
    (server, addr)
}

fn unarya(addr: SocketAddr) -> Command {
    let mut cmd = Command::cargo_bin("unarya").unwrap();
    cmd.env("NO_COLOR", "1").arg("--server").arg(format!("http://{addr}"));
    cmd
}

fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("unarya").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("infer"))
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("health"))
        .stdout(predicate::str::contains("metrics"));
}

#[test]
fn test_analyze_requires_code_or_file() {
    let mut cmd = Command::cargo_bin("unarya").unwrap();
    cmd.args(["analyze", "--language", "python"]).assert().failure();
}

#[test]
fn test_health_fails_without_server() {
    let mut cmd = Command::cargo_bin("unarya").unwrap();
    cmd.arg("--server")
        .arg(format!("http://127.0.0.1:{}", unused_port()))
        .args(["--timeout", "1", "health"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to connect"));
}

#[test]
fn test_infer_rejects_non_object_payload() {
    let mut cmd = Command::cargo_bin("unarya").unwrap();
    cmd.args(["infer", "classify", "--payload", "[1, 2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Payload must be a JSON object"));
}

#[test]
fn test_batch_rejects_invalid_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("batch.json");
    fs::write(&path, "not json").unwrap();

    let mut cmd = Command::cargo_bin("unarya").unwrap();
    cmd.arg("batch")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid batch file"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_health_against_live_server() {
    let (mut server, addr) = start_server().await;

    let stdout = tokio::task::spawn_blocking(move || {
        unarya(addr).args(["health", "--json"]).assert().success().get_output().stdout.clone()
    })
    .await
    .unwrap();

    let output: Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(output["status"], "SERVING");

    server.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_infer_against_live_server() {
    let (mut server, addr) = start_server().await;

    let stdout = tokio::task::spawn_blocking(move || {
        unarya(addr)
            .args(["infer", "preprocess", "--payload", r#"{"code": "x = x + 1"}"#, "--json"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    })
    .await
    .unwrap();

    let output: Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(output["success"], true);
    assert_eq!(output["output"], serde_json::json!([1, 2, 1, 3, 4]));

    server.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_infer_unknown_operation_fails() {
    let (mut server, addr) = start_server().await;

    tokio::task::spawn_blocking(move || {
        unarya(addr)
            .args(["infer", "bogus"])
            .assert()
            .failure()
            .stdout(predicate::str::contains("Unknown op: bogus"));
    })
    .await
    .unwrap();

    server.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_batch_against_live_server() {
    let (mut server, addr) = start_server().await;
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("batch.json");
    fs::write(&path, r#"[{"operation": "health"}, {"operation": "bogus", "payload": {}}]"#).unwrap();

    let stdout = tokio::task::spawn_blocking(move || {
        unarya(addr).arg("batch").arg(&path).arg("--json").assert().success().get_output().stdout.clone()
    })
    .await
    .unwrap();

    let output: Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(output["total"], 2);
    assert_eq!(output["succeeded"], 1);
    assert_eq!(output["results"][1]["message"], "Unknown op: bogus");

    server.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_analyze_and_metrics_against_live_server() {
    let (mut server, addr) = start_server().await;

    let stdout = tokio::task::spawn_blocking(move || {
        unarya(addr)
            .args(["analyze", "--language", "python", "--code", "import flask\nprint('hi')"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Code Analysis"));
        unarya(addr).args(["metrics", "--json"]).assert().success().get_output().stdout.clone()
    })
    .await
    .unwrap();

    let output: Value = serde_json::from_slice(&stdout).unwrap();
    assert_eq!(output["request_count"], 1);
    assert_eq!(output["cache_entries"], 1);

    server.shutdown().await.unwrap();
}
