mod common;

use std::{
    fs,
    time::{Duration, Instant},
};

use packaged_release::{Error, retrieve};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use common::*;

const SHA: &str = "4f2a9c1e0b7d";

#[tokio::test]
async fn fails_when_no_run_matches() {
    let server = MockServer::start().await;
    let runs = vec![run_json(&server, 1, "aaaa1111", "completed", Some("success"))];
    mount_runs(&server, runs).await;

    let dir = TempDir::new().unwrap();
    let result = retrieve(
        &client(&server),
        &request("4f2a", dir.path()),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(Error::NotFound { sha }) if sha == "4f2a"));
}

#[tokio::test]
async fn fails_when_several_runs_match() {
    let server = MockServer::start().await;
    let runs = vec![
        run_json(&server, 1, "4f2a9c1e0b7d", "completed", Some("success")),
        run_json(&server, 2, "4f2a0000ffff", "completed", Some("success")),
        run_json(&server, 3, "ffff4f2a0000", "completed", Some("success")),
    ];
    mount_runs(&server, runs).await;

    let dir = TempDir::new().unwrap();
    let result = retrieve(
        &client(&server),
        &request("4f2a", dir.path()),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(Error::AmbiguousMatch { count: 2, .. })));
}

#[tokio::test]
async fn failed_run_lists_no_artifacts() {
    let server = MockServer::start().await;
    mount_runs(
        &server,
        vec![run_json(&server, 7, SHA, "completed", Some("failure"))],
    )
    .await;
    Mock::given(method("GET"))
        .and(path(artifacts_path(7)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let result = retrieve(
        &client(&server),
        &request(SHA, dir.path()),
        &CancellationToken::new(),
    )
    .await;

    match result {
        Err(Error::WorkflowFailed { run_id, conclusion }) => {
            assert_eq!(run_id, 7);
            assert_eq!(conclusion.to_string(), "failure");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn successful_run_without_artifacts() {
    let server = MockServer::start().await;
    mount_runs(
        &server,
        vec![run_json(&server, 7, SHA, "completed", Some("success"))],
    )
    .await;
    mount_artifacts(&server, 7, vec![]).await;

    let dir = TempDir::new().unwrap();
    let result = retrieve(
        &client(&server),
        &request(SHA, dir.path()),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(Error::NoArtifacts { run_id: 7 })));
}

#[tokio::test]
async fn downloads_every_artifact() {
    let server = MockServer::start().await;
    mount_runs(
        &server,
        vec![
            run_json(&server, 6, "0000aaaa", "completed", Some("success")),
            run_json(&server, 7, SHA, "completed", Some("success")),
        ],
    )
    .await;
    mount_artifacts(
        &server,
        7,
        vec![
            artifact_json(&server, 11, "a", 1_048_576),
            artifact_json(&server, 12, "b", 2_097_152),
        ],
    )
    .await;
    mount_download(
        &server,
        "a",
        ResponseTemplate::new(200).set_body_bytes(b"archive a".to_vec()),
    )
    .await;
    mount_download(
        &server,
        "b",
        ResponseTemplate::new(200).set_body_bytes(b"archive b".to_vec()),
    )
    .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.zip"), "stale archive from an earlier release").unwrap();

    let paths = retrieve(
        &client(&server),
        &request("4f2a9c", dir.path()),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(
        paths,
        vec![dir.path().join("a.zip"), dir.path().join("b.zip")]
    );
    assert_eq!(fs::read(dir.path().join("a.zip")).unwrap(), b"archive a");
    assert_eq!(fs::read(dir.path().join("b.zip")).unwrap(), b"archive b");
}

#[tokio::test]
async fn failed_download_keeps_earlier_archives() {
    let server = MockServer::start().await;
    mount_runs(
        &server,
        vec![run_json(&server, 7, SHA, "completed", Some("success"))],
    )
    .await;
    mount_artifacts(
        &server,
        7,
        vec![
            artifact_json(&server, 11, "a", 1_048_576),
            artifact_json(&server, 12, "b", 2_097_152),
        ],
    )
    .await;
    mount_download(
        &server,
        "a",
        ResponseTemplate::new(200).set_body_bytes(b"archive a".to_vec()),
    )
    .await;
    mount_download(&server, "b", ResponseTemplate::new(500)).await;

    let dir = TempDir::new().unwrap();
    let result = retrieve(
        &client(&server),
        &request(SHA, dir.path()),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(Error::Transport { .. })));
    assert_eq!(fs::read(dir.path().join("a.zip")).unwrap(), b"archive a");
    assert!(!dir.path().join("b.zip").exists());
}

#[tokio::test]
async fn expired_artifact_aborts() {
    let server = MockServer::start().await;
    mount_runs(
        &server,
        vec![run_json(&server, 7, SHA, "completed", Some("success"))],
    )
    .await;
    mount_artifacts(&server, 7, vec![artifact_json(&server, 11, "a", 512)]).await;
    mount_download(&server, "a", ResponseTemplate::new(410)).await;

    let dir = TempDir::new().unwrap();
    let result = retrieve(
        &client(&server),
        &request(SHA, dir.path()),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(Error::ArtifactExpired { name }) if name == "a"));
}

#[tokio::test]
async fn creates_the_output_directory() {
    let server = MockServer::start().await;
    mount_runs(
        &server,
        vec![run_json(&server, 7, SHA, "completed", Some("success"))],
    )
    .await;
    mount_artifacts(&server, 7, vec![artifact_json(&server, 11, "web", 3)]).await;
    mount_download(
        &server,
        "web",
        ResponseTemplate::new(200).set_body_bytes(b"zip".to_vec()),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let output_dir = dir.path().join("release").join("artifacts");
    let paths = retrieve(
        &client(&server),
        &request(SHA, &output_dir),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(paths, vec![output_dir.join("web.zip")]);
    assert_eq!(fs::read(output_dir.join("web.zip")).unwrap(), b"zip");
}

#[tokio::test]
async fn rejects_an_empty_commit_hash() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let result = retrieve(
        &client(&server),
        &request("", dir.path()),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(Error::Config(_))));
}

#[tokio::test]
async fn transport_failure_while_listing_runs() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let result = retrieve(
        &client(&server),
        &request(SHA, dir.path()),
        &CancellationToken::new(),
    )
    .await;

    match result {
        Err(err @ Error::Transport { .. }) => {
            assert!(!err.is_transient());
            assert_eq!(err.exit_code(), 1);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

async fn mount_unreachable(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn cancelled_retrieval_downloads_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "total_count": 1,
            "workflow_runs": [run_json(&server, 7, SHA, "completed", Some("success"))],
        })))
        .expect(0)
        .mount(&server)
        .await;
    mount_unreachable(&server, &artifacts_path(7)).await;
    mount_unreachable(&server, "/download/a").await;
    mount_unreachable(&server, "/download/b").await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let dir = TempDir::new().unwrap();
    let result = retrieve(&client(&server), &request(SHA, dir.path()), &cancel).await;

    match result {
        Err(err @ Error::Cancelled) => assert_eq!(err.exit_code(), 130),
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(!dir.path().join("a.zip").exists());
    assert!(!dir.path().join("b.zip").exists());
}

#[tokio::test]
async fn cancellation_interrupts_a_download() {
    let server = MockServer::start().await;
    mount_runs(
        &server,
        vec![run_json(&server, 7, SHA, "completed", Some("success"))],
    )
    .await;
    mount_artifacts(
        &server,
        7,
        vec![
            artifact_json(&server, 11, "a", 1_048_576),
            artifact_json(&server, 12, "b", 2_097_152),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/download/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"archive a".to_vec())
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;
    mount_unreachable(&server, "/download/b").await;

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let dir = TempDir::new().unwrap();
    let started = Instant::now();
    let result = retrieve(&client(&server), &request(SHA, dir.path()), &cancel).await;

    assert!(matches!(result, Err(Error::Cancelled)));
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(!dir.path().join("a.zip").exists());
    assert!(!dir.path().join("b.zip").exists());
}

#[tokio::test]
async fn rejects_artifact_names_that_collide() {
    let server = MockServer::start().await;
    mount_runs(
        &server,
        vec![run_json(&server, 7, SHA, "completed", Some("success"))],
    )
    .await;
    mount_artifacts(
        &server,
        7,
        vec![
            artifact_json(&server, 11, "ab", 512),
            artifact_json(&server, 12, "a/b", 512),
        ],
    )
    .await;
    mount_unreachable(&server, "/download/ab").await;

    let dir = TempDir::new().unwrap();
    let result = retrieve(
        &client(&server),
        &request(SHA, dir.path()),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(Error::Config(_))));
    assert!(!dir.path().join("ab.zip").exists());
}

#[tokio::test]
async fn rejects_an_artifact_without_a_usable_name() {
    let server = MockServer::start().await;
    mount_runs(
        &server,
        vec![run_json(&server, 7, SHA, "completed", Some("success"))],
    )
    .await;
    mount_artifacts(&server, 7, vec![artifact_json(&server, 11, "..", 512)]).await;

    let dir = TempDir::new().unwrap();
    let result = retrieve(
        &client(&server),
        &request(SHA, dir.path()),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(Error::Config(_))));
    assert!(!dir.path().join(".zip").exists());
}
