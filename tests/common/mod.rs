#![allow(dead_code)]

use std::time::Duration;

use packaged_release::{
    RetrievalRequest,
    github::GitHub,
    workflow::{Repository, WorkflowRun},
};
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

pub const TOKEN: &str = "test-token";
pub const RUNS_PATH: &str = "/repos/octo-org/sandbox/actions/workflows/ci-deploy.yaml/runs";
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub fn repo() -> Repository {
    "octo-org/sandbox".parse().unwrap()
}

pub fn client(server: &MockServer) -> GitHub {
    GitHub::new(server.uri(), TOKEN).unwrap()
}

pub fn request(sha: &str, output_dir: &std::path::Path) -> RetrievalRequest {
    RetrievalRequest::new(sha, repo(), output_dir, POLL_INTERVAL)
}

pub fn run_path(id: u64) -> String {
    format!("/repos/octo-org/sandbox/actions/runs/{id}")
}

pub fn artifacts_path(id: u64) -> String {
    format!("{}/artifacts", run_path(id))
}

pub fn run_json(
    server: &MockServer,
    id: u64,
    head_sha: &str,
    status: &str,
    conclusion: Option<&str>,
) -> Value {
    json!({
        "id": id,
        "name": "Deploy",
        "head_branch": "main",
        "head_sha": head_sha,
        "status": status,
        "conclusion": conclusion,
        "url": format!("{}{}", server.uri(), run_path(id)),
        "html_url": format!("https://github.com/octo-org/sandbox/actions/runs/{id}"),
        "artifacts_url": format!("{}{}", server.uri(), artifacts_path(id)),
    })
}

pub fn run(
    server: &MockServer,
    id: u64,
    head_sha: &str,
    status: &str,
    conclusion: Option<&str>,
) -> WorkflowRun {
    serde_json::from_value(run_json(server, id, head_sha, status, conclusion)).unwrap()
}

pub fn artifact_json(server: &MockServer, id: u64, name: &str, size_in_bytes: u64) -> Value {
    json!({
        "id": id,
        "node_id": format!("MDg6QXJ0aWZhY3Q{id}"),
        "name": name,
        "size_in_bytes": size_in_bytes,
        "url": format!("{}/repos/octo-org/sandbox/actions/artifacts/{id}", server.uri()),
        "archive_download_url": format!("{}/download/{name}", server.uri()),
        "expired": false,
    })
}

pub async fn mount_runs(server: &MockServer, runs: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(RUNS_PATH))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": runs.len(),
            "workflow_runs": runs,
        })))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_artifacts(server: &MockServer, id: u64, artifacts: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(artifacts_path(id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_count": artifacts.len(),
            "artifacts": artifacts,
        })))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_download(server: &MockServer, name: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{name}")))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}
