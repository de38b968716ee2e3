//! The GitHub Actions REST API, reduced to what a retrieval needs.
//!
//! See: [`ActionsApi`], [`GitHub`]

use std::{fmt::Debug, path::Path, time::Duration};

use futures::StreamExt as _;
use reqwest::{RequestBuilder, Response, StatusCode, header};
use serde::de::DeserializeOwned;
use tokio::{fs::File, io::AsyncWriteExt as _};
use tracing::{debug, error, info};

use crate::{
    error::{Error, Result},
    workflow::{
        Repository, WorkflowRun, WorkflowRuns,
        artifact::{Artifact, Artifacts},
    },
};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// The remote operations a retrieval performs.
///
/// Every call is awaited to completion before the next one starts.
pub trait ActionsApi: Sync {
    /// Lists the runs of a workflow, identified by its id or file name.
    fn list_workflow_runs(
        &self,
        repo: &Repository,
        workflow: &str,
    ) -> impl Future<Output = Result<Vec<WorkflowRun>>> + Send;

    /// Re-fetches a run by its own locator.
    fn get_run(&self, url: &str) -> impl Future<Output = Result<WorkflowRun>> + Send;

    /// Lists the artifacts at an artifacts locator.
    fn list_artifacts(&self, url: &str) -> impl Future<Output = Result<Vec<Artifact>>> + Send;

    /// Streams the archive of an artifact into a file at `path`, replacing any existing file.
    ///
    /// Returns the number of bytes written.
    fn download_artifact(
        &self,
        artifact: &Artifact,
        path: &Path,
    ) -> impl Future<Output = Result<u64>> + Send;
}

/// A GitHub REST API client authenticated with a bearer token.
#[derive(Clone)]
pub struct GitHub {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl Debug for GitHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHub")
            .field("api_url", &self.api_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl GitHub {
    /// Creates a client for the API at `api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn new<U, T>(api_url: U, token: T) -> Result<Self>
    where
        U: Into<String>,
        T: Into<String>,
    {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|err| Error::Config(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    /// Resolves a locator against the API base URL. Absolute URLs are returned as is.
    pub fn resolve(&self, url: &str) -> String {
        if url.starts_with("https://") || url.starts_with("http://") {
            url.to_owned()
        } else {
            format!("{}/{}", self.api_url, url.trim_start_matches('/'))
        }
    }

    /// Builds a request for GitHub REST API.
    fn request(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    async fn send(&self, url: &str) -> std::result::Result<Response, reqwest::Error> {
        self.request(url)
            .send()
            .await
            .and_then(Response::error_for_status)
    }

    async fn get_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.resolve(url);
        debug!("requesting {url}…");

        let response = self.send(&url).await.map_err(|err| {
            error!("failed to request {url}: {err}");
            Error::transport(&url, err)
        })?;

        response.json::<T>().await.map_err(|err| {
            error!("failed to parse data from {url}: {err}");
            Error::transport(&url, err)
        })
    }
}

async fn write_stream(response: Response, url: &str, path: &Path) -> Result<u64> {
    let io_error = |source| Error::Io {
        path: path.to_owned(),
        source,
    };

    let mut file = File::create(path).await.map_err(io_error)?;
    let mut stream = response.bytes_stream();
    let mut written = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| Error::transport(url, err))?;
        file.write_all(&chunk).await.map_err(io_error)?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(io_error)?;

    Ok(written)
}

impl ActionsApi for GitHub {
    async fn list_workflow_runs(
        &self,
        repo: &Repository,
        workflow: &str,
    ) -> Result<Vec<WorkflowRun>> {
        let url = format!(
            "repos/{}/{}/actions/workflows/{workflow}/runs",
            repo.owner, repo.name
        );
        let runs: WorkflowRuns = self.get_json(&url).await?;
        debug!(
            "fetched {} of {} runs of {workflow} in {repo}",
            runs.workflow_runs.len(),
            runs.total_count
        );
        Ok(runs.workflow_runs)
    }

    async fn get_run(&self, url: &str) -> Result<WorkflowRun> {
        self.get_json(url).await
    }

    async fn list_artifacts(&self, url: &str) -> Result<Vec<Artifact>> {
        let artifacts: Artifacts = self.get_json(url).await?;
        Ok(artifacts.artifacts)
    }

    async fn download_artifact(&self, artifact: &Artifact, path: &Path) -> Result<u64> {
        let url = self.resolve(&artifact.archive_download_url);
        debug!("requesting download from {url}…");

        let response = match self.send(&url).await {
            Ok(response) => response,
            Err(err) => {
                return match err.status() {
                    Some(StatusCode::GONE) => {
                        error!("failed to request download: artifact {artifact} expired or removed");
                        Err(Error::ArtifactExpired {
                            name: artifact.name.clone(),
                        })
                    }
                    _ => {
                        error!("failed to request download from {url}: {err}");
                        Err(Error::transport(&url, err))
                    }
                };
            }
        };
        info!("requested download from {url}");

        match write_stream(response, &url, path).await {
            Ok(written) => Ok(written),
            Err(err) => {
                error!("failed to download {artifact} to {}: {err}", path.display());
                drop(tokio::fs::remove_file(path).await);
                Err(err)
            }
        }
    }
}
