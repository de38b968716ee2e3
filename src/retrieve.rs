//! Retrieves the packaged release of a commit, end to end.

use std::{path::PathBuf, time::Duration};

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    error::{Error, Result},
    framework::until_cancelled,
    github::ActionsApi,
    transactions::{
        WaitOptions, download_artifacts, locate_run, validate_outcome, wait_for_completion,
    },
    workflow::Repository,
};

/// The workflow file whose runs produce packaged releases.
pub const DEFAULT_WORKFLOW: &str = "ci-deploy.yaml";

/// What to retrieve and where to put it. Fixed for the lifetime of one retrieval.
#[derive(Debug, Clone)]
pub struct RetrievalRequest {
    /// A prefix of the commit hash to retrieve the release of.
    pub sha: String,
    /// The repository the deploy workflow runs in.
    pub repo: Repository,
    /// The deploy workflow, by file name or id.
    pub workflow: String,
    /// The directory archives are saved to.
    pub output_dir: PathBuf,
    /// How the run is polled until it completes.
    pub wait: WaitOptions,
}

impl RetrievalRequest {
    /// Creates a request for the default deploy workflow.
    ///
    /// Archives are saved to `output_dir` and the run is polled every `poll_interval`.
    pub fn new<S, P>(sha: S, repo: Repository, output_dir: P, poll_interval: Duration) -> Self
    where
        S: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            sha: sha.into(),
            repo,
            workflow: DEFAULT_WORKFLOW.to_owned(),
            output_dir: output_dir.into(),
            wait: WaitOptions {
                poll_interval,
                ..WaitOptions::default()
            },
        }
    }
}

/// Retrieves every artifact of the deploy run of the requested commit.
///
/// Locates the run, waits for it, checks that it succeeded, and downloads all of its artifacts.
/// Returns the paths of the saved archives in listing order. Every request is abandoned as soon as
/// `cancel` fires.
///
/// # Errors
///
/// Returns the error of the first stage that fails, or [`Error::Cancelled`] once `cancel` fires.
/// Nothing is retried except transient polling failures within [`WaitOptions::max_retries`].
pub async fn retrieve<C>(
    client: &C,
    request: &RetrievalRequest,
    cancel: &CancellationToken,
) -> Result<Vec<PathBuf>>
where
    C: ActionsApi,
{
    if request.sha.is_empty() {
        return Err(Error::Config("the commit hash must not be empty".to_owned()));
    }
    if request.wait.poll_interval.is_zero() {
        return Err(Error::Config("the poll interval must not be zero".to_owned()));
    }

    info!(
        "retrieving packaged release of {} from {}…",
        request.sha, request.repo
    );

    let run = until_cancelled(
        cancel,
        locate_run(client, &request.repo, &request.workflow, &request.sha),
    )
    .await?;
    let run = wait_for_completion(client, run, &request.wait, cancel).await?;
    let run = validate_outcome(run)?;
    let paths = download_artifacts(client, &run, &request.output_dir, cancel).await?;

    match paths.len() {
        1 => info!("retrieved 1 artifact to {}", request.output_dir.display()),
        count => info!(
            "retrieved {count} artifacts to {}",
            request.output_dir.display()
        ),
    }
    Ok(paths)
}
