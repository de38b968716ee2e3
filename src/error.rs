//! Errors that end a retrieval.

use std::{path::PathBuf, time::Duration};

use thiserror::Error;

use crate::workflow::Conclusion;

/// Result type alias for retrievals.
pub type Result<T> = std::result::Result<T, Error>;

/// Every condition that aborts a retrieval. None of them is recovered from inside the crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// No deploy run matches the commit. The commit may not have reached CI yet.
    #[error("could not find a deploy run for commit {sha}")]
    NotFound {
        /// The requested commit hash prefix.
        sha: String,
    },

    /// More than one deploy run matches the commit.
    #[error("found {count} deploy runs for commit {sha}")]
    AmbiguousMatch {
        /// The requested commit hash prefix.
        sha: String,
        /// The number of matching runs.
        count: usize,
    },

    /// The run completed without succeeding.
    #[error("workflow run {run_id} finished with conclusion \"{conclusion}\"")]
    WorkflowFailed {
        /// The id of the run.
        run_id: u64,
        /// The conclusion the run finished with.
        conclusion: Conclusion,
    },

    /// The run succeeded but produced nothing to download.
    #[error("could not find any artifacts of workflow run {run_id}")]
    NoArtifacts {
        /// The id of the run.
        run_id: u64,
    },

    /// The run did not complete before the deadline.
    #[error("workflow run {run_id} did not finish within {waited:?}")]
    Timeout {
        /// The id of the run.
        run_id: u64,
        /// How long the run was waited for.
        waited: Duration,
    },

    /// The retrieval was cancelled before it finished.
    #[error("retrieval cancelled")]
    Cancelled,

    /// The artifact has expired or was removed.
    #[error("artifact {name} expired or was removed")]
    ArtifactExpired {
        /// The name of the artifact.
        name: String,
    },

    /// A request to GitHub failed.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// The requested URL.
        url: String,
        /// The underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// A local file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// The file being written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The retrieval was configured incorrectly.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Wraps a [`reqwest::Error`] raised while requesting `url`.
    pub fn transport<U>(url: U, source: reqwest::Error) -> Self
    where
        U: Into<String>,
    {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Whether repeating the failed request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } => {
                source.is_connect()
                    || source.is_timeout()
                    || source.status().is_some_and(|status| status.is_server_error())
            }
            _ => false,
        }
    }

    /// The process exit code reporting this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::NotFound { .. } => 2,
            Self::AmbiguousMatch { .. } => 3,
            Self::WorkflowFailed { .. } => 4,
            Self::NoArtifacts { .. } => 5,
            Self::Timeout { .. } => 6,
            Self::Cancelled => 130,
            _ => 1,
        }
    }
}
