//! Data models of GitHub Actions workflows.

use std::{fmt::Display, str::FromStr};

use serde::Deserialize;

use crate::error::Error;

pub mod artifact;

/// Represents a GitHub Actions workflow run from GitHub REST API.
///
/// A snapshot is never modified. The current state of a run is obtained by re-fetching [`Self::url`].
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct WorkflowRun {
    /// The unique id of the run.
    pub id: u64,
    /// The name of the workflow, if GitHub reports one.
    #[serde(default)]
    pub name: Option<String>,
    /// The full hash of the commit the run was triggered for.
    pub head_sha: String,
    /// The status at the time of the snapshot.
    pub status: RunStatus,
    /// The final verdict. Only meaningful once the run is completed.
    pub conclusion: Option<Conclusion>,
    /// The API URL of the run itself.
    pub url: String,
    /// The page of the run on GitHub.
    #[serde(default)]
    pub html_url: Option<String>,
    /// The API URL listing the artifacts of the run.
    pub artifacts_url: String,
}

impl WorkflowRun {
    /// Whether the run has reached a terminal status.
    pub fn is_completed(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

impl Display for WorkflowRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} #{} ({})", self.id, self.head_sha),
            None => write!(f, "#{} ({})", self.id, self.head_sha),
        }
    }
}

/// Represents the runs of a workflow from GitHub REST API.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowRuns {
    /// The number of runs GitHub knows about, across all pages.
    pub total_count: u64,
    /// The runs on this page, newest first.
    pub workflow_runs: Vec<WorkflowRun>,
}

/// The status of a workflow run.
///
/// Statuses this crate does not know about are kept verbatim in [`RunStatus::Other`].
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
#[serde(from = "String")]
pub enum RunStatus {
    /// Waiting for a runner.
    Queued,
    /// Running.
    InProgress,
    /// Finished, with or without success.
    Completed,
    /// Any other status, verbatim.
    Other(String),
}

impl From<String> for RunStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "queued" => Self::Queued,
            "in_progress" => Self::InProgress,
            "completed" => Self::Completed,
            _ => Self::Other(value),
        }
    }
}

impl Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => f.write_str("queued"),
            Self::InProgress => f.write_str("in_progress"),
            Self::Completed => f.write_str("completed"),
            Self::Other(status) => f.write_str(status),
        }
    }
}

/// The final verdict of a completed workflow run.
///
/// Conclusions this crate does not know about are kept verbatim in [`Conclusion::Other`].
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
#[serde(from = "String")]
pub enum Conclusion {
    /// Every job succeeded.
    Success,
    /// A job failed.
    Failure,
    /// The run was cancelled.
    Cancelled,
    /// The run was skipped.
    Skipped,
    /// A job exceeded its time limit.
    TimedOut,
    /// The run is waiting for approval.
    ActionRequired,
    /// The run neither succeeded nor failed.
    Neutral,
    /// The run was superseded before it finished.
    Stale,
    /// Any other conclusion, verbatim.
    Other(String),
}

impl From<String> for Conclusion {
    fn from(value: String) -> Self {
        match value.as_str() {
            "success" => Self::Success,
            "failure" => Self::Failure,
            "cancelled" => Self::Cancelled,
            "skipped" => Self::Skipped,
            "timed_out" => Self::TimedOut,
            "action_required" => Self::ActionRequired,
            "neutral" => Self::Neutral,
            "stale" => Self::Stale,
            _ => Self::Other(value),
        }
    }
}

impl Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Cancelled => "cancelled",
            Self::Skipped => "skipped",
            Self::TimedOut => "timed_out",
            Self::ActionRequired => "action_required",
            Self::Neutral => "neutral",
            Self::Stale => "stale",
            Self::Other(conclusion) => conclusion,
        })
    }
}

/// A GitHub repository, written as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// The user or organization owning the repository.
    pub owner: String,
    /// The name of the repository.
    pub name: String,
}

impl FromStr for Repository {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self {
                    owner: owner.to_owned(),
                    name: name.to_owned(),
                })
            }
            _ => Err(Error::Config(format!(
                "invalid repository {s:?}, expected owner/name"
            ))),
        }
    }
}

impl Display for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
