//! Defines the environment variables to use.
//!
//! Every variable here is a fallback for a command line option; the command line always wins.

#![cfg(feature = "env")]

use crate::static_lazy_lock;

use std::env;

/// Parses an environment variable from [`String`] to something else, wrapping any error in [`anyhow::Error`].
#[macro_export]
macro_rules! parse_env {
    ($key:expr => |$var:ident| $expr:expr) => {
        std::env::var($key)
            .map_err(|e| anyhow::anyhow!(e))
            .and_then(|$var| $expr)
    };
    ($key:expr => |$var:ident| $expr:expr; anyhow) => {
        $crate::parse_env!($key => |$var| $expr.map_err(|e| anyhow::anyhow!(e)))
    };
}

pub use parse_env;

/// The default base URL of GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

static_lazy_lock! {
    /// The GitHub token, as provided to GitHub Actions jobs.
    pub GITHUB_TOKEN: Option<String> = env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty());
}

static_lazy_lock! {
    /// The `owner/name` of the repository the current GitHub Actions job runs for.
    pub GITHUB_REPOSITORY: Option<String> = env::var("GITHUB_REPOSITORY").ok().filter(|s| !s.is_empty());
}

static_lazy_lock! {
    /// The base URL of GitHub REST API, as provided to GitHub Actions jobs.
    pub GITHUB_API_URL: String = env::var("GITHUB_API_URL")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
}

static_lazy_lock! {
    /// The maximum retry limit for transient failures while polling a workflow run.
    pub MAX_RETRIES: u8 = parse_env!("MAX_RETRIES" => |s| s.parse::<u8>(); anyhow).unwrap_or(0);
}
