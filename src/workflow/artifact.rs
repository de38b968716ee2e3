//! Artifacts from GitHub REST API.

use std::fmt::Display;

use serde::Deserialize;

const MIB: f64 = 1024.0 * 1024.0;

/// Represents artifacts from GitHub REST API.
#[derive(Debug, Deserialize, Clone)]
pub struct Artifacts {
    /// The number of artifacts of the run, across all pages.
    pub total_count: u64,
    /// The artifacts on this page.
    pub artifacts: Vec<Artifact>,
}

/// Represents an artifact from GitHub REST API.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// The unique id of the artifact.
    pub id: u64,
    /// The name the artifact was uploaded with.
    pub name: String,
    /// The size of the zip archive.
    pub size_in_bytes: u64,
    /// The API URL redirecting to the zip archive.
    pub archive_download_url: String,
    /// Whether GitHub has already deleted the archive.
    #[serde(default)]
    pub expired: bool,
}

impl Artifact {
    /// The size of the archive in MiB.
    pub fn size_mib(&self) -> f64 {
        self.size_in_bytes as f64 / MIB
    }
}

impl Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} at {})",
            self.name, self.id, self.archive_download_url
        )
    }
}
