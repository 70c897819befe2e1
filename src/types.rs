//! Core types for pvr-extract

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Opaque identifier for a download owned by the host (e.g. a torrent info-hash)
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DownloadId(pub String);

impl DownloadId {
    /// Create a new DownloadId
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DownloadId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DownloadId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for DownloadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status fields of a download needed to extract it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadStatus {
    /// Display name; for single-file downloads this is the file name
    pub name: String,
    /// Directory the download's files were saved into
    pub download_location: PathBuf,
    /// Label assigned by the host's labelling feature (empty when unlabelled)
    #[serde(default)]
    pub label: String,
}

/// A file belonging to a download, as reported by the host
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadFile {
    /// Path relative to the download location
    pub path: String,
}

impl DownloadFile {
    /// Create a file entry from a relative path
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

/// Events published by the host download manager
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// All pieces of a download have been retrieved
    DownloadFinished {
        /// Download ID
        id: DownloadId,
    },
}

/// Outcome of a single extraction job
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// The extraction program exited successfully
    Succeeded,
    /// The program exited unsuccessfully or could not be run
    Failed {
        /// Human-readable reason (stderr or spawn error)
        reason: String,
    },
}

impl JobOutcome {
    /// Whether the job succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded)
    }
}
