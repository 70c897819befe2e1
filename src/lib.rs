//! # pvr-extract
//!
//! Post-download archive extraction for torrent clients feeding PVR automation
//! (Sonarr, Radarr).
//!
//! When the host download manager reports a finished download, every archive
//! in it is extracted with the matching external program (`unrar`, `unzip`,
//! `tar`, `7z`). While extraction runs, the download's "ready" flag is held
//! back so PVR automation does not import half-extracted content.
//!
//! ## Design
//!
//! - **Host-agnostic** - the download manager is reached only through the
//!   [`DownloadHost`] trait
//! - **Tool-based** - archives are unpacked by external programs discovered on
//!   `PATH` at startup ([`CommandRegistry`])
//! - **Concurrent** - one task per archive; the ready flag is released once,
//!   after the last of them finishes
//!
//! ## Quick Start
//!
//! ```no_run
//! use pvr_extract::{DownloadHost, HostEvent, PvrExtractor};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     host: Arc<dyn DownloadHost>,
//! #     events: tokio::sync::broadcast::Receiver<HostEvent>,
//! # ) -> pvr_extract::Result<()> {
//! let extractor = PvrExtractor::with_detected_tools(host, Path::new("pvr-extract.db")).await?;
//! let event_loop = extractor.spawn_event_loop(events);
//!
//! // ... later
//! extractor.shutdown();
//! event_loop.await.ok();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive classification by file name
pub mod classify;
/// Configuration types
pub mod config;
/// Database persistence layer
pub mod db;
/// Destination folder selection
pub mod destination;
/// Error types
pub mod error;
/// Extraction service bound to the host
pub mod extractor;
/// Host download manager interface
pub mod host;
/// Per-download extraction orchestration
pub mod orchestrator;
/// External process execution
pub mod process;
/// Extension to extraction program registry
pub mod registry;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

// Re-export commonly used types
pub use classify::{Classification, classify};
pub use config::{Config, ConfigUpdate, LabelSet};
pub use db::Database;
pub use error::{DatabaseError, Error, ExtractionError, Result};
pub use extractor::PvrExtractor;
pub use host::DownloadHost;
pub use orchestrator::{DispatchReport, JobCounter, Orchestrator};
pub use process::{ProcessOutput, ProcessRequest, ProcessRunner, TokioProcessRunner};
pub use registry::{CommandEntry, CommandRegistry};
pub use types::{DownloadFile, DownloadId, DownloadStatus, HostEvent, JobOutcome};
