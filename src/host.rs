//! Host download manager interface
//!
//! The extractor never sees the host's internal download objects. It reads a
//! download through an opaque [`DownloadId`] and the accessors below, and its
//! only mutation is the "ready" flag that downstream PVR automation watches.

use crate::types::{DownloadFile, DownloadId, DownloadStatus};
use async_trait::async_trait;
use std::path::PathBuf;

/// Accessor/mutator surface of the host download manager
///
/// # Examples
///
/// ```no_run
/// use pvr_extract::host::DownloadHost;
/// use pvr_extract::types::DownloadId;
///
/// # async fn example(host: &dyn DownloadHost) -> pvr_extract::Result<()> {
/// let id = DownloadId::from("8f3a0c");
/// let status = host.status(&id).await?;
/// for file in host.files(&id).await? {
///     println!("{} contains {}", status.name, file.path);
/// }
/// host.set_ready(&id, true).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DownloadHost: Send + Sync {
    /// Name, location and label of a download
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NotFound`] for unknown downloads.
    async fn status(&self, id: &DownloadId) -> crate::Result<DownloadStatus>;

    /// Files of a download in the host's order, paths relative to its location
    async fn files(&self, id: &DownloadId) -> crate::Result<Vec<DownloadFile>>;

    /// Set the flag PVR automation uses to treat a download as complete
    async fn set_ready(&self, id: &DownloadId, ready: bool) -> crate::Result<()>;

    /// The host's default download folder, used when no extraction path is configured
    async fn default_download_location(&self) -> crate::Result<PathBuf>;
}
