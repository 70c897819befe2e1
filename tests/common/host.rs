//! In-memory download manager

use async_trait::async_trait;
use pvr_extract::{DownloadFile, DownloadHost, DownloadId, DownloadStatus, Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Host holding downloads in memory and recording ready-flag changes
pub struct InMemoryHost {
    downloads: Mutex<HashMap<DownloadId, (DownloadStatus, Vec<DownloadFile>)>>,
    ready: Mutex<HashMap<DownloadId, Vec<bool>>>,
    default_location: PathBuf,
}

impl InMemoryHost {
    pub fn new(default_location: &Path) -> Self {
        Self {
            downloads: Mutex::new(HashMap::new()),
            ready: Mutex::new(HashMap::new()),
            default_location: default_location.to_path_buf(),
        }
    }

    /// Register a finished download; `files` are relative to `location`
    pub fn add_download(
        &self,
        id: &str,
        name: &str,
        location: &Path,
        label: &str,
        files: &[&str],
    ) -> DownloadId {
        let id = DownloadId::new(id);
        let status = DownloadStatus {
            name: name.to_string(),
            download_location: location.to_path_buf(),
            label: label.to_string(),
        };
        let files = files.iter().map(|path| DownloadFile::new(*path)).collect();
        self.downloads
            .lock()
            .unwrap()
            .insert(id.clone(), (status, files));
        id
    }

    /// Ready-flag values set for `id`, oldest first
    pub fn ready_history(&self, id: &DownloadId) -> Vec<bool> {
        self.ready
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DownloadHost for InMemoryHost {
    async fn status(&self, id: &DownloadId) -> Result<DownloadStatus> {
        self.downloads
            .lock()
            .unwrap()
            .get(id)
            .map(|(status, _)| status.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn files(&self, id: &DownloadId) -> Result<Vec<DownloadFile>> {
        self.downloads
            .lock()
            .unwrap()
            .get(id)
            .map(|(_, files)| files.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn set_ready(&self, id: &DownloadId, ready: bool) -> Result<()> {
        self.ready
            .lock()
            .unwrap()
            .entry(id.clone())
            .or_default()
            .push(ready);
        Ok(())
    }

    async fn default_download_location(&self) -> Result<PathBuf> {
        Ok(self.default_location.clone())
    }
}
