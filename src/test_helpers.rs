//! Shared test doubles: an in-memory host and a scripted process runner.

use crate::error::{Error, Result};
use crate::host::DownloadHost;
use crate::process::{ProcessOutput, ProcessRequest, ProcessRunner};
use crate::registry::{CommandEntry, CommandRegistry};
use crate::types::{DownloadFile, DownloadId, DownloadStatus};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::oneshot;

/// In-memory host that records every ready-flag change
pub(crate) struct MockHost {
    downloads: Mutex<HashMap<DownloadId, (DownloadStatus, Vec<DownloadFile>)>>,
    ready_calls: Mutex<Vec<(DownloadId, bool)>>,
    default_location: PathBuf,
    pub(crate) fail_files: AtomicBool,
}

impl MockHost {
    pub(crate) fn new(default_location: impl Into<PathBuf>) -> Self {
        Self {
            downloads: Mutex::new(HashMap::new()),
            ready_calls: Mutex::new(Vec::new()),
            default_location: default_location.into(),
            fail_files: AtomicBool::new(false),
        }
    }

    /// Register a download located at `location` with the given files
    pub(crate) fn add_download(
        &self,
        id: &str,
        name: &str,
        location: &Path,
        label: &str,
        files: &[&str],
    ) -> DownloadId {
        let id = DownloadId::from(id);
        let status = DownloadStatus {
            name: name.to_string(),
            download_location: location.to_path_buf(),
            label: label.to_string(),
        };
        let files = files.iter().map(|f| DownloadFile::new(*f)).collect();
        self.downloads
            .lock()
            .unwrap()
            .insert(id.clone(), (status, files));
        id
    }

    /// Every value passed to set_ready for `id`, in call order
    pub(crate) fn ready_calls(&self, id: &DownloadId) -> Vec<bool> {
        self.ready_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(call_id, _)| call_id == id)
            .map(|(_, ready)| *ready)
            .collect()
    }
}

#[async_trait]
impl DownloadHost for MockHost {
    async fn status(&self, id: &DownloadId) -> Result<DownloadStatus> {
        self.downloads
            .lock()
            .unwrap()
            .get(id)
            .map(|(status, _)| status.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn files(&self, id: &DownloadId) -> Result<Vec<DownloadFile>> {
        if self.fail_files.load(Ordering::SeqCst) {
            return Err(Error::Host("file list unavailable".into()));
        }
        self.downloads
            .lock()
            .unwrap()
            .get(id)
            .map(|(_, files)| files.clone())
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }

    async fn set_ready(&self, id: &DownloadId, ready: bool) -> Result<()> {
        self.ready_calls.lock().unwrap().push((id.clone(), ready));
        Ok(())
    }

    async fn default_download_location(&self) -> Result<PathBuf> {
        Ok(self.default_location.clone())
    }
}

/// Process runner whose invocations are recorded and can be held open
///
/// Archives with a registered gate block until the test sends their output.
/// Others finish immediately: successfully, unless the archive name contains
/// "corrupt" (exit code 3) or "unspawnable" (spawn error).
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    requests: Mutex<Vec<ProcessRequest>>,
    gates: Mutex<HashMap<String, oneshot::Receiver<ProcessOutput>>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hold the extraction of `archive_name` until the returned sender fires
    pub(crate) fn gate(&self, archive_name: &str) -> oneshot::Sender<ProcessOutput> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .insert(archive_name.to_string(), rx);
        tx
    }

    pub(crate) fn requests(&self) -> Vec<ProcessRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// File names of the archives the runner was asked to extract
    pub(crate) fn archive_names(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| archive_name(request))
            .collect()
    }
}

fn archive_name(request: &ProcessRequest) -> String {
    request
        .args
        .last()
        .map(Path::new)
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn success() -> ProcessOutput {
    ProcessOutput {
        code: Some(0),
        success: true,
        ..Default::default()
    }
}

pub(crate) fn failure(stderr: &str) -> ProcessOutput {
    ProcessOutput {
        stderr: stderr.as_bytes().to_vec(),
        code: Some(3),
        success: false,
        ..Default::default()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, request: ProcessRequest) -> Result<ProcessOutput> {
        let name = archive_name(&request);
        self.requests.lock().unwrap().push(request);

        let gate = self.gates.lock().unwrap().remove(&name);
        if let Some(gate) = gate {
            return gate
                .await
                .map_err(|_| Error::ExternalTool(format!("gate for {} dropped", name)));
        }

        if name.contains("unspawnable") {
            return Err(Error::ExternalTool(format!("Failed to execute for {}", name)));
        }
        if name.contains("corrupt") {
            return Ok(failure("CRC failed"));
        }
        Ok(success())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Registry with the usual POSIX table and fake program paths
pub(crate) fn test_registry() -> CommandRegistry {
    CommandRegistry::from_entries([
        CommandEntry::new(".rar", "/usr/bin/unrar", "x -or -y"),
        CommandEntry::new(".zip", "/usr/bin/unzip", ""),
        CommandEntry::new(".tar", "/bin/tar", "-xf"),
        CommandEntry::new(".tar.gz", "/bin/tar", "-xzf"),
        CommandEntry::new(".tgz", "/bin/tar", "-xzf"),
        CommandEntry::new(".7z", "/usr/bin/7zr", "x"),
    ])
    .unwrap()
}
