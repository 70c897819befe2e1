//! Extraction orchestration for finished downloads
//!
//! One call to [`Orchestrator::on_download_finished`] walks a download
//! through four phases:
//!
//! 1. **Enumerating** - apply the label gate, hold back the ready flag
//!    (PVR support), fetch the file list once.
//! 2. **Dispatching** - classify each file in host order, resolve its
//!    destination and spawn one extraction job per archive. A destination
//!    that cannot be created stops the loop; files after it are never
//!    dispatched.
//! 3. **Aggregating** - each job reports to the shared [`JobCounter`] when its
//!    program exits, successfully or not.
//! 4. **Settled** - once every dispatched job has reported, the ready flag is
//!    released and the counter is dropped with the last task holding it.
//!
//! The counter is sealed only after the dispatch loop returns. A job that
//! finishes while later archives are still being dispatched cannot release
//! the download early, whatever thread it completes on.

use crate::classify::{Classification, classify};
use crate::config::Config;
use crate::destination::resolve_destination;
use crate::error::{ExtractionError, Result};
use crate::host::DownloadHost;
use crate::process::{ProcessRequest, ProcessRunner};
use crate::registry::{CommandEntry, CommandRegistry};
use crate::types::{DownloadId, JobOutcome};
use crate::utils::normalize_path;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// One archive to extract
#[derive(Clone, Debug)]
pub struct ExtractionJob {
    /// Download the archive belongs to
    pub download_id: DownloadId,
    /// Absolute path of the archive
    pub source_file: PathBuf,
    /// Folder the program runs in
    pub destination_dir: PathBuf,
    /// Program and arguments
    pub command: CommandEntry,
}

impl ExtractionJob {
    /// The process invocation for this job: template tokens, then the archive path
    pub fn request(&self) -> ProcessRequest {
        ProcessRequest::new(&self.command.executable, &self.destination_dir)
            .args(self.command.args.iter())
            .arg(&self.source_file)
    }
}

/// Progress of a counter after a job reports
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CounterStep {
    /// Jobs dispatched so far
    pub total: usize,
    /// Jobs finished so far
    pub completed: usize,
    /// This step is the one that settles the download
    pub release: bool,
}

#[derive(Debug, Default)]
struct CounterState {
    total: usize,
    completed: usize,
    sealed: bool,
    released: bool,
}

impl CounterState {
    fn try_release(&mut self) -> bool {
        if self.sealed && !self.released && self.completed == self.total {
            self.released = true;
            return true;
        }
        false
    }
}

/// Job accounting for one finished-download event
///
/// `total` grows only while unsealed, `completed` never exceeds `total`, and
/// exactly one of [`JobCounter::seal`] / [`JobCounter::complete`] reports
/// `release`.
#[derive(Debug, Default)]
pub struct JobCounter {
    state: Mutex<CounterState>,
}

impl JobCounter {
    /// Create an empty, unsealed counter
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CounterState> {
        // A panic while holding the lock cannot leave the counters half-updated
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Count one more dispatched job, returning the new total
    ///
    /// Registering after [`JobCounter::seal`] is ignored and logged; the total
    /// is fixed at that point.
    pub fn register(&self) -> usize {
        let mut state = self.lock();
        if state.sealed {
            warn!(total = state.total, "job registered after dispatch finished");
            return state.total;
        }
        state.total += 1;
        state.total
    }

    /// Record that one dispatched job finished
    pub fn complete(&self) -> CounterStep {
        let mut state = self.lock();
        if state.completed < state.total {
            state.completed += 1;
        }
        let release = state.try_release();
        CounterStep {
            total: state.total,
            completed: state.completed,
            release,
        }
    }

    /// Fix the total; returns true if every job had already finished
    pub fn seal(&self) -> bool {
        let mut state = self.lock();
        state.sealed = true;
        state.try_release()
    }

    /// Current (total, completed)
    pub fn snapshot(&self) -> (usize, usize) {
        let state = self.lock();
        (state.total, state.completed)
    }
}

/// What happened while handling one finished download
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Number of extraction jobs spawned
    pub dispatched: usize,
    /// The label gate rejected the download; nothing was touched
    pub skipped_by_label: bool,
    /// Dispatch stopped early because a destination could not be created
    pub aborted: bool,
    /// Spawned job tasks, in dispatch order
    pub handles: Vec<JoinHandle<JobOutcome>>,
}

impl DispatchReport {
    /// Wait for every dispatched job and collect the outcomes in dispatch order
    pub async fn wait(self) -> Vec<JobOutcome> {
        futures::future::join_all(self.handles)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| JobOutcome::Failed {
                    reason: format!("extraction task panicked: {}", e),
                })
            })
            .collect()
    }
}

/// Runs extraction for finished downloads
pub struct Orchestrator {
    host: Arc<dyn DownloadHost>,
    runner: Arc<dyn ProcessRunner>,
    registry: Arc<CommandRegistry>,
}

impl Orchestrator {
    /// Create an orchestrator over a host, a process runner and a command registry
    pub fn new(
        host: Arc<dyn DownloadHost>,
        runner: Arc<dyn ProcessRunner>,
        registry: Arc<CommandRegistry>,
    ) -> Self {
        Self {
            host,
            runner,
            registry,
        }
    }

    /// The command registry in use
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Handle a "download finished" event with the given configuration snapshot
    ///
    /// Returns once every archive has been dispatched; the jobs keep running
    /// in the background and the report's handles can be awaited.
    ///
    /// # Errors
    ///
    /// Returns an error only when the host cannot report the download's status
    /// or file list. Destination and extraction failures are logged and
    /// reflected in the report.
    pub async fn on_download_finished(
        &self,
        id: &DownloadId,
        config: &Config,
    ) -> Result<DispatchReport> {
        let status = self.host.status(id).await?;

        if !config.label_allowed(&status.label) {
            info!(
                download_id = %id,
                label = %status.label,
                name = %status.name,
                "label is not in supported list, skipping extraction"
            );
            return Ok(DispatchReport {
                skipped_by_label: true,
                ..Default::default()
            });
        }

        let pvr_support = config.pvr_support;
        if pvr_support {
            info!(
                download_id = %id,
                name = %status.name,
                "holding back download from PVR until extraction completes"
            );
            if let Err(e) = self.host.set_ready(id, false).await {
                warn!(download_id = %id, error = %e, "failed to clear ready flag");
            }
        }

        let files = match self.host.files(id).await {
            Ok(files) => files,
            Err(e) => {
                // Nothing will be dispatched, so do not leave the download held back
                release(self.host.as_ref(), id, pvr_support).await;
                return Err(e);
            }
        };

        let counter = Arc::new(JobCounter::new());
        let mut report = DispatchReport::default();

        for file in &files {
            let command = match classify(Path::new(&file.path), &self.registry) {
                Classification::Extract(command) => command.clone(),
                Classification::SkipMultiVolumeContinuation => {
                    debug!(
                        download_id = %id,
                        path = %file.path,
                        "skipping remaining multi-part rar file"
                    );
                    continue;
                }
                Classification::NotArchive => {
                    debug!(
                        download_id = %id,
                        path = %file.path,
                        "not an archive, skipping"
                    );
                    continue;
                }
            };

            let source_file = status
                .download_location
                .join(normalize_path(Path::new(&file.path)));

            let destination_dir =
                match resolve_destination(&status.name, &status.download_location, config) {
                    Ok(dir) => dir,
                    Err(e) => {
                        error!(
                            download_id = %id,
                            error = %e,
                            "cannot create destination folder, aborting extraction for this download"
                        );
                        report.aborted = true;
                        break;
                    }
                };

            let total = counter.register();
            debug!(
                download_id = %id,
                total,
                completed = counter.snapshot().1,
                "extraction count"
            );

            let job = ExtractionJob {
                download_id: id.clone(),
                source_file,
                destination_dir,
                command,
            };
            debug!(
                download_id = %id,
                source = ?job.source_file,
                program = ?job.command.executable,
                args = ?job.command.args,
                destination = ?job.destination_dir,
                "extracting"
            );

            report.handles.push(self.spawn_job(job, counter.clone(), pvr_support));
        }

        report.dispatched = report.handles.len();

        if report.dispatched == 0 {
            info!(
                download_id = %id,
                name = %status.name,
                "nothing to extract"
            );
        }

        if counter.seal() {
            release(self.host.as_ref(), id, pvr_support).await;
        }

        Ok(report)
    }

    fn spawn_job(
        &self,
        job: ExtractionJob,
        counter: Arc<JobCounter>,
        pvr_support: bool,
    ) -> JoinHandle<JobOutcome> {
        let host = self.host.clone();
        let runner = self.runner.clone();

        tokio::spawn(async move {
            let outcome = match runner.run(job.request()).await {
                Ok(output) if output.success => {
                    info!(
                        download_id = %job.download_id,
                        source = ?job.source_file,
                        "extract successful"
                    );
                    JobOutcome::Succeeded
                }
                Ok(output) => {
                    let stderr = output.stderr_text();
                    let failure = ExtractionError::ToolFailed {
                        archive: job.source_file.clone(),
                        code: output.code,
                        stderr: stderr.clone(),
                    };
                    error!(download_id = %job.download_id, error = %failure, "extract failed");
                    JobOutcome::Failed { reason: stderr }
                }
                Err(e) => {
                    error!(
                        download_id = %job.download_id,
                        source = ?job.source_file,
                        runner = runner.name(),
                        error = %e,
                        "extract failed"
                    );
                    JobOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };

            let step = counter.complete();
            debug!(
                download_id = %job.download_id,
                total = step.total,
                completed = step.completed,
                "extraction count"
            );

            if step.release {
                release(host.as_ref(), &job.download_id, pvr_support).await;
            }

            outcome
        })
    }
}

/// Settle a download: every dispatched job has finished (or none was dispatched)
async fn release(host: &dyn DownloadHost, id: &DownloadId, pvr_support: bool) {
    if !pvr_support {
        debug!(download_id = %id, "all extraction jobs finished");
        return;
    }

    info!(download_id = %id, "all extraction jobs finished, setting ready flag");
    if let Err(e) = host.set_ready(id, true).await {
        error!(download_id = %id, error = %e, "failed to set ready flag");
    }
}
