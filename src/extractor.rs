//! The extraction service bound to a host download manager.
//!
//! [`PvrExtractor`] owns the configuration snapshot, its persistence, and the
//! subscription to the host's "download finished" events. Each event is
//! handed to the [`Orchestrator`] together with the snapshot current at that
//! moment.

use crate::config::{Config, ConfigUpdate};
use crate::db::Database;
use crate::error::Result;
use crate::host::DownloadHost;
use crate::orchestrator::{DispatchReport, Orchestrator};
use crate::process::{ProcessRunner, TokioProcessRunner};
use crate::registry::CommandRegistry;
use crate::types::{DownloadId, HostEvent};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Extraction service (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct PvrExtractor {
    /// Settings store
    pub(crate) db: Arc<Database>,
    host: Arc<dyn DownloadHost>,
    orchestrator: Arc<Orchestrator>,
    /// Replaced wholesale on every update; events clone it once
    config: Arc<RwLock<Config>>,
    shutdown_token: CancellationToken,
}

impl PvrExtractor {
    /// Create the service from its collaborators
    ///
    /// Loads the persisted configuration. When no extraction path is
    /// configured yet, the host's default download folder is used and saved.
    ///
    /// # Errors
    ///
    /// Fails when the configuration cannot be loaded or saved, or when the
    /// host cannot report its default download folder.
    pub async fn new(
        host: Arc<dyn DownloadHost>,
        runner: Arc<dyn ProcessRunner>,
        registry: CommandRegistry,
        db: Database,
    ) -> Result<Self> {
        let mut config = db.load_config().await?;

        if config.extract_path.as_os_str().is_empty() {
            config.extract_path = host.default_download_location().await?;
            db.save_config(&config).await?;
            tracing::info!(
                extract_path = ?config.extract_path,
                "extract path defaulted to host download location"
            );
        }

        tracing::info!(
            runner = runner.name(),
            extensions = ?registry.extensions(),
            "archive extraction enabled"
        );

        let orchestrator = Orchestrator::new(host.clone(), runner, Arc::new(registry));

        Ok(Self {
            db: Arc::new(db),
            host,
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(RwLock::new(config)),
            shutdown_token: CancellationToken::new(),
        })
    }

    /// Create the service with the programs found on this machine
    ///
    /// Detects the extraction programs on `PATH`, opens (or creates) the
    /// settings database at `database_path` and runs programs with
    /// [`TokioProcessRunner`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NoExtractors`] when no supported program is
    /// installed, or a database error when the store cannot be opened.
    pub async fn with_detected_tools(
        host: Arc<dyn DownloadHost>,
        database_path: &Path,
    ) -> Result<Self> {
        let registry = CommandRegistry::detect()?;
        let db = Database::new(database_path).await?;
        Self::new(host, Arc::new(TokioProcessRunner), registry, db).await
    }

    /// A snapshot of the current configuration
    pub async fn get_config(&self) -> Config {
        self.config.read().await.clone()
    }

    /// Apply a partial update and persist the resulting record
    ///
    /// The new record is saved before it becomes visible; events handled
    /// concurrently see either the old or the new record, never a mix.
    ///
    /// # Errors
    ///
    /// Returns a database error when the record cannot be saved. The
    /// previous configuration then stays in effect.
    pub async fn set_config(&self, update: ConfigUpdate) -> Result<Config> {
        let mut current = self.config.write().await;
        if update.is_empty() {
            return Ok(current.clone());
        }

        let next = current.merged(&update);
        self.db.save_config(&next).await?;
        *current = next.clone();

        tracing::info!(config = ?next, "configuration updated");
        Ok(next)
    }

    /// The extraction programs in use
    pub fn registry(&self) -> &CommandRegistry {
        self.orchestrator.registry()
    }

    /// Handle one "download finished" event with the current configuration
    ///
    /// # Errors
    ///
    /// Returns the host error that prevented dispatch. It is also logged, so
    /// callers driven by the event loop may ignore it.
    pub async fn handle_download_finished(&self, id: &DownloadId) -> Result<DispatchReport> {
        let config = self.get_config().await;
        self.orchestrator
            .on_download_finished(id, &config)
            .await
            .inspect_err(|e| {
                tracing::error!(download_id = %id, error = %e, "failed to handle finished download");
            })
    }

    /// Subscribe to host events until [`PvrExtractor::shutdown`] or the channel closes
    pub fn spawn_event_loop(&self, mut events: broadcast::Receiver<HostEvent>) -> JoinHandle<()> {
        let extractor = self.clone();
        let shutdown_token = self.shutdown_token.clone();

        tokio::spawn(async move {
            tracing::info!("listening for finished downloads");
            loop {
                tokio::select! {
                    _ = shutdown_token.cancelled() => {
                        break;
                    }
                    event = events.recv() => {
                        match event {
                            Ok(HostEvent::DownloadFinished { id }) => {
                                let _ = extractor.handle_download_finished(&id).await;
                            }
                            Err(RecvError::Lagged(skipped)) => {
                                tracing::warn!(skipped, "event receiver lagged, finished downloads were missed");
                            }
                            Err(RecvError::Closed) => {
                                tracing::info!("host event channel closed");
                                break;
                            }
                        }
                    }
                }
            }
            tracing::info!("stopped listening for finished downloads");
        })
    }

    /// Serve `events` until `stop` resolves, then shut down
    ///
    /// `stop` is whatever the host uses to disable the extension, for example
    /// a oneshot receiver. Returns once the event loop has stopped, which also
    /// happens when the event channel closes first.
    ///
    /// ```no_run
    /// use pvr_extract::{DownloadHost, HostEvent, PvrExtractor};
    /// use std::path::Path;
    /// use std::sync::Arc;
    ///
    /// # async fn example(
    /// #     host: Arc<dyn DownloadHost>,
    /// #     events: tokio::sync::broadcast::Receiver<HostEvent>,
    /// #     disabled: tokio::sync::oneshot::Receiver<()>,
    /// # ) -> pvr_extract::Result<()> {
    /// let extractor = PvrExtractor::with_detected_tools(host, Path::new("pvr-extract.db")).await?;
    /// extractor
    ///     .run_until(events, async move {
    ///         disabled.await.ok();
    ///     })
    ///     .await;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_until<F>(&self, events: broadcast::Receiver<HostEvent>, stop: F)
    where
        F: Future<Output = ()>,
    {
        let mut event_loop = self.spawn_event_loop(events);

        tokio::select! {
            _ = stop => {
                self.shutdown();
            }
            result = &mut event_loop => {
                if let Err(e) = result {
                    tracing::error!(error = %e, "event loop task failed");
                }
                return;
            }
        }

        if let Err(e) = event_loop.await {
            tracing::error!(error = %e, "event loop task failed");
        }
    }

    /// Stop the event loop
    ///
    /// Extraction jobs already running are left to finish and still release
    /// their downloads.
    pub fn shutdown(&self) {
        tracing::info!("shutting down archive extraction");
        self.shutdown_token.cancel();
    }

    /// Whether [`PvrExtractor::shutdown`] has been called
    pub fn is_shut_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// The host this service is bound to
    pub fn host(&self) -> &Arc<dyn DownloadHost> {
        &self.host
    }
}
