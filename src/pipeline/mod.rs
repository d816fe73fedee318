//! Processing pipeline for a complete upload batch
//!
//! A submission runs through a single forward path:
//! 1. EnvironmentInit - acquire a fresh transformation engine
//! 2. Ingest - read the three files in role order
//! 3. Transform - run the engine on the three texts
//! 4. Finalize - wrap the bytes into an [`ArtifactHandoff`](crate::ArtifactHandoff)
//!
//! Any failure in the first three stages ends the session in `Failed` with a
//! classified [`ErrorRecord`]. The orchestrator never retries; resubmitting
//! starts a new session from the beginning.

use crate::config::Config;
use crate::engine::EngineLauncher;
use crate::error::{Error, ErrorRecord, Result};
use crate::progress::{ProgressChannels, ProgressReporter, ProgressSnapshot};
use crate::types::{Event, Role, SessionId};
use crate::upload::{FileValidator, UploadBatch};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, watch};
use tracing::{error, info, warn};

mod context;
mod environment;
mod finalize;
mod ingest;
mod session;
mod transform;

use context::SessionContext;
use environment::run_environment_stage;
use finalize::run_finalize_stage;
use ingest::run_ingest_stage;
use transform::run_transform_stage;

pub use session::ProcessingSession;

/// Drives submissions from environment initialization to an artifact
///
/// At most one session is live. Submitting again, or calling
/// [`abandon`](Orchestrator::abandon), makes the running session stale: it
/// stops publishing progress and its `submit` call resolves to
/// [`Error::SessionAbandoned`].
pub struct Orchestrator {
    config: Arc<Config>,
    launcher: Arc<dyn EngineLauncher>,
    channels: ProgressChannels,
    next_session: AtomicU64,
}

impl Orchestrator {
    /// Create an orchestrator after validating the configuration
    pub fn new(config: Config, launcher: Arc<dyn EngineLauncher>) -> Result<Self> {
        config.validate()?;
        let channels = ProgressChannels::new(config.event_capacity);

        Ok(Self {
            config: Arc::new(config),
            launcher,
            channels,
            next_session: AtomicU64::new(1),
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// An empty batch using this orchestrator's validation rules
    pub fn new_batch(&self) -> UploadBatch {
        UploadBatch::new(FileValidator::new(self.config.validation.clone()))
    }

    /// Subscribe to session lifecycle events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.channels.event_tx.subscribe()
    }

    /// Watch the live session's progress
    pub fn watch_progress(&self) -> watch::Receiver<ProgressSnapshot> {
        self.channels.snapshot_tx.subscribe()
    }

    /// Discard the live session, if any
    ///
    /// In-flight engine work is not interrupted; its result is dropped.
    pub fn abandon(&self) {
        let previous = self.channels.live_session.swap(0, Ordering::SeqCst);
        if previous != 0 {
            info!(session = previous, "session abandoned");
        }
    }

    /// Process a complete batch
    ///
    /// Incomplete batches are rejected with [`Error::IncompleteBatch`] before
    /// any session is created. Otherwise the returned session is terminal:
    /// check [`ProcessingSession::is_success`] or
    /// [`ProcessingSession::error`].
    pub async fn submit(&self, batch: &UploadBatch) -> Result<ProcessingSession> {
        if !batch.is_complete() {
            let missing = batch.missing_roles();
            warn!(?missing, "submission rejected: batch incomplete");
            return Err(Error::IncompleteBatch { missing });
        }

        let mut files = Vec::with_capacity(Role::ALL.len());
        for role in Role::ALL {
            let file = batch
                .file(role)
                .ok_or_else(|| Error::IncompleteBatch { missing: vec![role] })?;
            files.push((role, file.clone()));
        }

        let id = SessionId(self.next_session.fetch_add(1, Ordering::SeqCst));
        let previous = self.channels.live_session.swap(id.0, Ordering::SeqCst);
        if previous != 0 {
            info!(session = %id, replaced = previous, "new submission replaces live session");
        }

        let reporter = ProgressReporter::new(id, self.channels.clone());
        let mut ctx = SessionContext::new(self.config.clone(), reporter, files);
        ctx.reporter.start();
        info!(session = %id, launcher = self.launcher.name(), "session started");

        let session = match self.run(&mut ctx).await {
            Ok(artifact) => ProcessingSession::succeeded(&ctx.reporter, artifact),
            Err(e) => {
                let failed_stage = ctx.reporter.stage();
                let record = ErrorRecord::from_error(&e);
                if matches!(e, Error::SessionAbandoned { .. }) {
                    info!(session = %id, stage = ?failed_stage, "stopping abandoned session");
                } else {
                    error!(
                        session = %id,
                        stage = ?failed_stage,
                        kind = %record.kind,
                        error = %e,
                        "session failed"
                    );
                }
                ctx.reporter.fail(&record);
                ProcessingSession::failed(&ctx.reporter, record)
            }
        };

        if !ctx.reporter.is_live() {
            return Err(Error::SessionAbandoned { session: id });
        }
        Ok(session)
    }

    async fn run(&self, ctx: &mut SessionContext) -> Result<crate::ArtifactHandoff> {
        run_environment_stage(ctx, self.launcher.as_ref()).await?;
        ctx.ensure_live()?;
        run_ingest_stage(ctx).await?;
        ctx.ensure_live()?;
        run_transform_stage(ctx).await?;
        ctx.ensure_live()?;
        run_finalize_stage(ctx)
    }
}

#[cfg(test)]
mod tests;
