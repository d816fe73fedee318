//! Stage and percent tracking for the live session
//!
//! The orchestrator owns one [`ProgressReporter`] per session and is the only
//! writer. Observers get two read-only views:
//! - the latest [`ProgressSnapshot`] through a `watch` channel
//! - lifecycle [`Event`]s through a `broadcast` channel
//!
//! Publishing never blocks. A reporter whose session is no longer the live
//! one keeps its own state but publishes nothing, so late updates from an
//! abandoned session cannot overwrite the current one.

use crate::error::ErrorRecord;
use crate::types::{Event, SessionId, Stage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

/// Read-only view of session progress
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Session the snapshot belongs to (None before the first submission)
    pub session: Option<SessionId>,
    /// Current stage
    pub stage: Option<Stage>,
    /// Percent complete within the stage (0-100)
    pub percent: u8,
    /// Stages that met their exit condition, in pipeline order
    pub completed_stages: BTreeSet<Stage>,
}

/// Publishing side shared by every reporter of one orchestrator
#[derive(Clone)]
pub(crate) struct ProgressChannels {
    pub(crate) event_tx: broadcast::Sender<Event>,
    pub(crate) snapshot_tx: Arc<watch::Sender<ProgressSnapshot>>,
    pub(crate) live_session: Arc<AtomicU64>,
}

impl ProgressChannels {
    pub(crate) fn new(event_capacity: usize) -> Self {
        let (event_tx, _) = broadcast::channel(event_capacity.max(1));
        let (snapshot_tx, _) = watch::channel(ProgressSnapshot::default());
        Self {
            event_tx,
            snapshot_tx: Arc::new(snapshot_tx),
            live_session: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Tracks stage, percent and completed stages for one session
pub struct ProgressReporter {
    session: SessionId,
    stage: Stage,
    percent: u8,
    completed: BTreeSet<Stage>,
    channels: ProgressChannels,
}

impl ProgressReporter {
    pub(crate) fn new(session: SessionId, channels: ProgressChannels) -> Self {
        Self {
            session,
            stage: Stage::EnvironmentInit,
            percent: 0,
            completed: BTreeSet::new(),
            channels,
        }
    }

    /// Session being tracked
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Current stage
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Percent complete within the current stage
    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Stages that met their exit condition
    pub fn completed_stages(&self) -> &BTreeSet<Stage> {
        &self.completed
    }

    /// Current state as a snapshot
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            session: Some(self.session),
            stage: Some(self.stage),
            percent: self.percent,
            completed_stages: self.completed.clone(),
        }
    }

    /// Whether this reporter's session is still the live one
    pub fn is_live(&self) -> bool {
        self.channels.live_session.load(Ordering::SeqCst) == self.session.0
    }

    /// Announce the session and its first stage
    pub(crate) fn start(&mut self) {
        self.emit(Event::SessionStarted {
            session: self.session,
        });
        self.emit(Event::StageStarted {
            session: self.session,
            stage: self.stage,
        });
        self.publish();
    }

    /// Record progress for a stage
    ///
    /// Percent is clamped to 100. Within a stage, lower values than the
    /// current one are ignored. Moving to a later stage resets percent to the
    /// reported value, except [`Stage::Finalize`] which is always 100.
    /// Reports after a terminal stage, or for an earlier stage, are ignored.
    pub(crate) fn report(&mut self, stage: Stage, percent: u8) {
        let percent = percent.min(100);

        if self.stage.is_terminal() {
            warn!(session = %self.session, current = ?self.stage, ?stage, "progress after terminal stage ignored");
            return;
        }
        if stage == Stage::Failed {
            warn!(session = %self.session, "failure must be recorded through fail()");
            return;
        }

        if stage != self.stage {
            if stage < self.stage {
                warn!(session = %self.session, current = ?self.stage, ?stage, "backward stage transition ignored");
                return;
            }
            debug!(session = %self.session, from = ?self.stage, to = ?stage, title = stage.title(), "stage transition");
            self.stage = stage;
            self.percent = if stage == Stage::Finalize { 100 } else { percent };
            self.emit(Event::StageStarted {
                session: self.session,
                stage,
            });
        } else if percent < self.percent {
            debug!(session = %self.session, ?stage, current = self.percent, reported = percent, "regressive progress ignored");
            return;
        } else {
            self.percent = percent;
        }

        self.emit(Event::Progress {
            session: self.session,
            stage: self.stage,
            percent: self.percent,
        });
        self.publish();
    }

    /// Mark the current stage as complete
    ///
    /// Each stage is added to the completed set at most once.
    pub(crate) fn complete_stage(&mut self) {
        let stage = self.stage;
        if stage == Stage::Failed {
            return;
        }
        if !self.completed.insert(stage) {
            warn!(session = %self.session, ?stage, "stage already marked complete");
            return;
        }

        self.emit(Event::StageComplete {
            session: self.session,
            stage,
        });
        self.publish();
    }

    /// Announce the finished artifact
    pub(crate) fn finish(&mut self, file_name: &str, size_bytes: u64) {
        self.emit(Event::Complete {
            session: self.session,
            file_name: file_name.to_string(),
            size_bytes,
        });
    }

    /// Move to [`Stage::Failed`]; percent resets to 0
    pub(crate) fn fail(&mut self, record: &ErrorRecord) {
        if self.stage.is_terminal() {
            warn!(session = %self.session, current = ?self.stage, "failure after terminal stage ignored");
            return;
        }

        let failed_stage = self.stage;
        self.stage = Stage::Failed;
        self.percent = 0;

        self.emit(Event::Failed {
            session: self.session,
            stage: failed_stage,
            kind: record.kind,
            message: record.message.clone(),
        });
        self.publish();
    }

    fn emit(&self, event: Event) {
        if !self.is_live() {
            debug!(session = %self.session, ?event, "stale session event dropped");
            return;
        }
        // no subscribers is fine
        self.channels.event_tx.send(event).ok();
    }

    fn publish(&self) {
        if self.is_live() {
            self.channels.snapshot_tx.send_replace(self.snapshot());
        }
    }
}
