//! Outcome of one submission

use crate::artifact::ArtifactHandoff;
use crate::error::ErrorRecord;
use crate::progress::ProgressReporter;
use crate::types::{SessionId, Stage};
use std::collections::BTreeSet;

/// A finished session: either an artifact or an error record
///
/// Returned by [`Orchestrator::submit`](super::Orchestrator::submit). The
/// stage is always terminal; `Finalize` carries an artifact and `Failed`
/// carries an error.
#[derive(Clone, Debug)]
pub struct ProcessingSession {
    id: SessionId,
    stage: Stage,
    progress_percent: u8,
    completed_stages: BTreeSet<Stage>,
    error: Option<ErrorRecord>,
    artifact: Option<ArtifactHandoff>,
}

impl ProcessingSession {
    pub(crate) fn succeeded(reporter: &ProgressReporter, artifact: ArtifactHandoff) -> Self {
        Self::from_reporter(reporter, None, Some(artifact))
    }

    pub(crate) fn failed(reporter: &ProgressReporter, error: ErrorRecord) -> Self {
        Self::from_reporter(reporter, Some(error), None)
    }

    fn from_reporter(
        reporter: &ProgressReporter,
        error: Option<ErrorRecord>,
        artifact: Option<ArtifactHandoff>,
    ) -> Self {
        Self {
            id: reporter.session(),
            stage: reporter.stage(),
            progress_percent: reporter.percent(),
            completed_stages: reporter.completed_stages().clone(),
            error,
            artifact,
        }
    }

    /// Session ID
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Terminal stage reached
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Percent within the terminal stage (100 on success, 0 on failure)
    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    /// Stages that met their exit condition
    pub fn completed_stages(&self) -> &BTreeSet<Stage> {
        &self.completed_stages
    }

    /// Whether an artifact was produced
    pub fn is_success(&self) -> bool {
        self.stage == Stage::Finalize && self.artifact.is_some()
    }

    /// Failure description, present only for failed sessions
    pub fn error(&self) -> Option<&ErrorRecord> {
        self.error.as_ref()
    }

    /// Result artifact, present only for successful sessions
    pub fn artifact(&self) -> Option<&ArtifactHandoff> {
        self.artifact.as_ref()
    }

    /// Take the artifact out of the session
    pub fn into_artifact(self) -> Option<ArtifactHandoff> {
        self.artifact
    }

    /// What the user should do next, for failed sessions
    pub fn recovery_action(&self) -> Option<&'static str> {
        self.error.as_ref().map(ErrorRecord::recovery_action)
    }
}
