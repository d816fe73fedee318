//! Per-session state shared by the pipeline stages

use crate::config::Config;
use crate::engine::{TransformEngine, TransformInputs};
use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::types::{Role, SessionId};
use crate::upload::FileHandle;
use std::sync::Arc;

/// Everything one session owns while it runs
///
/// Stages receive it by `&mut` and hand their results forward through it:
/// environment init fills `engine`, ingest fills `inputs`, transform fills
/// `output`. The engine is dropped with the context.
pub(crate) struct SessionContext {
    pub(crate) id: SessionId,
    pub(crate) config: Arc<Config>,
    pub(crate) reporter: ProgressReporter,
    /// Files captured at submission, in role order
    pub(crate) files: Vec<(Role, FileHandle)>,
    pub(crate) engine: Option<Box<dyn TransformEngine>>,
    pub(crate) inputs: Option<TransformInputs>,
    pub(crate) output: Option<Vec<u8>>,
}

impl SessionContext {
    pub(crate) fn new(
        config: Arc<Config>,
        reporter: ProgressReporter,
        files: Vec<(Role, FileHandle)>,
    ) -> Self {
        Self {
            id: reporter.session(),
            config,
            reporter,
            files,
            engine: None,
            inputs: None,
            output: None,
        }
    }

    /// Stop if a newer submission or an explicit abandon replaced this session
    pub(crate) fn ensure_live(&self) -> Result<()> {
        if self.reporter.is_live() {
            Ok(())
        } else {
            Err(Error::SessionAbandoned { session: self.id })
        }
    }
}
