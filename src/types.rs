//! Core types for moneyball-pipeline

use crate::error::ErrorKind;
use serde::{Deserialize, Serialize};

/// Unique identifier for a processing session
///
/// Identifiers are allocated by the orchestrator, start at 1 and never repeat
/// within one orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl SessionId {
    /// Get the inner u64 value
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of an uploaded export within a batch
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Signed (transfer-listed) players
    Primary,
    /// Loan-listed players
    Secondary,
    /// Every player in the game database
    Universal,
}

impl Role {
    /// All roles in ingestion order
    pub const ALL: [Role; 3] = [Role::Primary, Role::Secondary, Role::Universal];

    /// Position of the role in ingestion order
    pub fn index(&self) -> usize {
        match self {
            Role::Primary => 0,
            Role::Secondary => 1,
            Role::Universal => 2,
        }
    }

    /// Short lowercase label
    pub fn label(&self) -> &'static str {
        match self {
            Role::Primary => "primary",
            Role::Secondary => "secondary",
            Role::Universal => "universal",
        }
    }

    /// Description of the export expected for this role
    pub fn description(&self) -> &'static str {
        match self {
            Role::Primary => "Signed players (transfers)",
            Role::Secondary => "Loan players",
            Role::Universal => "Universal players",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Processing session stage
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Acquiring the transformation engine
    EnvironmentInit,
    /// Reading the three uploaded files
    Ingest,
    /// Running the transformation engine
    Transform,
    /// Artifact ready (terminal)
    Finalize,
    /// Session failed (terminal)
    Failed,
}

impl Stage {
    /// Stages of a successful session, in order
    pub const PIPELINE: [Stage; 4] = [
        Stage::EnvironmentInit,
        Stage::Ingest,
        Stage::Transform,
        Stage::Finalize,
    ];

    /// Whether the session can no longer advance
    pub fn is_terminal(&self) -> bool {
        matches!(self, Stage::Finalize | Stage::Failed)
    }

    /// Heading shown to users while the stage runs
    pub fn title(&self) -> &'static str {
        match self {
            Stage::EnvironmentInit => "Initializing Processing Environment",
            Stage::Ingest => "Reading Upload Files",
            Stage::Transform => "Analyzing Player Data",
            Stage::Finalize => "Generating Excel Report",
            Stage::Failed => "Processing Failed",
        }
    }
}

/// Sub-steps of engine acquisition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvironmentStep {
    /// Starting the sandboxed interpreter
    Boot,
    /// Loading the capability packages
    LoadPackages,
    /// Installing auxiliary packages
    InstallPackages,
    /// Fetching and loading the processing script
    LoadScript,
}

impl std::fmt::Display for EnvironmentStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EnvironmentStep::Boot => "runtime boot",
            EnvironmentStep::LoadPackages => "package loading",
            EnvironmentStep::InstallPackages => "package installation",
            EnvironmentStep::LoadScript => "script loading",
        };
        f.write_str(name)
    }
}

/// Event emitted during the session lifecycle
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A complete batch was accepted and a session created
    SessionStarted {
        /// Session ID
        session: SessionId,
    },

    /// A stage began
    StageStarted {
        /// Session ID
        session: SessionId,
        /// Stage entered
        stage: Stage,
    },

    /// Progress within the current stage
    Progress {
        /// Session ID
        session: SessionId,
        /// Current stage
        stage: Stage,
        /// Percent complete within the stage (0-100)
        percent: u8,
    },

    /// A stage met its exit condition
    StageComplete {
        /// Session ID
        session: SessionId,
        /// Stage completed
        stage: Stage,
    },

    /// Artifact is ready for download
    Complete {
        /// Session ID
        session: SessionId,
        /// Offered file name
        file_name: String,
        /// Artifact size in bytes
        size_bytes: u64,
    },

    /// Session failed
    Failed {
        /// Session ID
        session: SessionId,
        /// Stage that failed
        stage: Stage,
        /// Classified error kind
        kind: ErrorKind,
        /// User-facing message
        message: String,
    },
}
