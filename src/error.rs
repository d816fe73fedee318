//! Error types for moneyball-pipeline
//!
//! This module provides:
//! - The crate-wide [`Error`] enum with stage context (failing environment step, role, engine reason)
//! - The closed [`ErrorKind`] taxonomy shown to users
//! - [`ErrorRecord`], the immutable, serializable description of a session failure

use crate::classifier::ErrorClassifier;
use crate::types::{EnvironmentStep, Role, SessionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for moneyball-pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Recovery action offered for every failed session
pub const RESTART_SUBMISSION: &str = "Return to the upload step and submit the files again";

/// Main error type for moneyball-pipeline
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "validation.max_file_bytes")
        key: Option<String>,
    },

    /// Submission attempted before every role holds a valid file
    #[error("upload batch is incomplete: {} not ready", join_roles(.missing))]
    IncompleteBatch {
        /// Roles without a valid file, in role order
        missing: Vec<Role>,
    },

    /// Engine acquisition failed
    #[error("processing environment failed during {step}: {reason}")]
    Environment {
        /// Acquisition sub-step that failed
        step: EnvironmentStep,
        /// Underlying failure
        reason: String,
    },

    /// Reading an uploaded file failed
    #[error("failed to read {role} file: {reason}")]
    Ingest {
        /// Role whose file could not be read
        role: Role,
        /// Underlying failure
        reason: String,
    },

    /// The transformation engine reported a failure
    #[error("transformation failed: {reason}")]
    Transform {
        /// Raw reason reported by the engine
        reason: String,
    },

    /// The transformation engine returned no bytes
    #[error("transformation produced an empty artifact")]
    EmptyArtifact,

    /// Session was replaced or abandoned before it finished
    #[error("session {session} was abandoned")]
    SessionAbandoned {
        /// The stale session
        session: SessionId,
    },

    /// External tool execution failed (interpreter, pip, etc.)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Operation not supported (missing binary, no engine configured, etc.)
    #[error("not supported: {0}")]
    NotSupported(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

fn join_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::label)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Taxonomy kind of this error
    ///
    /// Variants raised by a known stage map directly; the rest are classified
    /// from their description.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IncompleteBatch { .. } | Error::Ingest { .. } => ErrorKind::Validation,
            Error::Environment { .. } => ErrorKind::Environment,
            Error::Transform { .. } | Error::EmptyArtifact => ErrorKind::Transformation,
            Error::NotSupported(_) => ErrorKind::PlatformCompatibility,
            Error::Network(_) => ErrorKind::Connectivity,
            Error::SessionAbandoned { .. } => ErrorKind::Unknown,
            Error::Config { .. }
            | Error::ExternalTool(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::Other(_) => ErrorClassifier::new().kind_of(&self.to_string()),
        }
    }
}

/// Closed taxonomy of user-facing error kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Network or fetch failure
    Connectivity,
    /// Transformation engine could not be acquired
    Environment,
    /// An uploaded file is invalid or unreadable
    Validation,
    /// The host lacks a required capability
    PlatformCompatibility,
    /// The transformation engine failed
    Transformation,
    /// Anything else
    Unknown,
}

impl ErrorKind {
    /// Message suitable for showing to the person who submitted the files
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::Connectivity => {
                "Network connection failed. Please check your internet connection and try again."
            }
            ErrorKind::Environment => {
                "The processing environment failed to initialize. Please try again."
            }
            ErrorKind::Validation => {
                "The uploaded file is invalid or corrupted. Please check that you've exported the correct HTML file from FM24."
            }
            ErrorKind::PlatformCompatibility => {
                "This system does not support all features required for processing."
            }
            ErrorKind::Transformation => {
                "Error processing your FM24 data. Please ensure your files contain valid player statistics."
            }
            ErrorKind::Unknown => "An unexpected error occurred. Please try again.",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Connectivity => "connectivity",
            ErrorKind::Environment => "environment",
            ErrorKind::Validation => "validation",
            ErrorKind::PlatformCompatibility => "platform_compatibility",
            ErrorKind::Transformation => "transformation",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Classified failure attached to a failed session
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Taxonomy kind
    pub kind: ErrorKind,
    /// User-facing message
    pub message: String,
    /// When the failure was recorded
    pub timestamp: DateTime<Utc>,
    /// Technical details (raw reasons, failing step, role)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorRecord {
    /// Create a record with the kind's user message and no details
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.user_message().to_string(),
            timestamp: Utc::now(),
            details: None,
        }
    }

    /// Create a record carrying technical details
    pub fn with_details(kind: ErrorKind, details: serde_json::Value) -> Self {
        Self {
            details: Some(details),
            ..Self::new(kind)
        }
    }

    /// Build a record from a crate error, preserving its context in `details`
    pub fn from_error(error: &Error) -> Self {
        let mut details = serde_json::json!({ "reason": error.to_string() });
        match error {
            Error::Environment { step, reason } => {
                details["step"] = serde_json::json!(step);
                details["reason"] = serde_json::json!(reason);
            }
            Error::Ingest { role, reason } => {
                details["role"] = serde_json::json!(role);
                details["reason"] = serde_json::json!(reason);
            }
            Error::Transform { reason } => {
                details["reason"] = serde_json::json!(reason);
            }
            Error::IncompleteBatch { missing } => {
                details["missing"] = serde_json::json!(missing);
            }
            _ => {}
        }
        Self::with_details(error.kind(), details)
    }

    /// The single recommended recovery action
    pub fn recovery_action(&self) -> &'static str {
        RESTART_SUBMISSION
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}
