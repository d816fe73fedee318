//! Keyword-based error classification
//!
//! Arbitrary failures (engine stderr, I/O messages, errors from caller code) are
//! mapped onto [`ErrorKind`] by looking for keywords in their lower-cased
//! description. Rules are checked in a fixed priority order and the first rule
//! with a matching keyword wins, so a message mentioning both "network" and
//! "processing" is a connectivity failure.
//!
//! This is a heuristic. The priority table below is the contract.

use crate::error::{ErrorKind, ErrorRecord};
use tracing::debug;

/// A taxonomy kind and the keywords that select it
#[derive(Clone, Copy, Debug)]
pub struct ClassificationRule {
    /// Kind assigned when a keyword matches
    pub kind: ErrorKind,
    /// Lower-case keywords searched for
    pub keywords: &'static [&'static str],
}

/// Default rules, highest priority first
pub const DEFAULT_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        kind: ErrorKind::Connectivity,
        keywords: &["network", "fetch", "connection", "dns"],
    },
    ClassificationRule {
        kind: ErrorKind::Environment,
        keywords: &["pyodide", "python", "interpreter", "engine", "initializ"],
    },
    ClassificationRule {
        kind: ErrorKind::Validation,
        keywords: &["file", "html", "parse", "content"],
    },
    ClassificationRule {
        kind: ErrorKind::PlatformCompatibility,
        keywords: &["webassembly", "wasm", "sandbox", "capability", "unsupported"],
    },
    ClassificationRule {
        kind: ErrorKind::Transformation,
        keywords: &["processing", "analysis", "transform"],
    },
];

/// Maps failure descriptions onto [`ErrorKind`]
#[derive(Clone, Copy, Debug)]
pub struct ErrorClassifier {
    rules: &'static [ClassificationRule],
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorClassifier {
    /// Classifier using [`DEFAULT_RULES`]
    pub fn new() -> Self {
        Self {
            rules: DEFAULT_RULES,
        }
    }

    /// Classifier using a custom rule table (highest priority first)
    pub fn with_rules(rules: &'static [ClassificationRule]) -> Self {
        Self { rules }
    }

    /// Kind selected for a description
    pub fn kind_of(&self, description: &str) -> ErrorKind {
        let lowered = description.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
            .map(|rule| rule.kind)
            .unwrap_or(ErrorKind::Unknown)
    }

    /// Classify an arbitrary failure into an [`ErrorRecord`]
    ///
    /// The raw description is kept under `details.raw`.
    pub fn classify(&self, raw: &dyn std::fmt::Display) -> ErrorRecord {
        let description = raw.to_string();
        let kind = self.kind_of(&description);
        debug!(%kind, raw = %description, "classified failure");
        ErrorRecord::with_details(kind, serde_json::json!({ "raw": description }))
    }
}
