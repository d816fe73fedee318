//! Configuration types for moneyball-pipeline

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Media type of the spreadsheet artifact produced by the pipeline
pub const SPREADSHEET_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Acceptance rules for uploaded export files
///
/// The file-level checks (`extension`, `max_file_bytes`, `min_file_bytes`) run
/// synchronously on assignment. The remaining fields drive the content pass,
/// which reads the full text.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Required file extension without the leading dot (default: "html")
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Largest accepted file in bytes (default: 10 MiB)
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,

    /// Smallest accepted file in bytes (default: 1000)
    #[serde(default = "default_min_file_bytes")]
    pub min_file_bytes: u64,

    /// Smallest accepted text payload in bytes (default: 5000)
    #[serde(default = "default_min_content_bytes")]
    pub min_content_bytes: usize,

    /// At least one of these must appear for the text to count as markup
    /// (default: `<html`, `<table`)
    #[serde(default = "default_markup_indicators")]
    pub markup_indicators: Vec<String>,

    /// Every one of these must appear for the text to count as a table export
    /// (default: `<table`, `<tr`)
    #[serde(default = "default_structure_markers")]
    pub structure_markers: Vec<String>,

    /// Column headings expected in a player export (default: Name, Position, Age, Club)
    #[serde(default = "default_field_tokens")]
    pub field_tokens: Vec<String>,

    /// How many of `field_tokens` must be present (default: 2)
    #[serde(default = "default_min_field_tokens")]
    pub min_field_tokens: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            max_file_bytes: default_max_file_bytes(),
            min_file_bytes: default_min_file_bytes(),
            min_content_bytes: default_min_content_bytes(),
            markup_indicators: default_markup_indicators(),
            structure_markers: default_structure_markers(),
            field_tokens: default_field_tokens(),
            min_field_tokens: default_min_field_tokens(),
        }
    }
}

/// Where the processing script is loaded from
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "location", rename_all = "snake_case")]
pub enum ScriptSource {
    /// Local file
    Path(PathBuf),
    /// HTTP(S) location fetched at environment initialization
    Url(String),
}

impl Default for ScriptSource {
    fn default() -> Self {
        ScriptSource::Path(PathBuf::from("scripts/fm_processor.py"))
    }
}

impl std::fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptSource::Path(path) => write!(f, "{}", path.display()),
            ScriptSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Transformation engine acquisition settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Interpreter binary (None = search PATH for `python3`)
    #[serde(default)]
    pub interpreter: Option<PathBuf>,

    /// Capability packages that must be importable (default: pandas, numpy, xlsxwriter)
    #[serde(default = "default_packages")]
    pub packages: Vec<String>,

    /// Auxiliary packages installed into the engine sandbox (default: html5lib)
    #[serde(default = "default_auxiliary_packages")]
    pub auxiliary_packages: Vec<String>,

    /// Processing script location
    #[serde(default)]
    pub script: ScriptSource,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interpreter: None,
            packages: default_packages(),
            auxiliary_packages: default_auxiliary_packages(),
            script: ScriptSource::default(),
        }
    }
}

/// Naming of the downloadable result
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// File name offered for download (default: "FM24_Moneyball_Analysis.xlsx")
    #[serde(default = "default_artifact_file_name")]
    pub file_name: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            file_name: default_artifact_file_name(),
        }
    }
}

/// Retry configuration for transient failures
///
/// Used by [`crate::retry::with_retry`]. The orchestrator itself never retries.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts including the first one (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before the first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

/// Main configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Upload acceptance rules
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Transformation engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Result artifact naming
    #[serde(default)]
    pub artifact: ArtifactConfig,

    /// Retry behavior for callers wrapping fallible operations
    #[serde(default)]
    pub retry: RetryConfig,

    /// Capacity of the event broadcast channel (default: 256)
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            engine: EngineConfig::default(),
            artifact: ArtifactConfig::default(),
            retry: RetryConfig::default(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl Config {
    /// Parse a JSON document and validate the result
    ///
    /// Missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for inconsistent values
    pub fn validate(&self) -> Result<()> {
        let v = &self.validation;

        if v.extension.trim_start_matches('.').is_empty() {
            return Err(config_error("extension must not be empty", "validation.extension"));
        }
        if v.min_file_bytes > v.max_file_bytes {
            return Err(config_error(
                format!(
                    "min_file_bytes ({}) exceeds max_file_bytes ({})",
                    v.min_file_bytes, v.max_file_bytes
                ),
                "validation.min_file_bytes",
            ));
        }
        if v.markup_indicators.is_empty() {
            return Err(config_error(
                "at least one markup indicator is required",
                "validation.markup_indicators",
            ));
        }
        if v.min_field_tokens > v.field_tokens.len() {
            return Err(config_error(
                format!(
                    "min_field_tokens ({}) exceeds the number of field tokens ({})",
                    v.min_field_tokens,
                    v.field_tokens.len()
                ),
                "validation.min_field_tokens",
            ));
        }
        if self.artifact.file_name.trim().is_empty() {
            return Err(config_error("file name must not be empty", "artifact.file_name"));
        }
        if self.retry.max_attempts == 0 {
            return Err(config_error("must be at least 1", "retry.max_attempts"));
        }
        let multiplier = self.retry.backoff_multiplier;
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(config_error(
                "must be a finite value of at least 1.0",
                "retry.backoff_multiplier",
            ));
        }
        if self.event_capacity == 0 {
            return Err(config_error("must be at least 1", "event_capacity"));
        }

        Ok(())
    }
}

fn config_error(message: impl Into<String>, key: &str) -> Error {
    Error::Config {
        message: message.into(),
        key: Some(key.to_string()),
    }
}

fn default_extension() -> String {
    "html".to_string()
}

fn default_max_file_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_min_file_bytes() -> u64 {
    1000
}

fn default_min_content_bytes() -> usize {
    5000
}

fn default_markup_indicators() -> Vec<String> {
    vec!["<html".to_string(), "<table".to_string()]
}

fn default_structure_markers() -> Vec<String> {
    vec!["<table".to_string(), "<tr".to_string()]
}

fn default_field_tokens() -> Vec<String> {
    ["Name", "Position", "Age", "Club"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_min_field_tokens() -> usize {
    2
}

fn default_packages() -> Vec<String> {
    vec![
        "pandas".to_string(),
        "numpy".to_string(),
        "xlsxwriter".to_string(),
    ]
}

fn default_auxiliary_packages() -> Vec<String> {
    vec!["html5lib".to_string()]
}

fn default_artifact_file_name() -> String {
    "FM24_Moneyball_Analysis.xlsx".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

fn default_event_capacity() -> usize {
    256
}

// Duration serialization helper (seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
