//! Retry logic with exponential backoff
//!
//! The orchestrator never retries on its own. Callers that want transient
//! failures retried (script fetches, engine boots, whole submissions) wrap the
//! operation in [`with_retry`], which gives up after a bounded number of
//! attempts and hands back a classified [`ErrorRecord`].
//!
//! # Example
//!
//! ```no_run
//! use moneyball_pipeline::config::{RetryConfig, ScriptSource};
//! use moneyball_pipeline::engine::fetch_script;
//! use moneyball_pipeline::retry::with_retry;
//!
//! # async fn example() {
//! let source = ScriptSource::Url("https://example.com/scripts/fm_processor.py".into());
//! match with_retry(&RetryConfig::default(), || fetch_script(&source)).await {
//!     Ok(script) => println!("{} bytes of script", script.len()),
//!     Err(record) => eprintln!("{} ({})", record.message, record.kind),
//! }
//! # }
//! ```

use crate::classifier::ErrorClassifier;
use crate::config::RetryConfig;
use crate::error::{Error, ErrorRecord};
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused connections, busy tools) should return `true`.
/// Permanent failures (bad input, missing binaries, script errors) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            Error::ExternalTool(msg) | Error::Environment { reason: msg, .. } => {
                is_transient_message(msg)
            }
            Error::Config { .. }
            | Error::IncompleteBatch { .. }
            | Error::Ingest { .. }
            | Error::Transform { .. }
            | Error::EmptyArtifact
            | Error::SessionAbandoned { .. }
            | Error::NotSupported(_)
            | Error::Serialization(_)
            | Error::Other(_) => false,
        }
    }
}

fn is_transient_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("timeout")
        || msg.contains("timed out")
        || msg.contains("busy")
        || msg.contains("temporar")
}

/// Execute an async operation with exponential backoff retry logic
///
/// `config.max_attempts` bounds the total number of calls. Non-retryable
/// errors stop immediately. The final error is classified by its description
/// with [`ErrorClassifier`].
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    mut operation: F,
) -> Result<T, ErrorRecord>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::info!(attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis(),
                    "Operation failed, retrying"
                );

                let jittered_delay = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };
                tokio::time::sleep(jittered_delay).await;

                delay = next_delay(delay, config);
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        "Operation failed after all retry attempts exhausted"
                    );
                } else {
                    tracing::error!(error = %e, "Operation failed with non-retryable error");
                }
                let mut record = ErrorClassifier::new().classify(&e);
                if let Some(details) = record.details.as_mut() {
                    details["attempts"] = serde_json::json!(attempt);
                }
                return Err(record);
            }
        }
    }
}

/// Grow a delay by the backoff multiplier, capped at `max_delay`
///
/// Multipliers that overflow or are not finite fall back to the cap.
fn next_delay(delay: Duration, config: &RetryConfig) -> Duration {
    Duration::try_from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier)
        .unwrap_or(config.max_delay)
        .min(config.max_delay)
}

/// Add random jitter to a delay
///
/// The result lies between `delay` and `2 * delay`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::try_from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor)).unwrap_or(delay)
}
