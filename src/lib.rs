//! # moneyball-pipeline
//!
//! Validation and processing pipeline for football-management player exports.
//!
//! Three HTML table exports (signed players, loan players, every player) are
//! checked, read and handed to an external transformation engine that turns
//! them into a spreadsheet report.
//!
//! ## Design Philosophy
//!
//! moneyball-pipeline is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events and progress snapshots
//! - **Engine-agnostic** - The transformation runs behind a trait boundary
//! - **Fail-clean** - Every failure ends in a classified, user-presentable error
//!
//! ## Quick Start
//!
//! ```no_run
//! use moneyball_pipeline::engine::PythonEngineLauncher;
//! use moneyball_pipeline::upload::FileHandle;
//! use moneyball_pipeline::{Config, Orchestrator, Role};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let launcher = PythonEngineLauncher::from_config(&config.engine)
//!         .ok_or("python3 not found")?;
//!     let orchestrator = Orchestrator::new(config, Arc::new(launcher))?;
//!
//!     // Subscribe to events
//!     let mut events = orchestrator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let mut batch = orchestrator.new_batch();
//!     batch.assign(Role::Primary, FileHandle::from_path("signed.html").await?);
//!     batch.assign(Role::Secondary, FileHandle::from_path("loans.html").await?);
//!     batch.assign(Role::Universal, FileHandle::from_path("players.html").await?);
//!
//!     let session = orchestrator.submit(&batch).await?;
//!     match session.artifact() {
//!         Some(artifact) => std::fs::write(artifact.file_name(), artifact.bytes())?,
//!         None => eprintln!("{:?}", session.error()),
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Result artifact handoff
pub mod artifact;
/// Keyword-based error classification
pub mod classifier;
/// Configuration types
pub mod config;
/// Transformation engine plugin boundary
pub mod engine;
/// Error types
pub mod error;
/// Processing pipeline orchestration
pub mod pipeline;
/// Session progress tracking
pub mod progress;
/// Retry logic with exponential backoff
pub mod retry;
/// Core types and events
pub mod types;
/// Upload validation and batching
pub mod upload;

// Re-export commonly used types
pub use artifact::ArtifactHandoff;
pub use classifier::ErrorClassifier;
pub use config::Config;
pub use error::{Error, ErrorKind, ErrorRecord, Result};
pub use pipeline::{Orchestrator, ProcessingSession};
pub use progress::{ProgressReporter, ProgressSnapshot};
pub use types::{Event, Role, SessionId, Stage};
pub use upload::{FileHandle, FileValidator, UploadBatch};
