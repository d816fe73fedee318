//! Transformation engine plugin boundary
//!
//! The pipeline never computes the spreadsheet itself. It drives an external
//! engine through three traits:
//!
//! - [`EngineLauncher`]: boots a fresh sandboxed runtime
//! - [`EngineRuntime`]: loads capability packages, installs auxiliary
//!   packages and loads the processing script
//! - [`TransformEngine`]: runs the script on the three ingested texts
//!
//! Implementations provided:
//!
//! - [`PythonEngineLauncher`]: runs an external `python3` in a private temporary directory
//! - [`NoOpEngineLauncher`]: always fails to boot, for hosts without an interpreter
//!
//! ## Usage
//!
//! ```no_run
//! use moneyball_pipeline::engine::{
//!     EngineLauncher, NoOpEngineLauncher, PythonEngineLauncher,
//! };
//! use moneyball_pipeline::Config;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let launcher: Arc<dyn EngineLauncher> = match PythonEngineLauncher::from_config(&config.engine) {
//!     Some(python) => Arc::new(python),
//!     None => Arc::new(NoOpEngineLauncher),
//! };
//! ```

mod noop;
mod python;
mod script;
mod traits;

pub use noop::NoOpEngineLauncher;
pub use python::PythonEngineLauncher;
pub use script::fetch_script;
pub use traits::{EngineLauncher, EngineRuntime, TransformEngine, TransformInputs};
