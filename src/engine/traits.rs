//! Trait definitions for transformation engines

use crate::error::Result;
use async_trait::async_trait;

/// The three ingested texts, in the order the engine expects them
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransformInputs {
    /// Signed-player export
    pub primary: String,
    /// Loan-player export
    pub secondary: String,
    /// Universal-player export
    pub universal: String,
}

/// Acquires engines
///
/// Acquisition is phased: [`boot`](EngineLauncher::boot) yields an
/// [`EngineRuntime`], which then loads packages and the processing script
/// before it becomes a [`TransformEngine`]. Each phase can fail on its own.
/// A launcher may be asked to boot many times; every boot must produce an
/// independent runtime.
#[async_trait]
pub trait EngineLauncher: Send + Sync {
    /// Start a fresh sandboxed runtime
    async fn boot(&self) -> Result<Box<dyn EngineRuntime>>;

    /// Name of this launcher implementation (for logging)
    fn name(&self) -> &'static str;
}

/// A booted runtime that is not yet able to transform
#[async_trait]
pub trait EngineRuntime: Send {
    /// Make the capability packages available
    async fn load_packages(&mut self, packages: &[String]) -> Result<()>;

    /// Install auxiliary packages into the runtime
    async fn install_packages(&mut self, packages: &[String]) -> Result<()>;

    /// Load the processing script source
    async fn load_script(&mut self, source: &str) -> Result<()>;

    /// Finish acquisition
    ///
    /// Fails if no script has been loaded.
    fn into_engine(self: Box<Self>) -> Result<Box<dyn TransformEngine>>;
}

/// A ready engine: three texts in, spreadsheet bytes out
#[async_trait]
pub trait TransformEngine: Send + Sync {
    /// Run the processing script's entry point
    ///
    /// Returns the complete artifact; streaming is not supported.
    async fn transform(&self, inputs: TransformInputs) -> Result<Vec<u8>>;
}
