//! No-op engine launcher for graceful degradation

use super::traits::{EngineLauncher, EngineRuntime};
use async_trait::async_trait;

/// Launcher used when no interpreter is available
///
/// Every boot fails with `Error::NotSupported`, so sessions fail cleanly in
/// environment initialization instead of at construction time.
///
/// ```
/// use moneyball_pipeline::engine::{EngineLauncher, NoOpEngineLauncher};
///
/// # #[tokio::main]
/// # async fn main() {
/// assert!(NoOpEngineLauncher.boot().await.is_err());
/// # }
/// ```
pub struct NoOpEngineLauncher;

#[async_trait]
impl EngineLauncher for NoOpEngineLauncher {
    async fn boot(&self) -> crate::Result<Box<dyn EngineRuntime>> {
        Err(crate::Error::NotSupported(
            "transformation requires a python3 interpreter. \
             Configure engine.interpreter or ensure python3 is in PATH."
                .into(),
        ))
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}
