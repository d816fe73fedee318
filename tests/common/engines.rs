//! Stub transformation engines

use async_trait::async_trait;
use moneyball_pipeline::engine::{EngineLauncher, EngineRuntime, TransformEngine, TransformInputs};
use moneyball_pipeline::{Error, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

/// Engine that skips acquisition work and returns a fixed result
#[derive(Clone)]
pub struct StubEngine {
    output: std::result::Result<Vec<u8>, String>,
    boots: Arc<AtomicU32>,
}

impl StubEngine {
    /// Engine returning `bytes`
    pub fn returning(bytes: &[u8]) -> Self {
        Self {
            output: Ok(bytes.to_vec()),
            boots: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Engine whose transform fails with `reason`
    pub fn failing(reason: &str) -> Self {
        Self {
            output: Err(reason.to_string()),
            boots: Arc::new(AtomicU32::new(0)),
        }
    }

    /// How many runtimes were booted
    pub fn boots(&self) -> u32 {
        self.boots.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EngineLauncher for StubEngine {
    async fn boot(&self) -> Result<Box<dyn EngineRuntime>> {
        self.boots.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.clone()))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

#[async_trait]
impl EngineRuntime for StubEngine {
    async fn load_packages(&mut self, _packages: &[String]) -> Result<()> {
        Ok(())
    }

    async fn install_packages(&mut self, _packages: &[String]) -> Result<()> {
        Ok(())
    }

    async fn load_script(&mut self, _source: &str) -> Result<()> {
        Ok(())
    }

    fn into_engine(self: Box<Self>) -> Result<Box<dyn TransformEngine>> {
        Ok(self)
    }
}

#[async_trait]
impl TransformEngine for StubEngine {
    async fn transform(&self, _inputs: TransformInputs) -> Result<Vec<u8>> {
        self.output.clone().map_err(Error::Other)
    }
}
