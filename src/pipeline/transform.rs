//! Transformation stage

use super::context::SessionContext;
use crate::error::{Error, Result};
use crate::types::Stage;
use tracing::{info, warn};

/// Hand the ingested texts to the engine
///
/// Progress is reported at entry and when the engine call returns output,
/// before that output is checked. A failed call reports nothing further and
/// the session moves straight to `Failed`.
pub(crate) async fn run_transform_stage(ctx: &mut SessionContext) -> Result<()> {
    info!(session = %ctx.id, "analyzing player data");
    ctx.reporter.report(Stage::Transform, 0);

    let engine = ctx.engine.as_ref().ok_or_else(|| Error::Transform {
        reason: "no engine was acquired for this session".into(),
    })?;
    let inputs = ctx.inputs.take().ok_or_else(|| Error::Transform {
        reason: "no ingested files to transform".into(),
    })?;

    let bytes = engine.transform(inputs).await.map_err(|e| match e {
        Error::Transform { .. } => e,
        other => Error::Transform {
            reason: other.to_string(),
        },
    })?;
    ctx.reporter.report(Stage::Transform, 90);

    if bytes.is_empty() {
        warn!(session = %ctx.id, "engine returned no bytes");
        return Err(Error::EmptyArtifact);
    }

    info!(session = %ctx.id, size_bytes = bytes.len(), "transformation complete");
    ctx.output = Some(bytes);
    ctx.reporter.complete_stage();
    Ok(())
}
