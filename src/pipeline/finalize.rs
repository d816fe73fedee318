//! Finalize stage

use super::context::SessionContext;
use crate::artifact::ArtifactHandoff;
use crate::error::{Error, Result};
use crate::types::Stage;
use tracing::info;

/// Wrap the engine output into a downloadable artifact
pub(crate) fn run_finalize_stage(ctx: &mut SessionContext) -> Result<ArtifactHandoff> {
    let bytes = ctx.output.take().ok_or(Error::EmptyArtifact)?;

    ctx.reporter.report(Stage::Finalize, 100);
    let artifact = ArtifactHandoff::new(bytes, &ctx.config.artifact);
    ctx.reporter.complete_stage();
    ctx.reporter
        .finish(artifact.file_name(), artifact.len() as u64);

    info!(
        session = %ctx.id,
        file_name = artifact.file_name(),
        size_bytes = artifact.len(),
        "artifact ready"
    );
    Ok(artifact)
}
