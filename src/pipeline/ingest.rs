//! File ingestion stage

use super::context::SessionContext;
use crate::engine::TransformInputs;
use crate::error::{Error, Result};
use crate::types::{Role, Stage};
use tracing::{debug, info};

/// Read the three files in role order
///
/// Each read contributes an equal share of the stage's progress.
pub(crate) async fn run_ingest_stage(ctx: &mut SessionContext) -> Result<()> {
    info!(session = %ctx.id, "reading upload files");
    ctx.reporter.report(Stage::Ingest, 0);

    let total = ctx.files.len().max(1);
    let mut texts = Vec::with_capacity(total);

    for (i, (role, file)) in ctx.files.iter().enumerate() {
        debug!(session = %ctx.id, %role, name = file.name(), "reading file");
        let text = file.read_text().await.map_err(|e| Error::Ingest {
            role: *role,
            reason: e.to_string(),
        })?;
        texts.push((*role, text));

        let percent = ((i + 1) * 100 / total) as u8;
        ctx.reporter.report(Stage::Ingest, percent);
    }

    let mut inputs = TransformInputs::default();
    for (role, text) in texts {
        match role {
            Role::Primary => inputs.primary = text,
            Role::Secondary => inputs.secondary = text,
            Role::Universal => inputs.universal = text,
        }
    }

    ctx.inputs = Some(inputs);
    ctx.reporter.complete_stage();
    Ok(())
}
