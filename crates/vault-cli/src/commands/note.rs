//! Note command implementation

use vault_core::ProgressReporter;

use super::find_files;
use super::publish::report_outcome;
use crate::context::VaultContext;
use crate::error::Result;
use crate::progress::ProgressView;

/// Publish one note, with its embeds unless `no_embeds`.
pub async fn run_note(ctx: &VaultContext, path: &str, no_embeds: bool) -> Result<()> {
    let vault = ctx.vault()?;
    let progress = ProgressReporter::new();
    let publisher = ctx.publisher(vault.clone(), progress.clone())?;

    let mut files = find_files(&vault, &[path.to_string()]).await?;
    let note = files.remove(0);

    let view = ProgressView::spawn(&progress);
    let result = publisher
        .publish_single_note_with_embeds(&note, !no_embeds)
        .await;
    view.finish().await;

    report_outcome(&result?)
}
