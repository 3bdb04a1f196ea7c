//! Publish command implementation

use colored::Colorize;
use vault_core::{BatchOutcome, BatchRequest, ProgressReporter};

use super::{find_files, to_vault_path};
use crate::context::VaultContext;
use crate::error::{CliError, Result};
use crate::progress::ProgressView;

/// Publish explicit paths, or everything that differs with `all`.
pub async fn run_publish(
    ctx: &VaultContext,
    paths: &[String],
    all: bool,
    delete: &[String],
) -> Result<()> {
    if !all && paths.is_empty() && delete.is_empty() {
        return Err(CliError::user(
            "Nothing to publish: pass file paths, --delete PATH or --all",
        ));
    }

    let vault = ctx.vault()?;
    let progress = ProgressReporter::new();
    let publisher = ctx.publisher(vault.clone(), progress.clone())?;

    let request = if all {
        None
    } else {
        Some(BatchRequest {
            files_to_publish: find_files(&vault, paths).await?,
            files_to_delete: delete.iter().map(|p| to_vault_path(p)).collect(),
        })
    };

    let view = ProgressView::spawn(&progress);
    let result = match request {
        None => publisher.publish_all().await,
        Some(request) => publisher.publish_batch(request).await.map(Some),
    };
    view.finish().await;

    match result? {
        Some(outcome) => report_outcome(&outcome),
        None => {
            println!("{} Site is up to date.", "✓".green());
            Ok(())
        }
    }
}

/// Print a batch outcome, failing if any upload failed.
pub fn report_outcome(outcome: &BatchOutcome) -> Result<()> {
    println!(
        "{} {} file(s) at {}",
        "Published".green().bold(),
        outcome.files_published,
        outcome.site_url.cyan()
    );
    if outcome.failed_uploads.is_empty() {
        return Ok(());
    }

    println!();
    println!("{}:", "Failed uploads".red().bold());
    for failed in &outcome.failed_uploads {
        println!("  {} {}: {}", "x".red(), failed.path, failed.message);
    }
    Err(CliError::user(format!(
        "{} upload(s) failed; run the command again to retry",
        outcome.failed_uploads.len()
    )))
}
