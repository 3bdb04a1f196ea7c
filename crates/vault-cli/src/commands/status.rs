//! Status command implementation

use colored::Colorize;
use vault_core::{ProgressReporter, PublishStatus, StatusSource, VaultFile};

use crate::context::VaultContext;
use crate::error::Result;

/// Print how the vault differs from its site.
pub async fn run_status(ctx: &VaultContext, json: bool) -> Result<()> {
    let vault = ctx.vault()?;
    let publisher = ctx.publisher(vault, ProgressReporter::new())?;
    let status = publisher.get_publish_status().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Publish Status".bold());
    println!();
    println!("{}:   {}", "Vault".dimmed(), ctx.root().display());
    println!("{}:    {}", "Site".dimmed(), publisher.settings().site_name.cyan());
    if !publisher.policy().root_dir().is_empty() {
        println!("{}:    {}", "Root".dimmed(), publisher.policy().root_dir());
    }
    match status.source {
        StatusSource::Remote => {}
        StatusSource::NoSite => println!(
            "{}",
            "Site has not been created yet; everything is new.".yellow()
        ),
        StatusSource::Unreachable => println!(
            "{}",
            "Could not reach the site; showing every file as new.".yellow()
        ),
    }
    println!();

    print_files("New", &status.new_files, "+".green());
    print_files("Changed", &status.changed, "~".yellow());
    print_paths("Deleted", &status.deleted, "-".red());
    println!(
        "{} unchanged, {} to publish, {} to delete",
        status.unchanged.len(),
        status.new_files.len() + status.changed.len(),
        status.deleted.len()
    );
    print_hint(&status);
    Ok(())
}

fn print_files(title: &str, files: &[VaultFile], marker: colored::ColoredString) {
    if files.is_empty() {
        return;
    }
    println!("{}:", title.bold());
    for file in files {
        println!("  {} {}", marker, file.path);
    }
    println!();
}

fn print_paths(title: &str, paths: &[String], marker: colored::ColoredString) {
    if paths.is_empty() {
        return;
    }
    println!("{}:", title.bold());
    for path in paths {
        println!("  {} {}", marker, path);
    }
    println!();
}

fn print_hint(status: &PublishStatus) {
    if status.has_differences() && status.source != StatusSource::Unreachable {
        println!();
        println!("Run {} to publish these changes.", "vaultpub publish --all".cyan());
    }
}
