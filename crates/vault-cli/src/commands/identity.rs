//! Whoami and site commands

use colored::Colorize;
use vault_client::SiteApi;
use vault_core::ProgressReporter;

use crate::context::VaultContext;
use crate::error::Result;

pub async fn run_whoami(ctx: &VaultContext) -> Result<()> {
    let user = ctx.client()?.get_user_info().await?;
    println!("{}", user.username.cyan().bold());
    if let Some(email) = user.email {
        println!("{}: {}", "Email".dimmed(), email);
    }
    Ok(())
}

/// Resolve the configured site, creating it on first use.
pub async fn run_site(ctx: &VaultContext) -> Result<()> {
    let vault = ctx.vault()?;
    let publisher = ctx.publisher(vault, ProgressReporter::new())?;
    let site = publisher.ensure_site().await?;

    println!("{}: {}", "Site".dimmed(), site.name.cyan());
    println!("{}:   {}", "URL".dimmed(), site.url);
    println!("{}:    {}", "ID".dimmed(), site.id);
    Ok(())
}
