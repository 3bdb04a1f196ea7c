//! Vault Publisher CLI
//!
//! Publishes a notes vault to its website and reports how the two differ.

mod cli;
mod commands;
mod context;
mod error;
mod logging;
mod progress;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::VaultContext;
use error::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        println!("{} Vault Publisher", "vaultpub".green().bold());
        println!();
        println!("Run {} for available commands.", "vaultpub --help".cyan());
        return Ok(());
    };

    let ctx = VaultContext::detect(
        cli.vault.as_deref(),
        cli.token.as_deref(),
        cli.config_dir.as_deref(),
    )?;
    execute_command(&ctx, command).await
}

async fn execute_command(ctx: &VaultContext, command: Commands) -> Result<()> {
    match command {
        Commands::Init {
            site,
            root_dir,
            exclude,
            force,
        } => commands::run_init(ctx, &site, root_dir.as_deref(), &exclude, force),
        Commands::Status { json } => commands::run_status(ctx, json).await,
        Commands::Publish { paths, all, delete } => {
            commands::run_publish(ctx, &paths, all, &delete).await
        }
        Commands::Note { path, no_embeds } => commands::run_note(ctx, &path, no_embeds).await,
        Commands::Whoami => commands::run_whoami(ctx).await,
        Commands::Site => commands::run_site(ctx).await,
    }
}
