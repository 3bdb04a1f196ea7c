//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Vault Publisher - Publish a notes vault to its website
#[derive(Parser, Debug)]
#[command(name = "vaultpub")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Vault directory (defaults to the nearest directory containing .vaultpub)
    #[arg(long, global = true, value_name = "DIR")]
    pub vault: Option<PathBuf>,

    /// Personal access token, overriding the configured one
    #[arg(long, global = true, env = "VAULTPUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Directory holding the global config.toml
    #[arg(long, global = true, env = "VAULTPUB_CONFIG_DIR", hide = true)]
    pub config_dir: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the vault publisher configuration
    ///
    /// Writes .vaultpub/config.toml in the vault directory. Keep the access
    /// token in .vaultpub/config.local.toml or VAULTPUB_TOKEN.
    ///
    /// Examples:
    ///   vaultpub init --site garden
    ///   vaultpub init --site blog --root-dir public -e '^drafts/'
    Init {
        /// Name of the site to publish to
        #[arg(long)]
        site: String,

        /// Vault folder published as the site root
        #[arg(long)]
        root_dir: Option<String>,

        /// Exclusion pattern (regular expression); repeat for several
        #[arg(short, long = "exclude", value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Replace an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Compare the vault with the published site
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Publish files and unpublish removed ones
    ///
    /// Examples:
    ///   vaultpub publish --all
    ///   vaultpub publish notes/a.md img/b.png --delete old.md
    Publish {
        /// Vault paths to publish
        #[arg(value_name = "PATH")]
        paths: Vec<String>,

        /// Publish everything that differs from the site
        #[arg(long, conflicts_with_all = ["paths", "delete"])]
        all: bool,

        /// Vault paths to remove from the site
        #[arg(long, value_name = "PATH", num_args = 1..)]
        delete: Vec<String>,
    },

    /// Publish one note together with the files it embeds
    Note {
        /// Vault path of the note
        path: String,

        /// Publish the note alone
        #[arg(long)]
        no_embeds: bool,
    },

    /// Show the account the access token belongs to
    Whoami,

    /// Show the site this vault publishes to, creating it if needed
    Site,
}
