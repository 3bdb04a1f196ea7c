//! Command implementations for vault-cli

pub mod identity;
pub mod init;
pub mod note;
pub mod publish;
pub mod status;

pub use identity::{run_site, run_whoami};
pub use init::run_init;
pub use note::run_note;
pub use publish::run_publish;
pub use status::run_status;

use vault_core::{LocalVault, Vault, VaultFile};

use crate::error::{CliError, Result};

/// Turn a path typed on the command line into a vault path.
pub fn to_vault_path(input: &str) -> String {
    let path = input.replace('\\', "/");
    let path = path.trim_start_matches("./").trim_start_matches('/');
    path.to_string()
}

/// Look up command-line paths among the vault's files.
pub async fn find_files(vault: &LocalVault, inputs: &[String]) -> Result<Vec<VaultFile>> {
    let files = vault.list_files().await?;
    inputs
        .iter()
        .map(|input| {
            let path = to_vault_path(input);
            files
                .iter()
                .find(|file| file.path == path)
                .cloned()
                .ok_or_else(|| CliError::user(format!("No such file in vault: {}", input)))
        })
        .collect()
}
