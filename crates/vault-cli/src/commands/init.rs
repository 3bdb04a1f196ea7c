//! Init command implementation

use colored::Colorize;
use vault_meta::SettingsLayer;

use crate::context::VaultContext;
use crate::error::{CliError, Result};

/// Write `.vaultpub/config.toml` for the vault.
pub fn run_init(
    ctx: &VaultContext,
    site: &str,
    root_dir: Option<&str>,
    exclude: &[String],
    force: bool,
) -> Result<()> {
    let loader = ctx.loader();
    if loader.has_config() && !force {
        return Err(CliError::user(format!(
            "{} already exists (use --force to replace it)",
            loader.config_path()
        )));
    }
    if site.trim().is_empty() {
        return Err(CliError::user("Site name must not be empty"));
    }

    let layer = SettingsLayer {
        site_name: Some(site.trim().to_string()),
        root_dir: root_dir.map(str::to_string),
        exclude_patterns: (!exclude.is_empty()).then(|| exclude.to_vec()),
        ..SettingsLayer::default()
    };
    loader.save(&layer)?;

    println!(
        "{} vault publishing to site {}",
        "Initialized".green().bold(),
        site.cyan()
    );
    println!("{}: {}", "Config".dimmed(), loader.config_path());
    println!();
    println!(
        "Put your access token in {} or set {}.",
        loader.local_config_path().to_string().cyan(),
        "VAULTPUB_TOKEN".cyan()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context(temp: &TempDir) -> VaultContext {
        VaultContext::detect(Some(temp.path()), None, Some(&temp.path().join("global"))).unwrap()
    }

    #[test]
    fn test_init_writes_config() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);

        run_init(&ctx, "garden", Some("public"), &["^drafts/".to_string()], false).unwrap();

        let content = std::fs::read_to_string(temp.path().join(".vaultpub/config.toml")).unwrap();
        assert!(content.contains("site_name = \"garden\""));
        assert!(content.contains("root_dir = \"public\""));
        assert!(content.contains("^drafts/"));
        assert!(!content.contains("access_token"));
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        run_init(&ctx, "garden", None, &[], false).unwrap();

        let err = run_init(&ctx, "other", None, &[], false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        run_init(&ctx, "other", None, &[], true).unwrap();
        let content = std::fs::read_to_string(temp.path().join(".vaultpub/config.toml")).unwrap();
        assert!(content.contains("other"));
    }

    #[test]
    fn test_init_without_exclusions_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let ctx = context(&temp);
        run_init(&ctx, "garden", None, &[], false).unwrap();

        let settings = ctx.loader().resolve().unwrap();
        assert_eq!(settings.site_name, "garden");
        assert!(settings.path_policy().is_excluded("board.excalidraw.md"));
    }
}
