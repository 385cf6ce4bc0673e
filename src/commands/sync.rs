// src/commands/sync.rs
//! Repository synchronization

use anyhow::{Context, Result};
use slackpick::{Config, EXIT_TOOL_NOT_FOUND, ShellCommandRunner};
use std::path::Path;
use tracing::info;

/// Run the configured sync command
pub fn cmd_sync(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    info!("Syncing repository with: {}", config.sync_cmd);

    let code = ShellCommandRunner::new(&config)
        .sync()
        .context("Failed to run sync command")?;
    match code {
        0 => {
            println!("Repository synced.");
            Ok(())
        }
        EXIT_TOOL_NOT_FOUND => Err(anyhow::anyhow!(
            "Sync command not found: {}",
            config.sync_cmd
        )),
        code => Err(anyhow::anyhow!("Sync failed with exit code {}", code)),
    }
}
