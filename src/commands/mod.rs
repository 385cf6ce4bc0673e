// src/commands/mod.rs
//! Command handlers for the slackpick CLI

mod apply;
mod prompt;
mod query;
mod sync;

pub use apply::{cmd_apply, cmd_upgrade_all};
pub use query::{cmd_info, cmd_inverse, cmd_list, cmd_order, cmd_search, ListFilter};
pub use sync::cmd_sync;

use anyhow::{Context, Result};
use slackpick::{Blacklist, Catalog, Config, IgnoreVersions, PackageId, PackageLog};
use std::path::Path;
use tracing::warn;

/// Configuration plus a catalog refreshed against the installed packages
pub struct Session {
    pub config: Config,
    pub catalog: Catalog,
}

impl Session {
    /// Load configuration and build the catalog
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load(config_path).context("Failed to load configuration")?;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        let mut catalog = Catalog::load(&config.repo_dir).with_context(|| {
            format!("Failed to read repository {}", config.repo_dir.display())
        })?;

        let blacklist =
            Blacklist::load(&config.blacklist_file).context("Failed to load blacklist")?;
        let ignore = IgnoreVersions::load(&config.ignore_versions_file)
            .context("Failed to load ignored versions")?;

        let log = if config.package_dir.is_dir() {
            PackageLog::read(&config.package_dir).context("Failed to read installed packages")?
        } else {
            warn!(
                "Package log {} not found, treating all packages as not installed",
                config.package_dir.display()
            );
            PackageLog::default()
        };

        catalog
            .refresh_installed(&log, &blacklist, &ignore)
            .context("Failed to refresh installed state")?;

        Ok(Self { config, catalog })
    }

    /// Id of a package by name
    pub fn lookup(&self, name: &str) -> Result<PackageId> {
        Ok(self.catalog.require(name)?)
    }
}
