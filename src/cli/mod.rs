// src/cli/mod.rs
//! CLI definitions for slackpick
//!
//! Command implementations live in the `commands` module.
//!
//! Browsing:
//! - `list` - List packages, optionally filtered by state or category
//! - `search` - Search package names
//! - `info` - Show one package
//! - `order` / `inverse` - Dependency order and inverse dependents
//!
//! Changes:
//! - `install` / `upgrade` / `reinstall` / `remove` - Plan and apply
//! - `upgrade-all` - Upgrade every upgradable package
//! - `sync` - Refresh the repository tree

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slackpick")]
#[command(author, version)]
#[command(about = "Browse and install packages from a SlackBuilds repository", long_about = None)]
pub struct Cli {
    /// Configuration file (default: user config dir, then /etc/slackpick)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show informational log messages
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List packages in the repository
    List {
        /// Only installed packages
        #[arg(short, long)]
        installed: bool,

        /// Only packages with a newer version or build available
        #[arg(short, long)]
        upgradable: bool,

        /// Only installed packages no other installed package requires
        #[arg(long)]
        non_deps: bool,

        /// Only blacklisted packages
        #[arg(long)]
        blacklisted: bool,

        /// Restrict to one category
        #[arg(long)]
        category: Option<String>,
    },

    /// Search package names (case-insensitive substring)
    Search {
        /// Search pattern
        pattern: String,
    },

    /// Show details of a package
    Info {
        /// Package name
        package: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the build order of a package's dependencies
    Order {
        /// Package name
        package: String,

        /// Read requirements from the repository even for installed packages
        #[arg(long)]
        live: bool,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show installed packages that depend on a package
    Inverse {
        /// Package name
        package: String,
    },

    /// Install a package and its dependencies
    Install(PlanArgs),

    /// Upgrade a package
    Upgrade(PlanArgs),

    /// Reinstall a package
    Reinstall(PlanArgs),

    /// Remove a package
    Remove(PlanArgs),

    /// Upgrade every upgradable package that is not blacklisted
    UpgradeAll {
        #[command(flatten)]
        options: PlanOptions,
    },

    /// Update the repository tree with the configured sync command
    Sync,
}

/// Arguments shared by single-package plan commands
#[derive(Args)]
pub struct PlanArgs {
    /// Package name
    pub package: String,

    #[command(flatten)]
    pub options: PlanOptions,

    /// Mark a plan entry for execution (repeatable)
    #[arg(long, value_name = "PACKAGE")]
    pub mark: Vec<String>,

    /// Unmark a plan entry (repeatable)
    #[arg(long, value_name = "PACKAGE")]
    pub unmark: Vec<String>,
}

#[derive(Args)]
pub struct PlanOptions {
    /// Do not resolve dependencies
    #[arg(long)]
    pub no_deps: bool,

    /// Rebuild installed packages that depend on an upgraded package
    #[arg(long)]
    pub rebuild_inverse_deps: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Show the plan without applying it
    #[arg(long)]
    pub dry_run: bool,
}
