// src/main.rs

use anyhow::Result;
use clap::Parser;
use slackpick::ActionKind;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = cli.config.as_deref();

    match cli.command {
        Commands::List {
            installed,
            upgradable,
            non_deps,
            blacklisted,
            category,
        } => commands::cmd_list(
            config,
            commands::ListFilter {
                installed,
                upgradable,
                non_deps,
                blacklisted,
                category,
            },
        ),
        Commands::Search { pattern } => commands::cmd_search(config, &pattern),
        Commands::Info { package, json } => commands::cmd_info(config, &package, json),
        Commands::Order {
            package,
            live,
            json,
        } => commands::cmd_order(config, &package, live, json),
        Commands::Inverse { package } => commands::cmd_inverse(config, &package),
        Commands::Install(args) => commands::cmd_apply(config, ActionKind::Install, &args),
        Commands::Upgrade(args) => commands::cmd_apply(config, ActionKind::Upgrade, &args),
        Commands::Reinstall(args) => commands::cmd_apply(config, ActionKind::Reinstall, &args),
        Commands::Remove(args) => commands::cmd_apply(config, ActionKind::Remove, &args),
        Commands::UpgradeAll { options } => commands::cmd_upgrade_all(config, &options),
        Commands::Sync => commands::cmd_sync(config),
    }
}
