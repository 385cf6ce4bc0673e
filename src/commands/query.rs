// src/commands/query.rs
//! Browsing commands: list, search, info, dependency order

use super::Session;
use anyhow::{Context, Result};
use serde::Serialize;
use slackpick::{
    BuildItem, CachedRequirements, Catalog, DependencyResolver, InstalledPackage,
    LiveRequirements, PackageId, RepoRequirements, RequirementsProvider,
};
use std::path::Path;
use tracing::info;

/// Which packages `list` shows; every flag that is set must hold
#[derive(Debug, Default)]
pub struct ListFilter {
    pub installed: bool,
    pub upgradable: bool,
    pub non_deps: bool,
    pub blacklisted: bool,
    pub category: Option<String>,
}

/// List packages
pub fn cmd_list(config_path: Option<&Path>, filter: ListFilter) -> Result<()> {
    let session = Session::open(config_path)?;
    let catalog = &session.catalog;

    if let Some(category) = &filter.category {
        if !catalog.categories().contains(&category.as_str()) {
            return Err(anyhow::anyhow!("No category named '{}'", category));
        }
    }
    let ids = select(catalog, &filter);

    if ids.is_empty() {
        println!("No packages found.");
        return Ok(());
    }
    for &id in &ids {
        println!("  {}", describe(catalog.get(id)));
    }
    println!("\nTotal: {} package(s)", ids.len());
    Ok(())
}

/// Packages matching every condition of `filter`
fn select(catalog: &Catalog, filter: &ListFilter) -> Vec<PackageId> {
    let mut ids = catalog.filter(|item| {
        (!filter.installed || item.is_installed())
            && (!filter.upgradable || item.is_upgradable())
            && (!filter.blacklisted || item.blacklisted)
            && filter
                .category
                .as_ref()
                .is_none_or(|category| item.category == *category)
    });
    if filter.non_deps {
        let leaves = catalog.non_dependencies();
        ids.retain(|id| leaves.contains(id));
    }
    ids
}

/// Search package names
pub fn cmd_search(config_path: Option<&Path>, pattern: &str) -> Result<()> {
    let session = Session::open(config_path)?;
    let hits = session.catalog.search(pattern);

    if hits.is_empty() {
        println!("No packages matching '{}'.", pattern);
    } else {
        for &id in &hits {
            println!("  {}", describe(session.catalog.get(id)));
        }
        println!("\nFound {} package(s)", hits.len());
    }
    Ok(())
}

#[derive(Serialize)]
struct PackageInfo<'a> {
    name: &'a str,
    category: &'a str,
    available_version: &'a str,
    available_build: &'a str,
    requires: Vec<&'a str>,
    installed: Option<&'a InstalledPackage>,
    upgradable: bool,
    blacklisted: bool,
}

/// Show one package
pub fn cmd_info(config_path: Option<&Path>, package: &str, json: bool) -> Result<()> {
    let mut session = Session::open(config_path)?;
    let id = session.lookup(package)?;

    // Uninstalled packages have not had their repository files read yet
    if !session.catalog.get(id).is_installed() {
        session
            .catalog
            .load_repo_props(id)
            .with_context(|| format!("Failed to read repository files for {}", package))?;
    }

    let item = session.catalog.get(id);
    let details = PackageInfo {
        name: &item.name,
        category: &item.category,
        available_version: &item.available_version,
        available_build: &item.available_build,
        requires: item.requirement_names().collect(),
        installed: item.installed.as_ref(),
        upgradable: item.is_upgradable(),
        blacklisted: item.blacklisted,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&details)?);
        return Ok(());
    }

    println!("Package: {}", details.name);
    println!("  Category: {}", details.category);
    println!(
        "  Available: {} (build {})",
        details.available_version, details.available_build
    );
    match details.installed {
        Some(installed) => println!("  Installed: {}", installed.full_name),
        None => println!("  Installed: no"),
    }
    if details.requires.is_empty() {
        println!("  Requires: (none)");
    } else {
        println!("  Requires: {}", details.requires.join(" "));
    }
    if details.upgradable {
        println!("  Upgrade available");
    }
    if details.blacklisted {
        println!("  Blacklisted");
    }
    Ok(())
}

#[derive(Serialize)]
struct OrderEntry<'a> {
    name: &'a str,
    category: &'a str,
    installed: bool,
}

/// Show the build order of a package's dependencies
pub fn cmd_order(config_path: Option<&Path>, package: &str, live: bool, json: bool) -> Result<()> {
    let session = Session::open(config_path)?;
    let target = session.lookup(package)?;

    let requirements: &dyn RequirementsProvider = if live {
        &LiveRequirements
    } else {
        &RepoRequirements
    };
    let order = DependencyResolver::new(&session.catalog, requirements)
        .forward_order(target)
        .with_context(|| format!("Failed to resolve dependencies of {}", package))?;
    info!("{} dependencies for {}", order.len(), package);

    if json {
        let entries: Vec<OrderEntry> = order
            .iter()
            .map(|&id| {
                let item = session.catalog.get(id);
                OrderEntry {
                    name: &item.name,
                    category: &item.category,
                    installed: item.is_installed(),
                }
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    print_ids(&session, &order, &format!("{} has no dependencies.", package));
    Ok(())
}

/// Show installed packages that depend on a package
pub fn cmd_inverse(config_path: Option<&Path>, package: &str) -> Result<()> {
    let session = Session::open(config_path)?;
    let target = session.lookup(package)?;

    let installed = session.catalog.installed();
    let dependents = DependencyResolver::new(&session.catalog, &CachedRequirements)
        .inverse_order(target, &installed);

    print_ids(
        &session,
        &dependents,
        &format!("No installed packages depend on {}.", package),
    );
    Ok(())
}

fn print_ids(session: &Session, ids: &[PackageId], empty: &str) {
    if ids.is_empty() {
        println!("{}", empty);
        return;
    }
    for (i, &id) in ids.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, describe(session.catalog.get(id)));
    }
}

/// `category/name` followed by version state
fn describe(item: &BuildItem) -> String {
    let mut line = format!("{}/{}", item.category, item.name);
    if let Some(installed) = &item.installed {
        if item.is_upgradable() {
            line.push_str(&format!(
                " [{} -> {}-{}]",
                installed.version, item.available_version, item.available_build
            ));
        } else {
            line.push_str(&format!(" [{}]", installed.version));
        }
    }
    if item.blacklisted {
        line.push_str(" (blacklisted)");
    }
    line
}
