// src/catalog/mod.rs

//! Repository catalog
//!
//! The catalog is an arena of [`BuildItem`]s indexed by [`PackageId`], plus a
//! name index. A repository tree looks like:
//!
//! ```text
//! <repo_dir>/<category>/<name>/<name>.info
//! <repo_dir>/<category>/<name>/<name>.SlackBuild
//! ```
//!
//! Loading only records names and categories. Repository facts (version,
//! build, requirements) are read for installed packages during
//! [`Catalog::refresh_installed`] and on demand for everything else.
//!
//! Items are never removed from the arena, so a `PackageId` stays valid for
//! the life of the catalog it came from.

mod installed;

pub use installed::{InstalledStateProvider, PackageLog};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::blacklist::Blacklist;
use crate::error::{Error, Result};
use crate::ignore::IgnoreVersions;
use crate::package::{BuildItem, InfoFile, PackageId, read_build_number};

/// The set of known packages for one repository snapshot
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<BuildItem>,
    by_name: HashMap<String, PackageId>,
    repo_dir: Option<PathBuf>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an in-memory catalog
    pub fn from_items(items: impl IntoIterator<Item = BuildItem>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        catalog
    }

    /// Scan a repository directory for `<category>/<name>` entries
    pub fn load(repo_dir: &Path) -> Result<Self> {
        if !repo_dir.is_dir() {
            return Err(Error::Read {
                path: repo_dir.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }

        let mut catalog = Self {
            repo_dir: Some(repo_dir.to_path_buf()),
            ..Self::default()
        };

        let walker = WalkDir::new(repo_dir)
            .min_depth(1)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()));

        for entry in walker {
            let entry = entry.map_err(|e| Error::Read {
                path: repo_dir.to_path_buf(),
                source: e.into(),
            })?;
            if entry.depth() != 2 || !entry.file_type().is_dir() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            let category = entry
                .path()
                .parent()
                .and_then(Path::file_name)
                .map(|c| c.to_string_lossy().into_owned())
                .unwrap_or_default();
            catalog.insert(BuildItem::new(name, category));
        }

        info!("Loaded {} package(s) from {}", catalog.len(), repo_dir.display());
        Ok(catalog)
    }

    /// Add an item; a name already present keeps its first entry
    pub fn insert(&mut self, item: BuildItem) -> PackageId {
        if let Some(&existing) = self.by_name.get(&item.name) {
            warn!(
                "Duplicate package {} in {} (keeping {})",
                item.name, item.category, self.items[existing.0].category
            );
            return existing;
        }
        let id = PackageId(self.items.len());
        self.by_name.insert(item.name.clone(), id);
        self.items.push(item);
        id
    }

    pub fn repo_dir(&self) -> Option<&Path> {
        self.repo_dir.as_deref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item for an id handed out by this catalog
    pub fn get(&self, id: PackageId) -> &BuildItem {
        &self.items[id.0]
    }

    pub fn get_mut(&mut self, id: PackageId) -> &mut BuildItem {
        &mut self.items[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<PackageId> {
        self.by_name.get(name).copied()
    }

    pub fn find(&self, name: &str) -> Option<&BuildItem> {
        self.lookup(name).map(|id| self.get(id))
    }

    /// Look up a name, failing with [`Error::UnknownPackage`]
    pub fn require(&self, name: &str) -> Result<PackageId> {
        self.lookup(name)
            .ok_or_else(|| Error::UnknownPackage(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PackageId, &BuildItem)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (PackageId(i), item))
    }

    /// Sorted, deduplicated category names
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self.items.iter().map(|i| i.category.as_str()).collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    /// Ids matching a predicate, ordered by category then name
    pub fn filter(&self, predicate: impl Fn(&BuildItem) -> bool) -> Vec<PackageId> {
        let mut ids: Vec<PackageId> = self
            .iter()
            .filter(|(_, item)| predicate(item))
            .map(|(id, _)| id)
            .collect();
        ids.sort_by(|a, b| {
            let (a, b) = (self.get(*a), self.get(*b));
            (a.category.as_str(), a.name.as_str()).cmp(&(b.category.as_str(), b.name.as_str()))
        });
        ids
    }

    pub fn installed(&self) -> Vec<PackageId> {
        self.filter(BuildItem::is_installed)
    }

    pub fn upgradable(&self) -> Vec<PackageId> {
        self.filter(BuildItem::is_upgradable)
    }

    pub fn blacklisted(&self) -> Vec<PackageId> {
        self.filter(|item| item.blacklisted)
    }

    /// Installed packages that no other installed package requires
    pub fn non_dependencies(&self) -> Vec<PackageId> {
        let installed = self.installed();
        installed
            .iter()
            .copied()
            .filter(|&id| {
                let name = &self.get(id).name;
                !installed
                    .iter()
                    .any(|&other| other != id && self.get(other).requires_package(name))
            })
            .collect()
    }

    /// Case-insensitive substring search over package names
    pub fn search(&self, pattern: &str) -> Vec<PackageId> {
        let pattern = pattern.to_lowercase();
        self.filter(|item| item.name.to_lowercase().contains(&pattern))
    }

    /// Path of a package's directory in the repository tree
    pub fn package_dir(&self, id: PackageId) -> Option<PathBuf> {
        let item = self.get(id);
        self.repo_dir
            .as_ref()
            .map(|dir| dir.join(&item.category).join(&item.name))
    }

    pub fn info_path(&self, id: PackageId) -> Option<PathBuf> {
        let name = &self.get(id).name;
        self.package_dir(id).map(|dir| dir.join(format!("{}.info", name)))
    }

    /// Read an item's `.info` file without touching the catalog
    pub fn read_info(&self, id: PackageId) -> Result<Option<InfoFile>> {
        match self.info_path(id) {
            Some(path) => InfoFile::read(&path).map(Some),
            None => Ok(None),
        }
    }

    /// Read version, build number and requirements from the repository
    ///
    /// A no-op for in-memory catalogs.
    pub fn load_repo_props(&mut self, id: PackageId) -> Result<()> {
        let Some(info) = self.read_info(id)? else {
            return Ok(());
        };
        let build = self
            .package_dir(id)
            .map(|dir| dir.join(format!("{}.SlackBuild", self.get(id).name)))
            .and_then(|script| fs::read_to_string(script).ok())
            .and_then(|script| read_build_number(&script))
            .unwrap_or_else(|| "1".to_string());

        let item = self.get_mut(id);
        item.available_version = info.version().to_string();
        item.requires = info.requires().to_string();
        item.available_build = build;
        Ok(())
    }

    /// Re-query installed state and recompute derived flags
    ///
    /// Installed packages get their repository facts re-read so that their
    /// cached requirements match the last synced tree.
    pub fn refresh_installed(
        &mut self,
        provider: &dyn InstalledStateProvider,
        blacklist: &Blacklist,
        ignore: &IgnoreVersions,
    ) -> Result<()> {
        let mut installed_count = 0;

        for index in 0..self.items.len() {
            let id = PackageId(index);
            let installed = provider.query(&self.items[index].name);

            if installed.is_some() {
                installed_count += 1;
                if let Err(e) = self.load_repo_props(id) {
                    warn!("Cannot read repository data for {}: {}", self.items[index].name, e);
                }
            }

            let item = &mut self.items[index];
            item.blacklisted = match &installed {
                Some(package) => blacklist.matches_installed(package),
                None => blacklist.matches_name(&item.name),
            };
            item.version_ignored = ignore.is_ignored(&item.name, &item.available_version);
            item.installed = installed;
        }

        debug!("{} of {} package(s) installed", installed_count, self.items.len());
        Ok(())
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}
