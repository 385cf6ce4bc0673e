// src/catalog/installed.rs

//! Installed package state
//!
//! Slackware records every installed package as a file in the package log
//! directory (normally `/var/log/packages`), named after the full package
//! name.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::package::InstalledPackage;

/// Source of installed-package facts
pub trait InstalledStateProvider {
    /// Installed package with the given name, if any
    fn query(&self, name: &str) -> Option<InstalledPackage>;
}

/// Installed packages read from the package log directory
#[derive(Debug, Clone, Default)]
pub struct PackageLog {
    packages: HashMap<String, InstalledPackage>,
}

impl PackageLog {
    /// Read all entries of a package log directory
    ///
    /// Entries whose names do not parse as package names are skipped.
    pub fn read(dir: &Path) -> Result<Self> {
        let entries = fs::read_dir(dir).map_err(|source| Error::Read {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }

        let log = Self::from_names(names.iter().map(String::as_str));
        debug!("Read {} installed package(s) from {}", log.len(), dir.display());
        Ok(log)
    }

    /// Build from full package names
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut packages = HashMap::new();
        for full_name in names {
            match InstalledPackage::parse(full_name) {
                Ok(package) => {
                    packages.insert(package.name.clone(), package);
                }
                Err(e) => warn!("Skipping package log entry: {}", e),
            }
        }
        Self { packages }
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&InstalledPackage> {
        self.packages.get(name)
    }
}

impl InstalledStateProvider for PackageLog {
    fn query(&self, name: &str) -> Option<InstalledPackage> {
        self.packages.get(name).cloned()
    }
}
