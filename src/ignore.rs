// src/ignore.rs

//! Ignored upgrade versions
//!
//! Each line of the file is `name:version`. When the repository offers
//! exactly that version of that package, the version difference is not
//! reported as an upgrade.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct IgnoreVersions {
    entries: HashSet<(String, String)>,
}

impl IgnoreVersions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .filter_map(|line| {
                let line = line.split('#').next().unwrap_or_default();
                let (name, version) = line.split_once(':')?;
                let (name, version) = (name.trim(), version.trim());
                (!name.is_empty() && !version.is_empty())
                    .then(|| (name.to_string(), version.to_string()))
            })
            .collect();
        Self { entries }
    }

    /// Load the file; a missing file ignores nothing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    pub fn insert(&mut self, name: impl Into<String>, version: impl Into<String>) {
        self.entries.insert((name.into(), version.into()));
    }

    pub fn is_ignored(&self, name: &str, version: &str) -> bool {
        self.entries.contains(&(name.to_string(), version.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
