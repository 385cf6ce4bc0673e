// src/blacklist.rs

//! Package blacklist
//!
//! The blacklist file holds one regular expression per line; `#` starts a
//! comment. A pattern blacklists an installed package when it matches the
//! whole of any field of its identity: name, version, arch, build, or the
//! full package name. Packages that are not installed are matched on their
//! name only.

use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::{Error, Result};
use crate::package::InstalledPackage;

/// Compiled blacklist patterns
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    patterns: Vec<Regex>,
}

impl Blacklist {
    /// An empty blacklist that matches nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a list of patterns
    pub fn from_patterns<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let patterns = patterns
            .into_iter()
            .map(compile_anchored)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Parse blacklist file content
    pub fn parse(content: &str) -> Result<Self> {
        Self::from_patterns(content.lines().filter_map(pattern_line))
    }

    /// Load the blacklist file; a missing file yields an empty blacklist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No blacklist at {}", path.display());
            return Ok(Self::new());
        }
        let content = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let blacklist = Self::parse(&content)?;
        debug!("Loaded {} blacklist pattern(s) from {}", blacklist.len(), path.display());
        Ok(blacklist)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check an installed package identity
    pub fn matches(
        &self,
        name: &str,
        version: &str,
        arch: &str,
        build: &str,
        full_name: &str,
    ) -> bool {
        let fields = [name, version, arch, build, full_name];
        self.patterns
            .iter()
            .any(|pattern| fields.iter().any(|field| pattern.is_match(field)))
    }

    pub fn matches_installed(&self, package: &InstalledPackage) -> bool {
        self.matches(
            &package.name,
            &package.version,
            &package.arch,
            &package.build,
            &package.full_name,
        )
    }

    /// Check a package that is not installed, by name only
    pub fn matches_name(&self, name: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(name))
    }
}

/// Strip comments and whitespace; `None` for blank lines
fn pattern_line(line: &str) -> Option<&str> {
    let line = line.split('#').next().unwrap_or_default().trim();
    (!line.is_empty()).then_some(line)
}

fn compile_anchored(pattern: &str) -> Result<Regex> {
    Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}
