// src/package/mod.rs

//! Package data model
//!
//! A [`BuildItem`] is one SlackBuild known to the repository. Repository
//! facts (version, build number, requirements) come from the `.info` and
//! `.SlackBuild` files; installed facts come from the package log and are
//! attached as an [`InstalledPackage`].
//!
//! Items live in a [`Catalog`](crate::catalog::Catalog) arena and are
//! referenced everywhere else by [`PackageId`].

pub mod info;

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

pub use info::{InfoFile, read_build_number};

/// `requires` entry meaning "read the README", not an installable package
pub const README_SENTINEL: &str = "%README%";

/// Stable index of a package inside a catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PackageId(pub(crate) usize);

impl PackageId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Split a `requires` string into dependency names, dropping `%README%`
pub fn requirement_names(requires: &str) -> impl Iterator<Item = &str> {
    requires
        .split_whitespace()
        .filter(|name| *name != README_SENTINEL)
}

/// An installed package as recorded in the package log
///
/// Slackware package names have the form `name-version-arch-build[tag]`,
/// where `name` itself may contain dashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub arch: String,
    /// Build field including any repository tag, e.g. `1_SBo`
    pub build: String,
    /// Full package name, e.g. `libfoo-1.2-x86_64-1_SBo`
    pub full_name: String,
}

impl InstalledPackage {
    /// Parse a full package name
    pub fn parse(full_name: &str) -> Result<Self> {
        let full_name = full_name.trim();
        let mut fields = full_name.rsplitn(4, '-');
        let build = fields.next().unwrap_or_default();
        let arch = fields.next().unwrap_or_default();
        let version = fields.next().unwrap_or_default();
        let name = fields.next().unwrap_or_default();

        if [name, version, arch, build].iter().any(|f| f.is_empty()) {
            return Err(Error::InvalidPackageName(full_name.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            arch: arch.to_string(),
            build: build.to_string(),
            full_name: full_name.to_string(),
        })
    }

    /// Numeric part of the build field (`1_SBo` -> `1`)
    pub fn build_number(&self) -> &str {
        let end = self
            .build
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.build.len());
        &self.build[..end]
    }

    /// Whether the full name carries the given repository tag suffix
    pub fn has_tag(&self, repo_tag: &str) -> bool {
        self.full_name.ends_with(repo_tag)
    }
}

/// One package in the repository
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildItem {
    pub name: String,
    pub category: String,
    /// Whitespace-separated dependency names, may contain `%README%`
    pub requires: String,
    pub available_version: String,
    pub available_build: String,
    /// Installed state, `None` when the package is not installed
    pub installed: Option<InstalledPackage>,
    /// Set during the installed-state refresh from the blacklist
    ///
    /// Packages that are not installed are matched by name only; the flag
    /// is then informational and never changes a plan.
    pub blacklisted: bool,
    /// Set when the available version is listed in the ignore-versions file
    pub version_ignored: bool,
}

impl BuildItem {
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            available_build: "1".to_string(),
            ..Default::default()
        }
    }

    pub fn with_requires(mut self, requires: impl Into<String>) -> Self {
        self.requires = requires.into();
        self
    }

    pub fn with_available(mut self, version: impl Into<String>, build: impl Into<String>) -> Self {
        self.available_version = version.into();
        self.available_build = build.into();
        self
    }

    pub fn with_installed(mut self, installed: InstalledPackage) -> Self {
        self.installed = Some(installed);
        self
    }

    pub fn with_blacklisted(mut self, blacklisted: bool) -> Self {
        self.blacklisted = blacklisted;
        self
    }

    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    pub fn installed_version(&self) -> Option<&str> {
        self.installed.as_ref().map(|p| p.version.as_str())
    }

    pub fn package_full_name(&self) -> Option<&str> {
        self.installed.as_ref().map(|p| p.full_name.as_str())
    }

    /// Dependency names with `%README%` removed
    pub fn requirement_names(&self) -> impl Iterator<Item = &str> {
        requirement_names(&self.requires)
    }

    /// Whether this item names `dependency` in its cached requirements
    pub fn requires_package(&self, dependency: &str) -> bool {
        self.requirement_names().any(|name| name == dependency)
    }

    /// Installed and either the version or the build number differs
    ///
    /// An installed version equal to the available version plus a kernel
    /// tag (`1.0_6.1.55`) counts as the same version.
    pub fn is_upgradable(&self) -> bool {
        let Some(installed) = &self.installed else {
            return false;
        };

        let version_differs = !self.version_ignored
            && installed.version != self.available_version
            && !has_kernel_tag(&installed.version, &self.available_version);

        version_differs || installed.build_number() != self.available_build
    }

    /// Installed and matched by the blacklist
    pub fn is_installed_blacklisted(&self) -> bool {
        self.is_installed() && self.blacklisted
    }
}

/// `installed` is `available` followed by `_<major>.<minor>.<patch>`
fn has_kernel_tag(installed: &str, available: &str) -> bool {
    let Some(tag) = installed
        .strip_prefix(available)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };

    let parts: Vec<&str> = tag.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn installed(full_name: &str) -> InstalledPackage {
        InstalledPackage::parse(full_name).unwrap()
    }

    #[test]
    fn test_parse_package_name() {
        let pkg = installed("python3-build-1.0.3-noarch-2_SBo");
        assert_eq!(pkg.name, "python3-build");
        assert_eq!(pkg.version, "1.0.3");
        assert_eq!(pkg.arch, "noarch");
        assert_eq!(pkg.build, "2_SBo");
        assert_eq!(pkg.build_number(), "2");
        assert!(pkg.has_tag("_SBo"));
        assert!(!pkg.has_tag("_ponce"));
    }

    #[test]
    fn test_parse_package_name_errors() {
        assert!(InstalledPackage::parse("foo-1.0-x86_64").is_err());
        assert!(InstalledPackage::parse("-1.0-x86_64-1").is_err());
        assert!(InstalledPackage::parse("").is_err());
    }

    #[test]
    fn test_requirement_names_skip_readme() {
        let names: Vec<&str> = requirement_names("  libfoo %README%\tlibbar ").collect();
        assert_eq!(names, vec!["libfoo", "libbar"]);
    }

    #[test]
    fn test_not_installed_is_not_upgradable() {
        let item = BuildItem::new("foo", "libraries").with_available("1.0", "1");
        assert!(!item.is_upgradable());
    }

    #[test]
    fn test_upgradable_on_version_change() {
        let item = BuildItem::new("foo", "libraries")
            .with_available("1.1", "1")
            .with_installed(installed("foo-1.0-x86_64-1_SBo"));
        assert!(item.is_upgradable());
    }

    #[test]
    fn test_upgradable_on_build_change() {
        let item = BuildItem::new("foo", "libraries")
            .with_available("1.0", "2")
            .with_installed(installed("foo-1.0-x86_64-1_SBo"));
        assert!(item.is_upgradable());
    }

    #[test]
    fn test_kernel_tag_is_not_an_upgrade() {
        let item = BuildItem::new("nvidia-kernel", "system")
            .with_available("550.78", "1")
            .with_installed(installed("nvidia-kernel-550.78_6.1.55-x86_64-1_SBo"));
        assert!(!item.is_upgradable());

        let item = BuildItem::new("nvidia-kernel", "system")
            .with_available("550.78", "1")
            .with_installed(installed("nvidia-kernel-550.78_6.1-x86_64-1_SBo"));
        assert!(item.is_upgradable());
    }

    #[test]
    fn test_ignored_version_is_not_an_upgrade() {
        let mut item = BuildItem::new("foo", "libraries")
            .with_available("2.0", "1")
            .with_installed(installed("foo-1.0-x86_64-1_SBo"));
        item.version_ignored = true;
        assert!(!item.is_upgradable());

        item.available_build = "3".to_string();
        assert!(item.is_upgradable());
    }
}
