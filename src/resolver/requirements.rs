// src/resolver/requirements.rs

//! Where requirement lists come from
//!
//! Installed packages carry the `requires` string read at the last
//! installed-state refresh. Packages that are not installed have no such
//! snapshot, so the repository `.info` file is the source of truth. The
//! cached value may be stale for installed packages if the repository was
//! synced after the refresh; use [`LiveRequirements`] to always read the
//! tree.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::package::PackageId;

/// Supplies the raw `requires` string of a package
pub trait RequirementsProvider {
    fn requirements(&self, catalog: &Catalog, id: PackageId) -> Result<String>;
}

/// Cached value for installed packages, repository file otherwise
#[derive(Debug, Clone, Copy, Default)]
pub struct RepoRequirements;

impl RequirementsProvider for RepoRequirements {
    fn requirements(&self, catalog: &Catalog, id: PackageId) -> Result<String> {
        let item = catalog.get(id);
        if item.is_installed() {
            return Ok(item.requires.clone());
        }
        LiveRequirements.requirements(catalog, id)
    }
}

/// Always the repository file; in-memory catalogs fall back to the cache
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveRequirements;

impl RequirementsProvider for LiveRequirements {
    fn requirements(&self, catalog: &Catalog, id: PackageId) -> Result<String> {
        match catalog.read_info(id)? {
            Some(info) => Ok(info.requires().to_string()),
            None => Ok(catalog.get(id).requires.clone()),
        }
    }
}

/// Only the values stored in the catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct CachedRequirements;

impl RequirementsProvider for CachedRequirements {
    fn requirements(&self, catalog: &Catalog, id: PackageId) -> Result<String> {
        Ok(catalog.get(id).requires.clone())
    }
}
