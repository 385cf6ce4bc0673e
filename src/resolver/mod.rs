// src/resolver/mod.rs

//! Dependency resolution
//!
//! Computes the build order of a package's transitive requirements and the
//! set of installed packages that transitively depend on a package.
//!
//! Both walks use the same accumulation rule ([`add_req`]): when a package
//! is reached again it is moved to the end of the list instead of being
//! added twice. For the forward walk this places a shared dependency after
//! the last branch that needed it; reversing the list then puts it before
//! every package that requires it. The result is a valid build order but
//! not a minimal topological sort.

mod requirements;

pub use requirements::{
    CachedRequirements, LiveRequirements, RepoRequirements, RequirementsProvider,
};

use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::package::{PackageId, requirement_names};

/// Resolver over one catalog snapshot
pub struct DependencyResolver<'a> {
    catalog: &'a Catalog,
    requirements: &'a dyn RequirementsProvider,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(catalog: &'a Catalog, requirements: &'a dyn RequirementsProvider) -> Self {
        Self {
            catalog,
            requirements,
        }
    }

    /// Transitive requirements of `target` in build order, excluding `target`
    ///
    /// Fails with [`Error::MissingDependency`] if any requirement is not in
    /// the catalog and with [`Error::CycleDetected`] if a requirement chain
    /// leads back to a package on the current path. No partial order is
    /// returned on failure.
    pub fn forward_order(&self, target: PackageId) -> Result<Vec<PackageId>> {
        let mut order = Vec::new();
        let mut path = vec![target];
        self.collect_requirements(target, &mut order, &mut path)?;
        order.reverse();

        debug!(
            "Build order for {}: {} package(s)",
            self.catalog.get(target).name,
            order.len()
        );
        Ok(order)
    }

    fn collect_requirements(
        &self,
        id: PackageId,
        order: &mut Vec<PackageId>,
        path: &mut Vec<PackageId>,
    ) -> Result<()> {
        let requires = self.requirements.requirements(self.catalog, id)?;

        for name in requirement_names(&requires) {
            let dep = self
                .catalog
                .lookup(name)
                .ok_or_else(|| Error::MissingDependency(name.to_string()))?;

            if let Some(start) = path.iter().position(|&p| p == dep) {
                let mut cycle: Vec<String> = path[start..]
                    .iter()
                    .map(|&p| self.catalog.get(p).name.clone())
                    .collect();
                cycle.push(name.to_string());
                return Err(Error::CycleDetected(cycle));
            }

            add_req(dep, order);
            path.push(dep);
            self.collect_requirements(dep, order, path)?;
            path.pop();
        }

        Ok(())
    }

    /// Installed packages that transitively require `target`
    ///
    /// Only the cached `requires` of the given installed packages are
    /// consulted. Returns an empty list if nothing depends on `target`.
    pub fn inverse_order(&self, target: PackageId, installed: &[PackageId]) -> Vec<PackageId> {
        let mut order = Vec::new();
        let mut path = vec![target];
        self.collect_dependents(target, installed, &mut order, &mut path);
        order
    }

    fn collect_dependents(
        &self,
        id: PackageId,
        installed: &[PackageId],
        order: &mut Vec<PackageId>,
        path: &mut Vec<PackageId>,
    ) {
        let name = &self.catalog.get(id).name;

        for &candidate in installed {
            if !self.catalog.get(candidate).requires_package(name) {
                continue;
            }
            if path.contains(&candidate) {
                warn!(
                    "Circular dependency between {} and {}",
                    name,
                    self.catalog.get(candidate).name
                );
                continue;
            }

            add_req(candidate, order);
            path.push(candidate);
            self.collect_dependents(candidate, installed, order, path);
            path.pop();
        }
    }
}

/// Append `id`, removing an earlier occurrence first
pub(crate) fn add_req(id: PackageId, list: &mut Vec<PackageId>) {
    if let Some(pos) = list.iter().position(|&existing| existing == id) {
        list.remove(pos);
    }
    list.push(id);
}
