// src/planner/batch.rs

//! Batch selection over a set of tagged packages

use std::collections::HashSet;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::package::PackageId;

use super::{ActionKind, Plan};

/// Keep the packages of `ids` that `action` can apply to
///
/// - Install: packages that are not installed
/// - Upgrade: upgradable packages that are not blacklisted
/// - Remove, Reinstall: installed packages that are not blacklisted
pub fn eligible_for(catalog: &Catalog, action: ActionKind, ids: &[PackageId]) -> Vec<PackageId> {
    ids.iter()
        .copied()
        .filter(|&id| {
            let item = catalog.get(id);
            match action {
                ActionKind::Install => !item.is_installed(),
                ActionKind::Upgrade => item.is_upgradable() && !item.blacklisted,
                ActionKind::Remove | ActionKind::Reinstall => {
                    item.is_installed() && !item.blacklisted
                }
            }
        })
        .collect()
}

/// Unmark every marked entry already marked by an earlier plan
///
/// Plans run in order, so a dependency shared by several plans is applied
/// once, by the first plan that marks it.
pub fn share_dependencies(catalog: &Catalog, plans: &mut [Plan]) -> Result<()> {
    let mut seen = HashSet::new();
    for plan in plans.iter_mut() {
        for index in 0..plan.len() {
            let entry = plan.entries()[index];
            if entry.marked && !seen.insert(entry.id) {
                plan.toggle(catalog, index)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{BuildItem, InstalledPackage};

    #[test]
    fn test_eligible_for_each_action() {
        let pkg = |n: &str, v: &str| {
            InstalledPackage::parse(&format!("{}-{}-x86_64-1_SBo", n, v)).unwrap()
        };
        let catalog = Catalog::from_items([
            BuildItem::new("fresh", "misc").with_available("1.0", "1"),
            BuildItem::new("stale", "misc")
                .with_available("2.0", "1")
                .with_installed(pkg("stale", "1.0")),
            BuildItem::new("pinned", "misc")
                .with_available("2.0", "1")
                .with_installed(pkg("pinned", "1.0"))
                .with_blacklisted(true),
            BuildItem::new("current", "misc")
                .with_available("1.0", "1")
                .with_installed(pkg("current", "1.0")),
        ]);
        let all: Vec<PackageId> = catalog.iter().map(|(id, _)| id).collect();
        let names = |ids: Vec<PackageId>| -> Vec<String> {
            ids.into_iter().map(|id| catalog.get(id).name.clone()).collect()
        };

        assert_eq!(names(eligible_for(&catalog, ActionKind::Install, &all)), vec!["fresh"]);
        assert_eq!(names(eligible_for(&catalog, ActionKind::Upgrade, &all)), vec!["stale"]);
        assert_eq!(
            names(eligible_for(&catalog, ActionKind::Remove, &all)),
            vec!["stale", "current"]
        );
        assert_eq!(
            names(eligible_for(&catalog, ActionKind::Reinstall, &all)),
            vec!["stale", "current"]
        );
    }

    #[test]
    fn test_share_dependencies_first_plan_wins() {
        use crate::planner::{InstallPlanner, PlanRequest};
        use crate::resolver::CachedRequirements;

        let pkg = |n: &str, v: &str| {
            InstalledPackage::parse(&format!("{}-{}-x86_64-1_SBo", n, v)).unwrap()
        };
        let catalog = Catalog::from_items([
            BuildItem::new("libogg", "libraries").with_available("1.3", "1"),
            BuildItem::new("vorbis-tools", "audio")
                .with_requires("libogg")
                .with_available("1.4", "1")
                .with_installed(pkg("vorbis-tools", "1.3")),
            BuildItem::new("flac", "audio")
                .with_requires("libogg")
                .with_available("1.4", "1")
                .with_installed(pkg("flac", "1.3")),
        ]);
        let planner = InstallPlanner::new(&catalog, &CachedRequirements, "_SBo");
        let mut plans: Vec<_> = planner
            .upgrade_all(&PlanRequest::new(ActionKind::Upgrade))
            .into_iter()
            .map(|(_, plan)| plan.unwrap())
            .collect();

        share_dependencies(&catalog, &mut plans).unwrap();

        let marked = |plan: &Plan| -> Vec<String> {
            plan.marked().map(|e| catalog.get(e.id).name.clone()).collect()
        };
        assert_eq!(marked(&plans[0]), vec!["libogg", "flac"]);
        assert_eq!(marked(&plans[1]), vec!["vorbis-tools"]);
    }
}
