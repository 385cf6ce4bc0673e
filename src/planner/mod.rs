// src/planner/mod.rs

//! Install planning
//!
//! Turns a requested action on one package into an ordered list of
//! per-package actions. Plan order is always: forward dependencies, the
//! target, then (for upgrades that rebuild them) inverse dependents.
//!
//! Each entry carries a `marked` flag; only marked entries are executed.
//! Defaults are chosen so that the target and anything it needs in order
//! to work are marked, while destructive actions on shared dependencies
//! are left for the operator to opt into.

mod batch;

pub use batch::{eligible_for, share_dependencies};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::package::{BuildItem, PackageId};
use crate::resolver::{DependencyResolver, RequirementsProvider};

/// Action requested for, or derived for, one package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Install,
    Upgrade,
    Reinstall,
    Remove,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "Install",
            Self::Upgrade => "Upgrade",
            Self::Reinstall => "Reinstall",
            Self::Remove => "Remove",
        }
    }

    /// What an action on `item` amounts to given its installed state
    pub fn derive_for(item: &BuildItem) -> Self {
        if !item.is_installed() {
            Self::Install
        } else if item.is_upgradable() {
            Self::Upgrade
        } else {
            Self::Reinstall
        }
    }

    /// Install and Upgrade add or replace software the target needs
    pub fn is_constructive(&self) -> bool {
        matches!(self, Self::Install | Self::Upgrade)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "install" => Ok(Self::Install),
            "upgrade" => Ok(Self::Upgrade),
            "reinstall" => Ok(Self::Reinstall),
            "remove" => Ok(Self::Remove),
            _ => Err(format!("unknown action: {}", s)),
        }
    }
}

/// Action stored in a plan entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanAction {
    Apply(ActionKind),
    /// Installed and blacklisted; never executed
    Blacklisted,
}

impl PlanAction {
    pub fn kind(&self) -> Option<ActionKind> {
        match self {
            Self::Apply(kind) => Some(*kind),
            Self::Blacklisted => None,
        }
    }
}

impl fmt::Display for PlanAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply(kind) => f.write_str(kind.as_str()),
            Self::Blacklisted => f.write_str("(blacklisted)"),
        }
    }
}

/// One per-package decision in a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanEntry {
    pub id: PackageId,
    pub action: PlanAction,
    pub marked: bool,
}

impl PlanEntry {
    fn new(id: PackageId, kind: ActionKind, marked: bool) -> Self {
        Self {
            id,
            action: PlanAction::Apply(kind),
            marked,
        }
    }
}

/// Parameters of one planning request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanRequest {
    pub action: ActionKind,
    pub resolve_deps: bool,
    pub rebuild_inverse_deps: bool,
}

impl PlanRequest {
    /// Resolve dependencies, leave inverse dependents alone
    pub fn new(action: ActionKind) -> Self {
        Self {
            action,
            resolve_deps: true,
            rebuild_inverse_deps: false,
        }
    }

    /// Defaults taken from the configuration
    pub fn from_config(action: ActionKind, config: &Config) -> Self {
        Self {
            action,
            resolve_deps: config.resolve_deps,
            rebuild_inverse_deps: config.rebuild_inv_deps,
        }
    }

    pub fn resolve_deps(mut self, resolve: bool) -> Self {
        self.resolve_deps = resolve;
        self
    }

    pub fn rebuild_inverse_deps(mut self, rebuild: bool) -> Self {
        self.rebuild_inverse_deps = rebuild;
        self
    }
}

/// Ordered list of actions for one target
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    target: PackageId,
    #[serde(skip)]
    request: PlanRequest,
    entries: Vec<PlanEntry>,
    dependency_count: usize,
}

impl Plan {
    pub fn target(&self) -> PackageId {
        self.target
    }

    pub fn request(&self) -> &PlanRequest {
        &self.request
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of forward dependencies in the plan
    pub fn dependency_count(&self) -> usize {
        self.dependency_count
    }

    pub fn dependencies(&self) -> &[PlanEntry] {
        &self.entries[..self.dependency_count]
    }

    pub fn target_entry(&self) -> &PlanEntry {
        &self.entries[self.dependency_count]
    }

    pub fn inverse_dependents(&self) -> &[PlanEntry] {
        &self.entries[self.dependency_count + 1..]
    }

    pub fn marked(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|e| e.marked)
    }

    /// Heading shown above the plan, e.g. `ffmpeg (3 deps)`
    pub fn title(&self, catalog: &Catalog) -> String {
        let name = &catalog.get(self.target).name;
        if !self.request.resolve_deps {
            return format!("{} (deps ignored)", name);
        }

        let installed = if self.request.action == ActionKind::Remove {
            "installed "
        } else {
            ""
        };
        match self.dependency_count {
            1 => format!("{} (1 {}dep)", name, installed),
            n => format!("{} ({} {}deps)", name, n, installed),
        }
    }

    /// False when a dependency that needs installing or upgrading is unmarked
    pub fn installing_all_deps(&self) -> bool {
        self.dependencies().iter().all(|entry| {
            !matches!(entry.action.kind(), Some(kind) if kind.is_constructive()) || entry.marked
        })
    }

    /// Index of the entry for `name`
    pub fn position(&self, catalog: &Catalog, name: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| catalog.get(entry.id).name == name)
    }

    /// Set the mark of the entry for `name`
    ///
    /// Blacklisted entries can only be unmarked.
    pub fn set_marked(&mut self, catalog: &Catalog, name: &str, marked: bool) -> Result<()> {
        let index = self
            .position(catalog, name)
            .ok_or_else(|| Error::UnknownPackage(name.to_string()))?;
        self.mark_index(catalog, index, marked)
    }

    /// Flip the mark of the entry at `index`; returns the new state
    pub fn toggle(&mut self, catalog: &Catalog, index: usize) -> Result<bool> {
        let Some(entry) = self.entries.get(index) else {
            return Err(Error::UnknownPackage(format!("plan entry {}", index)));
        };
        let marked = !entry.marked;
        self.mark_index(catalog, index, marked)?;
        Ok(marked)
    }

    fn mark_index(&mut self, catalog: &Catalog, index: usize, marked: bool) -> Result<()> {
        let entry = &mut self.entries[index];
        if marked && entry.action == PlanAction::Blacklisted {
            return Err(Error::UnexecutableEntry {
                package: catalog.get(entry.id).name.clone(),
                action: entry.action.to_string(),
            });
        }
        entry.marked = marked;
        Ok(())
    }

    /// Marked, installed entries whose package carries a different repo tag
    pub fn foreign_origin(&self, catalog: &Catalog, repo_tag: &str) -> Vec<PackageId> {
        self.marked()
            .filter_map(|entry| {
                let installed = catalog.get(entry.id).installed.as_ref()?;
                (!installed.has_tag(repo_tag)).then_some(entry.id)
            })
            .collect()
    }

    /// Human-readable list of entries, one per line
    pub fn summary(&self, catalog: &Catalog) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let item = catalog.get(entry.id);
            let mark = if entry.marked { 'x' } else { ' ' };
            out.push_str(&format!("[{}] {:<32} {}\n", mark, item.name, entry.action));
        }
        out
    }
}

/// Builds plans against one catalog snapshot
pub struct InstallPlanner<'a> {
    catalog: &'a Catalog,
    requirements: &'a dyn RequirementsProvider,
    repo_tag: String,
}

impl<'a> InstallPlanner<'a> {
    pub fn new(
        catalog: &'a Catalog,
        requirements: &'a dyn RequirementsProvider,
        repo_tag: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            requirements,
            repo_tag: repo_tag.into(),
        }
    }

    pub fn repo_tag(&self) -> &str {
        &self.repo_tag
    }

    /// Plan `request.action` on `target`
    ///
    /// Fails only with the resolver's error when dependencies cannot be
    /// resolved. Without dependency resolution the plan always holds exactly
    /// the target.
    pub fn build_plan(&self, target: PackageId, request: &PlanRequest) -> Result<Plan> {
        let requested = request.action;
        let target_item = self.catalog.get(target);

        let resolver = DependencyResolver::new(self.catalog, self.requirements);
        let mut dependencies = if request.resolve_deps {
            resolver.forward_order(target)?
        } else {
            Vec::new()
        };
        if requested == ActionKind::Remove {
            dependencies.retain(|&id| self.catalog.get(id).is_installed());
        }

        let mark_dependencies = requested.is_constructive();
        let mut entries: Vec<PlanEntry> = dependencies
            .iter()
            .map(|&id| {
                let kind = self.action_for(id, requested);
                PlanEntry::new(id, kind, mark_dependencies && kind.is_constructive())
            })
            .collect();
        let dependency_count = entries.len();
        entries.push(PlanEntry::new(target, self.action_for(target, requested), true));

        if requested == ActionKind::Upgrade && request.rebuild_inverse_deps {
            let installed = self.catalog.installed();
            for id in resolver.inverse_order(target, &installed) {
                if entries.iter().any(|entry| entry.id == id) {
                    continue;
                }
                let kind = if self.catalog.get(id).is_upgradable() {
                    ActionKind::Upgrade
                } else {
                    ActionKind::Reinstall
                };
                entries.push(PlanEntry::new(id, kind, true));
            }
        }

        for entry in &mut entries {
            if self.catalog.get(entry.id).is_installed_blacklisted() {
                entry.action = PlanAction::Blacklisted;
                entry.marked = false;
            }
        }

        let plan = Plan {
            target,
            request: *request,
            entries,
            dependency_count,
        };
        debug!(
            "Planned {} on {}: {} entries, {} marked",
            requested,
            target_item.name,
            plan.len(),
            plan.marked().count()
        );
        Ok(plan)
    }

    fn action_for(&self, id: PackageId, requested: ActionKind) -> ActionKind {
        match requested {
            ActionKind::Remove => ActionKind::Remove,
            _ => ActionKind::derive_for(self.catalog.get(id)),
        }
    }

    /// Marked entries installed from another repository
    pub fn foreign_origin(&self, plan: &Plan) -> Vec<PackageId> {
        plan.foreign_origin(self.catalog, &self.repo_tag)
    }

    /// Upgrade plans for every upgradable, non-blacklisted package
    ///
    /// Packages whose dependencies cannot be resolved are reported and
    /// skipped rather than failing the whole batch.
    pub fn upgrade_all(&self, request: &PlanRequest) -> Vec<(PackageId, Result<Plan>)> {
        let request = PlanRequest {
            action: ActionKind::Upgrade,
            ..*request
        };
        let targets = eligible_for(self.catalog, ActionKind::Upgrade, &self.catalog.upgradable());
        info!("{} package(s) to upgrade", targets.len());

        targets
            .into_iter()
            .map(|id| (id, self.build_plan(id, &request)))
            .collect()
    }
}
