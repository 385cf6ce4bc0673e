// src/executor/mod.rs

//! Plan execution
//!
//! Walks a [`Plan`] in order and hands each marked entry to a
//! [`PackageManagerCommandRunner`]. Entries run one at a time; the next
//! command only starts once the previous exit code is known. Nothing is
//! rolled back when an entry fails.
//!
//! Exit code handling:
//! - `0`: the action is counted.
//! - `127`: the package manager could not be found; execution stops.
//! - anything else: on every entry but the last, the [`FailureHandler`]
//!   decides whether to continue. A failure on the last entry is recorded.

mod shell;

pub use shell::ShellCommandRunner;

use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::package::{BuildItem, PackageId};
use crate::planner::{ActionKind, Plan, PlanAction};

/// Exit status meaning the package manager executable was not found
pub const EXIT_TOOL_NOT_FOUND: i32 = 127;

/// Runs package manager commands for single packages
///
/// Each method returns the command's exit code. `Err` is reserved for
/// failures to run the command at all.
pub trait PackageManagerCommandRunner {
    fn install(&mut self, item: &BuildItem) -> Result<i32>;

    fn upgrade(&mut self, item: &BuildItem) -> Result<i32>;

    fn remove(&mut self, item: &BuildItem) -> Result<i32>;

    /// Remove followed by install; install is skipped if remove fails
    fn reinstall(&mut self, item: &BuildItem) -> Result<i32> {
        let code = self.remove(item)?;
        if code != 0 {
            return Ok(code);
        }
        self.install(item)
    }
}

/// Decides whether to keep going after a failed entry
pub trait FailureHandler {
    fn continue_after(&mut self, failure: &FailedAction) -> bool;
}

impl<F> FailureHandler for F
where
    F: FnMut(&FailedAction) -> bool,
{
    fn continue_after(&mut self, failure: &FailedAction) -> bool {
        self(failure)
    }
}

/// Stop at the first failure
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortOnFailure;

impl FailureHandler for AbortOnFailure {
    fn continue_after(&mut self, _failure: &FailedAction) -> bool {
        false
    }
}

/// Keep going after every failure
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinueOnFailure;

impl FailureHandler for ContinueOnFailure {
    fn continue_after(&mut self, _failure: &FailedAction) -> bool {
        true
    }
}

/// Successful actions per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ActionCounts {
    pub installed: usize,
    pub upgraded: usize,
    pub reinstalled: usize,
    pub removed: usize,
}

impl ActionCounts {
    fn record(&mut self, kind: ActionKind) {
        match kind {
            ActionKind::Install => self.installed += 1,
            ActionKind::Upgrade => self.upgraded += 1,
            ActionKind::Reinstall => self.reinstalled += 1,
            ActionKind::Remove => self.removed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.installed + self.upgraded + self.reinstalled + self.removed
    }

    /// Fold another batch into this one
    pub fn add(&mut self, other: &ActionCounts) {
        self.installed += other.installed;
        self.upgraded += other.upgraded;
        self.reinstalled += other.reinstalled;
        self.removed += other.removed;
    }
}

impl fmt::Display for ActionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [
            (self.installed, "installed"),
            (self.upgraded, "upgraded"),
            (self.reinstalled, "reinstalled"),
            (self.removed, "removed"),
        ]
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, label)| format!("{} {}", count, label))
        .collect();

        if parts.is_empty() {
            write!(f, "No changes")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

/// A plan entry whose command exited nonzero
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedAction {
    pub id: PackageId,
    pub package: String,
    pub action: ActionKind,
    pub code: i32,
}

impl fmt::Display for FailedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} failed with exit code {}",
            self.action, self.package, self.code
        )
    }
}

/// How execution of a plan ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// Every marked entry succeeded
    Completed,
    /// All entries ran, some failed; carries the last failing exit code
    Failed(i32),
    /// Stopped after a failure the handler declined to continue past
    Aborted(i32),
    /// Exit 127 for the named package; later entries did not run
    ToolNotFound(String),
}

/// Result of applying a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub counts: ActionCounts,
    pub failures: Vec<FailedAction>,
    pub outcome: ApplyOutcome,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.outcome == ApplyOutcome::Completed
    }

    /// Exit code to report, `0` on success
    pub fn exit_code(&self) -> i32 {
        match &self.outcome {
            ApplyOutcome::Completed => 0,
            ApplyOutcome::Failed(code) | ApplyOutcome::Aborted(code) => *code,
            ApplyOutcome::ToolNotFound(_) => EXIT_TOOL_NOT_FOUND,
        }
    }

    /// Convert a failed outcome into an error
    pub fn into_result(self) -> Result<ActionCounts> {
        match self.outcome {
            ApplyOutcome::Completed => Ok(self.counts),
            ApplyOutcome::ToolNotFound(package) => Err(Error::ToolNotFound(package)),
            ApplyOutcome::Failed(_) | ApplyOutcome::Aborted(_) => {
                match self.failures.into_iter().last() {
                    Some(failure) => Err(Error::ActionFailed {
                        package: failure.package,
                        action: failure.action.to_string(),
                        code: failure.code,
                    }),
                    None => Ok(self.counts),
                }
            }
        }
    }
}

/// Applies plans built against one catalog
pub struct ActionExecutor<'a> {
    catalog: &'a Catalog,
}

impl<'a> ActionExecutor<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Run every marked entry of `plan` in order
    ///
    /// A marked entry that carries no executable action is rejected before
    /// any command runs.
    pub fn apply(
        &self,
        plan: &Plan,
        runner: &mut dyn PackageManagerCommandRunner,
        on_failure: &mut dyn FailureHandler,
    ) -> Result<ApplyReport> {
        let mut work = Vec::new();
        for entry in plan.marked() {
            match entry.action {
                PlanAction::Apply(kind) => work.push((entry.id, kind)),
                PlanAction::Blacklisted => {
                    return Err(Error::UnexecutableEntry {
                        package: self.catalog.get(entry.id).name.clone(),
                        action: entry.action.to_string(),
                    });
                }
            }
        }

        let mut counts = ActionCounts::default();
        let mut failures = Vec::new();
        let last = work.len().saturating_sub(1);

        for (index, &(id, kind)) in work.iter().enumerate() {
            let item = self.catalog.get(id);
            info!("{} {}", kind, item.name);

            let code = match kind {
                ActionKind::Install => runner.install(item)?,
                ActionKind::Upgrade => runner.upgrade(item)?,
                ActionKind::Reinstall => runner.reinstall(item)?,
                ActionKind::Remove => runner.remove(item)?,
            };

            if code == 0 {
                counts.record(kind);
                continue;
            }

            if code == EXIT_TOOL_NOT_FOUND {
                error!("Package manager not found while processing {}", item.name);
                return Ok(ApplyReport {
                    counts,
                    failures,
                    outcome: ApplyOutcome::ToolNotFound(item.name.clone()),
                });
            }

            let failure = FailedAction {
                id,
                package: item.name.clone(),
                action: kind,
                code,
            };
            warn!("{}", failure);

            if index != last && !on_failure.continue_after(&failure) {
                failures.push(failure);
                return Ok(ApplyReport {
                    counts,
                    failures,
                    outcome: ApplyOutcome::Aborted(code),
                });
            }
            failures.push(failure);
        }

        let outcome = match failures.last() {
            Some(failure) => ApplyOutcome::Failed(failure.code),
            None => ApplyOutcome::Completed,
        };
        info!("{}", counts);
        Ok(ApplyReport {
            counts,
            failures,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::InstalledPackage;
    use crate::planner::{InstallPlanner, PlanRequest};
    use crate::resolver::CachedRequirements;
    use std::collections::HashMap;

    /// Records calls and answers with preset exit codes
    #[derive(Default)]
    struct RecordingRunner {
        calls: Vec<String>,
        codes: HashMap<String, i32>,
    }

    impl RecordingRunner {
        fn failing(codes: &[(&str, i32)]) -> Self {
            Self {
                calls: Vec::new(),
                codes: codes.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            }
        }

        fn run(&mut self, verb: &str, item: &BuildItem) -> Result<i32> {
            let call = format!("{} {}", verb, item.name);
            let code = self.codes.get(&call).copied().unwrap_or(0);
            self.calls.push(call);
            Ok(code)
        }
    }

    impl PackageManagerCommandRunner for RecordingRunner {
        fn install(&mut self, item: &BuildItem) -> Result<i32> {
            self.run("install", item)
        }

        fn upgrade(&mut self, item: &BuildItem) -> Result<i32> {
            self.run("upgrade", item)
        }

        fn remove(&mut self, item: &BuildItem) -> Result<i32> {
            self.run("remove", item)
        }
    }

    fn chain() -> Catalog {
        Catalog::from_items([
            BuildItem::new("app", "misc").with_requires("mid"),
            BuildItem::new("mid", "misc").with_requires("base"),
            BuildItem::new("base", "misc"),
        ])
    }

    fn install_plan(catalog: &Catalog) -> Plan {
        InstallPlanner::new(catalog, &CachedRequirements, "_SBo")
            .build_plan(
                catalog.lookup("app").unwrap(),
                &PlanRequest::new(ActionKind::Install),
            )
            .unwrap()
    }

    #[test]
    fn test_apply_all_in_order() {
        let catalog = chain();
        let plan = install_plan(&catalog);
        let mut runner = RecordingRunner::default();
        let report = ActionExecutor::new(&catalog)
            .apply(&plan, &mut runner, &mut AbortOnFailure)
            .unwrap();

        assert_eq!(runner.calls, vec!["install base", "install mid", "install app"]);
        assert_eq!(report.outcome, ApplyOutcome::Completed);
        assert_eq!(report.counts.installed, 3);
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.counts.to_string(), "3 installed");
    }

    #[test]
    fn test_unmarked_entries_skipped() {
        let catalog = chain();
        let mut plan = install_plan(&catalog);
        plan.set_marked(&catalog, "mid", false).unwrap();
        let mut runner = RecordingRunner::default();
        ActionExecutor::new(&catalog)
            .apply(&plan, &mut runner, &mut AbortOnFailure)
            .unwrap();
        assert_eq!(runner.calls, vec!["install base", "install app"]);
    }

    #[test]
    fn test_tool_not_found_stops_immediately() {
        let catalog = chain();
        let plan = install_plan(&catalog);
        let mut runner = RecordingRunner::failing(&[("install base", 127)]);
        let mut asked = false;
        let mut handler = |_: &FailedAction| {
            asked = true;
            true
        };
        let report = ActionExecutor::new(&catalog)
            .apply(&plan, &mut runner, &mut handler)
            .unwrap();

        assert_eq!(runner.calls, vec!["install base"]);
        assert_eq!(report.outcome, ApplyOutcome::ToolNotFound("base".to_string()));
        assert!(!asked);
        assert!(matches!(report.into_result(), Err(Error::ToolNotFound(_))));
    }

    #[test]
    fn test_declined_failure_aborts() {
        let catalog = chain();
        let plan = install_plan(&catalog);
        let mut runner = RecordingRunner::failing(&[("install mid", 1)]);
        let report = ActionExecutor::new(&catalog)
            .apply(&plan, &mut runner, &mut AbortOnFailure)
            .unwrap();

        assert_eq!(runner.calls, vec!["install base", "install mid"]);
        assert_eq!(report.outcome, ApplyOutcome::Aborted(1));
        assert_eq!(report.counts.installed, 1);
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_accepted_failure_continues() {
        let catalog = chain();
        let plan = install_plan(&catalog);
        let mut runner = RecordingRunner::failing(&[("install base", 2)]);
        let mut prompts = Vec::new();
        let mut handler = |failure: &FailedAction| {
            prompts.push(failure.package.clone());
            true
        };
        let report = ActionExecutor::new(&catalog)
            .apply(&plan, &mut runner, &mut handler)
            .unwrap();

        assert_eq!(prompts, vec!["base"]);
        assert_eq!(runner.calls.len(), 3);
        assert_eq!(report.counts.installed, 2);
        assert_eq!(report.outcome, ApplyOutcome::Failed(2));
        let err = report.into_result().unwrap_err();
        assert!(matches!(err, Error::ActionFailed { code: 2, .. }));
    }

    #[test]
    fn test_final_entry_failure_does_not_prompt() {
        let catalog = chain();
        let plan = install_plan(&catalog);
        let mut runner = RecordingRunner::failing(&[("install app", 3)]);
        let mut handler = |_: &FailedAction| -> bool { panic!("no prompt after the last entry") };
        let report = ActionExecutor::new(&catalog)
            .apply(&plan, &mut runner, &mut handler)
            .unwrap();

        assert_eq!(report.outcome, ApplyOutcome::Failed(3));
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.counts.installed, 2);
    }

    #[test]
    fn test_reinstall_is_remove_then_install() {
        let catalog = Catalog::from_items([BuildItem::new("app", "misc")
            .with_available("1.0", "1")
            .with_installed(InstalledPackage::parse("app-1.0-x86_64-1_SBo").unwrap())]);
        let plan = InstallPlanner::new(&catalog, &CachedRequirements, "_SBo")
            .build_plan(
                catalog.lookup("app").unwrap(),
                &PlanRequest::new(ActionKind::Reinstall),
            )
            .unwrap();

        let mut runner = RecordingRunner::default();
        let report = ActionExecutor::new(&catalog)
            .apply(&plan, &mut runner, &mut AbortOnFailure)
            .unwrap();
        assert_eq!(runner.calls, vec!["remove app", "install app"]);
        assert_eq!(report.counts.reinstalled, 1);

        let mut runner = RecordingRunner::failing(&[("remove app", 1)]);
        let report = ActionExecutor::new(&catalog)
            .apply(&plan, &mut runner, &mut AbortOnFailure)
            .unwrap();
        assert_eq!(runner.calls, vec!["remove app"]);
        assert_eq!(report.outcome, ApplyOutcome::Failed(1));
    }

    #[test]
    fn test_counts_display() {
        let mut counts = ActionCounts::default();
        assert_eq!(counts.to_string(), "No changes");
        counts.record(ActionKind::Upgrade);
        counts.record(ActionKind::Remove);
        assert_eq!(counts.to_string(), "1 upgraded, 1 removed");
        assert_eq!(counts.total(), 2);
    }
}
