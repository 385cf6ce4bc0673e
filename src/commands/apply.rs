// src/commands/apply.rs
//! Plan and apply install, upgrade, reinstall and remove actions

use super::Session;
use super::prompt::StdinPrompt;
use crate::cli::{PlanArgs, PlanOptions};
use anyhow::{Context, Result};
use slackpick::planner::share_dependencies;
use slackpick::{
    ActionCounts, ActionExecutor, ActionKind, ApplyOutcome, ApplyReport, Catalog, Config,
    InstallPlanner, PackageId, Plan, PlanRequest, RepoRequirements, ShellCommandRunner,
};
use std::path::Path;
use tracing::{info, warn};

/// Plan `action` on one package, show the plan and apply it
pub fn cmd_apply(config_path: Option<&Path>, action: ActionKind, args: &PlanArgs) -> Result<()> {
    let session = Session::open(config_path)?;
    let catalog = &session.catalog;
    let target = session.lookup(&args.package)?;
    check_target(catalog, target, action)?;

    let planner = InstallPlanner::new(catalog, &RepoRequirements, session.config.repo_tag.clone());
    let request = plan_request(action, &session.config, &args.options);
    let mut plan = planner.build_plan(target, &request).with_context(|| {
        format!("Cannot {} {}", action.as_str().to_lowercase(), args.package)
    })?;

    for name in &args.mark {
        plan.set_marked(catalog, name, true)
            .with_context(|| format!("Cannot mark {}", name))?;
    }
    for name in &args.unmark {
        plan.set_marked(catalog, name, false)
            .with_context(|| format!("Cannot unmark {}", name))?;
    }

    print_plan(&session, &plan);
    let mut prompt = StdinPrompt::new(args.options.yes);
    let missing_deps = !plan.installing_all_deps();
    let plans = std::slice::from_ref(&plan);
    if !review(&session, &planner, plans, missing_deps, &prompt, &args.options)? {
        return Ok(());
    }

    let report = execute(&session, &plan, &mut prompt)?;
    println!("{}.", report.counts);
    report
        .into_result()
        .with_context(|| format!("Failed to {} {}", action.as_str().to_lowercase(), args.package))?;
    Ok(())
}

/// Upgrade every upgradable package that is not blacklisted
pub fn cmd_upgrade_all(config_path: Option<&Path>, options: &PlanOptions) -> Result<()> {
    let session = Session::open(config_path)?;
    let catalog = &session.catalog;

    let planner = InstallPlanner::new(catalog, &RepoRequirements, session.config.repo_tag.clone());
    let request = plan_request(ActionKind::Upgrade, &session.config, options);

    let mut plans = Vec::new();
    for (id, result) in planner.upgrade_all(&request) {
        match result {
            Ok(plan) => plans.push(plan),
            Err(e) => {
                warn!("Skipping upgrade of {}: {}", catalog.get(id).name, e);
                println!("Skipping {}: {}", catalog.get(id).name, e);
            }
        }
    }
    if plans.is_empty() {
        println!("No upgrades available.");
        return Ok(());
    }

    let missing_deps = share_batch_marks(catalog, &mut plans)?;

    for plan in &plans {
        print_plan(&session, plan);
    }
    let mut prompt = StdinPrompt::new(options.yes);
    if !review(&session, &planner, &plans, missing_deps, &prompt, options)? {
        return Ok(());
    }

    let mut totals = ActionCounts::default();
    let mut failed = Vec::new();
    for plan in &plans {
        if plan.marked().next().is_none() {
            continue;
        }
        let report = execute(&session, plan, &mut prompt)?;
        totals.add(&report.counts);

        let name = &catalog.get(plan.target()).name;
        match report.outcome {
            ApplyOutcome::Completed => {}
            ApplyOutcome::Failed(_) => failed.push(name.clone()),
            ApplyOutcome::Aborted(_) | ApplyOutcome::ToolNotFound(_) => {
                println!("{}.", totals);
                report
                    .into_result()
                    .with_context(|| format!("Stopped while upgrading {}", name))?;
                return Ok(());
            }
        }
    }

    println!("{}.", totals);
    if !failed.is_empty() {
        return Err(anyhow::anyhow!("Upgrade failed for: {}", failed.join(", ")));
    }
    Ok(())
}

/// Refuse requests that cannot apply to the target as it is installed
fn check_target(catalog: &Catalog, target: PackageId, action: ActionKind) -> Result<()> {
    let item = catalog.get(target);
    if action == ActionKind::Remove && !item.is_installed() {
        return Err(anyhow::anyhow!("{} is not installed", item.name));
    }
    Ok(())
}

/// Hand each shared dependency to the first plan that marks it
///
/// Returns whether some plan left a needed dependency unmarked before the
/// hand-over; entries unmarked here still run in an earlier plan.
fn share_batch_marks(catalog: &Catalog, plans: &mut [Plan]) -> Result<bool> {
    let missing_deps = plans.iter().any(|plan| !plan.installing_all_deps());
    share_dependencies(catalog, plans)?;
    Ok(missing_deps)
}

fn plan_request(action: ActionKind, config: &Config, options: &PlanOptions) -> PlanRequest {
    PlanRequest::from_config(action, config)
        .resolve_deps(config.resolve_deps && !options.no_deps)
        .rebuild_inverse_deps(config.rebuild_inv_deps || options.rebuild_inverse_deps)
}

fn print_plan(session: &Session, plan: &Plan) {
    println!("{}", plan.title(&session.catalog));
    print!("{}", plan.summary(&session.catalog));
    println!();
}

/// Warn about the plans and ask whether to go ahead
fn review(
    session: &Session,
    planner: &InstallPlanner<'_>,
    plans: &[Plan],
    missing_deps: bool,
    prompt: &StdinPrompt,
    options: &PlanOptions,
) -> Result<bool> {
    let catalog = &session.catalog;

    if missing_deps {
        println!("Warning: not all dependencies that need installing or upgrading are marked.");
    }

    let foreign: Vec<&str> = plans
        .iter()
        .flat_map(|plan| planner.foreign_origin(plan))
        .filter_map(|id| catalog.get(id).package_full_name())
        .collect();
    if !foreign.is_empty() {
        println!(
            "The following packages were not built from this repository (tag {}):",
            planner.repo_tag()
        );
        for name in &foreign {
            println!("  {}", name);
        }
        if !options.dry_run && !prompt.confirm("Continue anyway?")? {
            println!("Aborted.");
            return Ok(false);
        }
    }

    if options.dry_run {
        println!("Dry run: no changes made.");
        return Ok(false);
    }
    if plans.iter().all(|plan| plan.marked().next().is_none()) {
        println!("Nothing to do.");
        return Ok(false);
    }
    if session.config.confirm_changes && !prompt.confirm("Apply changes?")? {
        println!("Aborted.");
        return Ok(false);
    }
    Ok(true)
}

fn execute(session: &Session, plan: &Plan, prompt: &mut StdinPrompt) -> Result<ApplyReport> {
    let mut runner = ShellCommandRunner::new(&session.config);
    runner
        .check_available(plan.marked().filter_map(|entry| entry.action.kind()))
        .context("Package manager is not available")?;

    info!("Applying: {}", plan.title(&session.catalog));
    let report = ActionExecutor::new(&session.catalog).apply(plan, &mut runner, prompt)?;
    Ok(report)
}
