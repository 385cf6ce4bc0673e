// src/lib.rs

//! slackpick
//!
//! Dependency resolution and install planning for SlackBuilds-style
//! source repositories.
//!
//! # Architecture
//!
//! - Catalog: arena of every package in the repository tree, refreshed
//!   against the installed package log
//! - Resolver: forward build order and inverse dependents
//! - Planner: per-package actions with marks, blacklist and repo-tag checks
//! - Executor: runs marked actions through the configured package manager
//!
//! Data flows one way: catalog, resolver, planner, executor. A plan holds
//! only [`PackageId`] indices, so it stays valid as long as its catalog.

pub mod blacklist;
pub mod catalog;
pub mod config;
mod error;
pub mod executor;
pub mod ignore;
pub mod package;
pub mod planner;
pub mod resolver;

pub use blacklist::Blacklist;
pub use catalog::{Catalog, InstalledStateProvider, PackageLog};
pub use config::{Config, ConfigError, PackageManager};
pub use error::{Error, Result};
pub use executor::{
    AbortOnFailure, ActionCounts, ActionExecutor, ApplyOutcome, ApplyReport, ContinueOnFailure,
    EXIT_TOOL_NOT_FOUND, FailedAction, FailureHandler, PackageManagerCommandRunner,
    ShellCommandRunner,
};
pub use ignore::IgnoreVersions;
pub use package::{BuildItem, InfoFile, InstalledPackage, PackageId};
pub use planner::{ActionKind, InstallPlanner, Plan, PlanAction, PlanEntry, PlanRequest};
pub use resolver::{
    CachedRequirements, DependencyResolver, LiveRequirements, RepoRequirements,
    RequirementsProvider,
};
