// src/error.rs

//! Error types shared by the resolver, planner and executor

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors produced by the slackpick library
#[derive(Error, Debug)]
pub enum Error {
    /// A `requires` entry names a package that is not in the catalog
    #[error("could not resolve dependencies: `{0}` not found")]
    MissingDependency(String),

    /// A requirement chain leads back to a package already being resolved
    #[error("circular dependency: {}", .0.join(" -> "))]
    CycleDetected(Vec<String>),

    /// The package manager exited with 127 or its executable is missing
    #[error("package manager not found (while processing {0})")]
    ToolNotFound(String),

    /// A package manager command failed
    #[error("{action} of {package} failed with exit code {code}")]
    ActionFailed {
        package: String,
        action: String,
        code: i32,
    },

    #[error("package `{0}` is not in the repository")]
    UnknownPackage(String),

    #[error("package `{0}` is not installed")]
    NotInstalled(String),

    /// A marked plan entry carries an action that cannot be executed
    #[error("refusing to apply {package}: action is {action}")]
    UnexecutableEntry { package: String, action: String },

    #[error("invalid installed package name: {0}")]
    InvalidPackageName(String),

    #[error("invalid blacklist pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for slackpick operations
pub type Result<T> = std::result::Result<T, Error>;
