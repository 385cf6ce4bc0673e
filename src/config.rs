// src/config.rs

//! Configuration file handling
//!
//! The configuration is a TOML file. Lookup order when no path is given:
//!
//! 1. `$XDG_CONFIG_HOME/slackpick/config.toml` (or the platform equivalent)
//! 2. `/etc/slackpick/config.toml`
//!
//! Only `repo_dir` and `package_manager` are required. Command defaults
//! depend on the package manager; a `custom` manager must spell out every
//! command.
//!
//! ```toml
//! repo_dir = "/var/lib/sbopkg/SBo/15.0"
//! package_manager = "sbotools"
//! install_vars = "MAKEFLAGS=-j8"
//! ```

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// System-wide configuration file
pub const SYSTEM_CONFIG_PATH: &str = "/etc/slackpick/config.toml";

pub const DEFAULT_REPO_TAG: &str = "_SBo";
pub const DEFAULT_PACKAGE_DIR: &str = "/var/log/packages";
pub const DEFAULT_BLACKLIST_FILE: &str = "/etc/slackpick/package_blacklist";
pub const DEFAULT_IGNORE_VERSIONS_FILE: &str = "/etc/slackpick/ignore_versions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing `{key}` setting{hint}")]
    MissingKey {
        key: &'static str,
        hint: &'static str,
    },

    #[error("no configuration file found (tried {})", .0.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "))]
    NotFound(Vec<PathBuf>),
}

/// Package manager front end that builds and installs SlackBuilds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Sbopkg,
    Sbotools,
    Custom,
}

impl PackageManager {
    fn default_sync_cmd(&self) -> Option<&'static str> {
        match self {
            Self::Sbopkg => Some("sbopkg -r"),
            Self::Sbotools => Some("sbosnap update"),
            Self::Custom => None,
        }
    }

    fn default_install_cmd(&self) -> Option<&'static str> {
        match self {
            Self::Sbopkg => Some("sbopkg -B -i"),
            Self::Sbotools => Some("sboinstall -r"),
            Self::Custom => None,
        }
    }

    fn default_upgrade_cmd(&self) -> Option<&'static str> {
        match self {
            Self::Sbopkg => Some("sbopkg -B -i"),
            Self::Sbotools => Some("sboupgrade -r"),
            Self::Custom => None,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sbopkg => write!(f, "sbopkg"),
            Self::Sbotools => write!(f, "sbotools"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Configuration file as written, before defaults are applied
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    repo_dir: Option<PathBuf>,
    repo_tag: Option<String>,
    package_manager: Option<PackageManager>,
    sync_cmd: Option<String>,
    install_cmd: Option<String>,
    upgrade_cmd: Option<String>,
    #[serde(default)]
    install_vars: String,
    #[serde(default)]
    install_clos: String,
    #[serde(default)]
    upgrade_vars: String,
    #[serde(default)]
    upgrade_clos: String,
    resolve_deps: Option<bool>,
    rebuild_inv_deps: Option<bool>,
    confirm_changes: Option<bool>,
    package_dir: Option<PathBuf>,
    blacklist_file: Option<PathBuf>,
    ignore_versions_file: Option<PathBuf>,
}

/// Resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repo_dir: PathBuf,
    /// Suffix of packages built from this repository
    pub repo_tag: String,
    pub package_manager: PackageManager,
    pub sync_cmd: String,
    pub install_cmd: String,
    pub upgrade_cmd: String,
    /// Placed before `install_cmd`, typically environment assignments
    pub install_vars: String,
    /// Placed after the package name
    pub install_clos: String,
    pub upgrade_vars: String,
    pub upgrade_clos: String,
    pub resolve_deps: bool,
    pub rebuild_inv_deps: bool,
    pub confirm_changes: bool,
    pub package_dir: PathBuf,
    pub blacklist_file: PathBuf,
    pub ignore_versions_file: PathBuf,
}

impl Config {
    /// Defaults for an sbopkg setup on `repo_dir`
    pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            repo_tag: DEFAULT_REPO_TAG.to_string(),
            package_manager: PackageManager::Sbopkg,
            sync_cmd: "sbopkg -r".to_string(),
            install_cmd: "sbopkg -B -i".to_string(),
            upgrade_cmd: "sbopkg -B -i".to_string(),
            install_vars: String::new(),
            install_clos: String::new(),
            upgrade_vars: String::new(),
            upgrade_clos: String::new(),
            resolve_deps: true,
            rebuild_inv_deps: false,
            confirm_changes: true,
            package_dir: PathBuf::from(DEFAULT_PACKAGE_DIR),
            blacklist_file: PathBuf::from(DEFAULT_BLACKLIST_FILE),
            ignore_versions_file: PathBuf::from(DEFAULT_IGNORE_VERSIONS_FILE),
        }
    }

    /// Parse configuration text
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Self::resolve(file)
    }

    /// Load from `path`, or from the first existing default location
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let candidates = Self::search_paths();
                candidates
                    .iter()
                    .find(|p| p.is_file())
                    .cloned()
                    .ok_or(ConfigError::NotFound(candidates))?
            }
        };

        debug!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content, &path)
    }

    /// Default configuration locations, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("slackpick").join("config.toml"));
        }
        paths.push(PathBuf::from(SYSTEM_CONFIG_PATH));
        paths
    }

    fn resolve(file: ConfigFile) -> Result<Self, ConfigError> {
        let repo_dir = file.repo_dir.ok_or(ConfigError::MissingKey {
            key: "repo_dir",
            hint: "",
        })?;
        let manager = file.package_manager.ok_or(ConfigError::MissingKey {
            key: "package_manager",
            hint: " (expected sbopkg, sbotools or custom)",
        })?;

        let command = |value: Option<String>,
                       default: Option<&'static str>,
                       key: &'static str|
         -> Result<String, ConfigError> {
            value
                .or_else(|| default.map(str::to_string))
                .ok_or(ConfigError::MissingKey {
                    key,
                    hint: " (required for the custom package manager)",
                })
        };

        Ok(Self {
            sync_cmd: command(file.sync_cmd, manager.default_sync_cmd(), "sync_cmd")?,
            install_cmd: command(file.install_cmd, manager.default_install_cmd(), "install_cmd")?,
            upgrade_cmd: command(file.upgrade_cmd, manager.default_upgrade_cmd(), "upgrade_cmd")?,
            repo_dir,
            repo_tag: file.repo_tag.unwrap_or_else(|| DEFAULT_REPO_TAG.to_string()),
            package_manager: manager,
            install_vars: file.install_vars,
            install_clos: file.install_clos,
            upgrade_vars: file.upgrade_vars,
            upgrade_clos: file.upgrade_clos,
            resolve_deps: file.resolve_deps.unwrap_or(true),
            rebuild_inv_deps: file.rebuild_inv_deps.unwrap_or(false),
            confirm_changes: file.confirm_changes.unwrap_or(true),
            package_dir: file
                .package_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PACKAGE_DIR)),
            blacklist_file: file
                .blacklist_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_BLACKLIST_FILE)),
            ignore_versions_file: file
                .ignore_versions_file
                .unwrap_or_else(|| PathBuf::from(DEFAULT_IGNORE_VERSIONS_FILE)),
        })
    }
}
