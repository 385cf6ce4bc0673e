// src/executor/shell.rs

//! Package manager commands run through the shell
//!
//! Install and upgrade commands are composed as
//! `<vars> <cmd> <name> <clos>` from the configuration, so `vars` can carry
//! environment assignments and `clos` trailing options. Removal always uses
//! `removepkg` on the installed package's full name.

use std::io;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::package::BuildItem;
use crate::planner::ActionKind;

use super::{EXIT_TOOL_NOT_FOUND, PackageManagerCommandRunner};

const REMOVEPKG: &str = "removepkg";

/// Runs configured package manager commands via `sh -c`
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    install_cmd: String,
    install_vars: String,
    install_clos: String,
    upgrade_cmd: String,
    upgrade_vars: String,
    upgrade_clos: String,
    sync_cmd: String,
    remove_cmd: String,
}

impl ShellCommandRunner {
    pub fn new(config: &Config) -> Self {
        Self {
            install_cmd: config.install_cmd.clone(),
            install_vars: config.install_vars.clone(),
            install_clos: config.install_clos.clone(),
            upgrade_cmd: config.upgrade_cmd.clone(),
            upgrade_vars: config.upgrade_vars.clone(),
            upgrade_clos: config.upgrade_clos.clone(),
            sync_cmd: config.sync_cmd.clone(),
            remove_cmd: REMOVEPKG.to_string(),
        }
    }

    /// Use a different removal command (for testing on non-Slackware hosts)
    pub fn with_remove_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.remove_cmd = cmd.into();
        self
    }

    pub fn install_command(&self, item: &BuildItem) -> String {
        compose(&self.install_vars, &self.install_cmd, &item.name, &self.install_clos)
    }

    pub fn upgrade_command(&self, item: &BuildItem) -> String {
        compose(&self.upgrade_vars, &self.upgrade_cmd, &item.name, &self.upgrade_clos)
    }

    pub fn remove_command(&self, item: &BuildItem) -> Result<String> {
        let full_name = item
            .package_full_name()
            .ok_or_else(|| Error::NotInstalled(item.name.clone()))?;
        Ok(format!("{} {}", self.remove_cmd, full_name))
    }

    /// Locate the executables needed for `actions`
    pub fn check_available(
        &self,
        actions: impl IntoIterator<Item = ActionKind>,
    ) -> Result<Vec<PathBuf>> {
        let mut programs: Vec<&str> = Vec::new();
        for action in actions {
            let commands: Vec<&str> = match action {
                ActionKind::Install => vec![self.install_cmd.as_str()],
                ActionKind::Upgrade => vec![self.upgrade_cmd.as_str()],
                ActionKind::Remove => vec![self.remove_cmd.as_str()],
                ActionKind::Reinstall => vec![self.remove_cmd.as_str(), self.install_cmd.as_str()],
            };
            for program in commands.into_iter().filter_map(|cmd| cmd.split_whitespace().next()) {
                if !programs.contains(&program) {
                    programs.push(program);
                }
            }
        }

        programs
            .into_iter()
            .map(|program| {
                which::which(program).map_err(|_| Error::ToolNotFound(program.to_string()))
            })
            .collect()
    }

    /// Refresh the repository tree with the sync command
    pub fn sync(&self) -> Result<i32> {
        run_shell(&self.sync_cmd)
    }
}

impl PackageManagerCommandRunner for ShellCommandRunner {
    fn install(&mut self, item: &BuildItem) -> Result<i32> {
        run_shell(&self.install_command(item))
    }

    fn upgrade(&mut self, item: &BuildItem) -> Result<i32> {
        run_shell(&self.upgrade_command(item))
    }

    fn remove(&mut self, item: &BuildItem) -> Result<i32> {
        run_shell(&self.remove_command(item)?)
    }
}

/// Join command parts, skipping empty ones
fn compose(vars: &str, cmd: &str, name: &str, clos: &str) -> String {
    [vars, cmd, name, clos]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command line and return its exit code
///
/// A missing shell maps to 127; termination by a signal maps to -1.
fn run_shell(cmd: &str) -> Result<i32> {
    debug!("Running: {}", cmd);
    match Command::new("sh").arg("-c").arg(cmd).status() {
        Ok(status) => Ok(status.code().unwrap_or(-1)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(EXIT_TOOL_NOT_FOUND),
        Err(e) => Err(Error::Io(e)),
    }
}
