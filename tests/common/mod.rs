// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use slackpick::{Blacklist, Catalog, Config, IgnoreVersions, PackageLog};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A repository tree, package log and config files in a temp directory.
///
/// Keep the fixture alive for as long as its paths are used.
pub struct RepoFixture {
    dir: TempDir,
}

impl RepoFixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("repo")).unwrap();
        fs::create_dir_all(dir.path().join("packages")).unwrap();
        Self { dir }
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    pub fn package_dir(&self) -> PathBuf {
        self.dir.path().join("packages")
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Add `<category>/<name>` with a `.info` file and a `.SlackBuild` using build 1
    pub fn add_package(&self, category: &str, name: &str, version: &str, requires: &str) -> &Self {
        let pkg = self.repo_dir().join(category).join(name);
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            pkg.join(format!("{}.info", name)),
            format!(
                "PRGNAM=\"{}\"\nVERSION=\"{}\"\nHOMEPAGE=\"https://example.org/{}\"\nREQUIRES=\"{}\"\nMAINTAINER=\"Nobody\"\n",
                name, version, name, requires
            ),
        )
        .unwrap();
        self.set_build(category, name, "1");
        self
    }

    pub fn set_build(&self, category: &str, name: &str, build: &str) -> &Self {
        let script = self
            .repo_dir()
            .join(category)
            .join(name)
            .join(format!("{}.SlackBuild", name));
        fs::write(
            script,
            format!(
                "#!/bin/bash\nPRGNAM={}\nBUILD=${{BUILD:-{}}}\nTAG=${{TAG:-_SBo}}\n",
                name, build
            ),
        )
        .unwrap();
        self
    }

    /// Record a package as installed in the package log
    pub fn install(&self, full_name: &str) -> &Self {
        fs::write(
            self.package_dir().join(full_name),
            format!("PACKAGE NAME:     {}\n", full_name),
        )
        .unwrap();
        self
    }

    pub fn write_blacklist(&self, content: &str) -> &Self {
        fs::write(self.path("package_blacklist"), content).unwrap();
        self
    }

    pub fn write_ignore_versions(&self, content: &str) -> &Self {
        fs::write(self.path("ignore_versions"), content).unwrap();
        self
    }

    /// sbopkg defaults pointed at the fixture's files
    pub fn config(&self) -> Config {
        let mut config = Config::new(self.repo_dir());
        config.package_dir = self.package_dir();
        config.blacklist_file = self.path("package_blacklist");
        config.ignore_versions_file = self.path("ignore_versions");
        config
    }

    /// Catalog loaded from the tree and refreshed against the package log
    pub fn catalog(&self) -> Catalog {
        let config = self.config();
        let mut catalog = Catalog::load(&config.repo_dir).unwrap();
        let log = PackageLog::read(&config.package_dir).unwrap();
        let blacklist = Blacklist::load(&config.blacklist_file).unwrap();
        let ignore = IgnoreVersions::load(&config.ignore_versions_file).unwrap();
        catalog.refresh_installed(&log, &blacklist, &ignore).unwrap();
        catalog
    }

    /// A shell script that appends its arguments to `calls.log`
    ///
    /// Exits with `code` when its last argument is `fail_on`.
    pub fn fake_tool(&self, name: &str, fail_on: Option<(&str, i32)>) -> String {
        let script = self.path(name);
        let log = self.path("calls.log");
        let failure = match fail_on {
            Some((package, code)) => format!(
                "for last in \"$@\"; do :; done\nif [ \"$last\" = \"{}\" ]; then exit {}; fi\n",
                package, code
            ),
            None => String::new(),
        };
        fs::write(
            &script,
            format!("#!/bin/sh\necho \"{} $*\" >> {}\n{}exit 0\n", name, log.display(), failure),
        )
        .unwrap();
        script.display().to_string()
    }

    /// Lines written by fake tools so far
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.path("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
