// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Common argument: package name
fn package_arg() -> Arg {
    Arg::new("package").required(true).help("Package name")
}

/// Flags shared by commands that build and apply a plan
fn plan_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("no_deps")
            .long("no-deps")
            .action(ArgAction::SetTrue)
            .help("Do not resolve dependencies"),
    )
    .arg(
        Arg::new("rebuild_inverse_deps")
            .long("rebuild-inverse-deps")
            .action(ArgAction::SetTrue)
            .help("Rebuild installed packages that depend on an upgraded package"),
    )
    .arg(
        Arg::new("yes")
            .short('y')
            .long("yes")
            .action(ArgAction::SetTrue)
            .help("Do not ask for confirmation"),
    )
    .arg(
        Arg::new("dry_run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Show the plan without applying it"),
    )
}

/// Single-package plan command with mark editing
fn plan_command(name: &'static str, about: &'static str) -> Command {
    plan_flags(Command::new(name).about(about).arg(package_arg()))
        .arg(
            Arg::new("mark")
                .long("mark")
                .value_name("PACKAGE")
                .action(ArgAction::Append)
                .help("Mark a plan entry for execution (repeatable)"),
        )
        .arg(
            Arg::new("unmark")
                .long("unmark")
                .value_name("PACKAGE")
                .action(ArgAction::Append)
                .help("Unmark a plan entry (repeatable)"),
        )
}

fn build_cli() -> Command {
    Command::new("slackpick")
        .version(env!("CARGO_PKG_VERSION"))
        .author("slackpick Contributors")
        .about("Browse and install packages from a SlackBuilds repository")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .global(true)
                .help("Configuration file (default: user config dir, then /etc/slackpick)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Show informational log messages"),
        )
        .subcommand(
            Command::new("list")
                .about("List packages in the repository")
                .arg(
                    Arg::new("installed")
                        .short('i')
                        .long("installed")
                        .action(ArgAction::SetTrue)
                        .help("Only installed packages"),
                )
                .arg(
                    Arg::new("upgradable")
                        .short('u')
                        .long("upgradable")
                        .action(ArgAction::SetTrue)
                        .help("Only packages with a newer version or build available"),
                )
                .arg(
                    Arg::new("non_deps")
                        .long("non-deps")
                        .action(ArgAction::SetTrue)
                        .help("Only installed packages no other installed package requires"),
                )
                .arg(
                    Arg::new("blacklisted")
                        .long("blacklisted")
                        .action(ArgAction::SetTrue)
                        .help("Only blacklisted packages"),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .help("Restrict to one category"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search package names (case-insensitive substring)")
                .arg(Arg::new("pattern").required(true).help("Search pattern")),
        )
        .subcommand(
            Command::new("info")
                .about("Show details of a package")
                .arg(package_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print JSON"),
                ),
        )
        .subcommand(
            Command::new("order")
                .about("Show the build order of a package's dependencies")
                .arg(package_arg())
                .arg(
                    Arg::new("live")
                        .long("live")
                        .action(ArgAction::SetTrue)
                        .help("Read requirements from the repository even for installed packages"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print JSON"),
                ),
        )
        .subcommand(
            Command::new("inverse")
                .about("Show installed packages that depend on a package")
                .arg(package_arg()),
        )
        .subcommand(plan_command("install", "Install a package and its dependencies"))
        .subcommand(plan_command("upgrade", "Upgrade a package"))
        .subcommand(plan_command("reinstall", "Reinstall a package"))
        .subcommand(plan_command("remove", "Remove a package"))
        .subcommand(plan_flags(
            Command::new("upgrade-all")
                .about("Upgrade every upgradable package that is not blacklisted"),
        ))
        .subcommand(
            Command::new("sync")
                .about("Update the repository tree with the configured sync command"),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // CARGO_MANIFEST_DIR is always set by cargo
    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = man_dir.join("slackpick.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
