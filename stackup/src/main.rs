//! `stackup` command-line interface.
//!
//! Results are printed to stdout as pretty JSON; diagnostics go to stderr.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use stackup::core::feature::PackageManager;
use stackup::exit_codes;
use stackup::installer::{InstallOptions, ShellInstaller};
use stackup::io::config::{DEFAULT_CONFIG_FILE, StackupConfig, is_param_key, load_config};
use stackup::logging;
use stackup::report;

#[derive(Parser)]
#[command(
    name = "stackup",
    version,
    about = "Install features into a Next.js project, in dependency order"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ./stackup.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the detected feature flags of a project.
    Scan {
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Describe every available feature.
    Features,
    /// Show what installing the given features would do, without doing it.
    Plan {
        #[arg(required = true)]
        features: Vec<String>,
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Install one feature.
    Install {
        feature: String,
        #[command(flatten)]
        args: InstallArgs,
    },
    /// Install several features in dependency order, stopping at the first failure.
    InstallAll {
        #[arg(required = true)]
        features: Vec<String>,
        #[command(flatten)]
        args: InstallArgs,
    },
}

#[derive(Args)]
struct InstallArgs {
    /// Project directory.
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Package manager for install commands (overrides config).
    #[arg(long, value_name = "PM")]
    package_manager: Option<PackageManager>,

    /// Template parameter, repeatable (e.g. --set project_name=acme).
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

impl InstallArgs {
    fn options(&self) -> InstallOptions {
        InstallOptions {
            package_manager: self.package_manager,
            params: self.params.iter().cloned().collect(),
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if !is_param_key(key) {
        return Err(format!("parameter key '{key}' must match ^[a-z_][a-z0-9_]*$"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config = resolve_config(cli.config.as_deref())?;
    let installer = ShellInstaller::from_config(config);

    match cli.command {
        Command::Scan { path } => {
            print_json(&installer.scan(&path))?;
            Ok(exit_codes::OK)
        }
        Command::Features => {
            print_json(&installer.features())?;
            Ok(exit_codes::OK)
        }
        Command::Plan { features, path } => {
            let plan = installer.plan(&features, &path)?;
            print_json(&plan)?;
            Ok(if plan.is_runnable() {
                exit_codes::OK
            } else {
                exit_codes::REJECTED
            })
        }
        Command::Install { feature, args } => {
            let result = installer.install(&feature, &args.path, &args.options())?;
            report::log_execution(&result);
            print_json(&result)?;
            Ok(report::exit_code(result.outcome))
        }
        Command::InstallAll { features, args } => {
            let result = installer.install_all(
                &features,
                &args.path,
                &args.options(),
                report::log_chain_entry,
            )?;
            report::log_chain(&result);
            print_json(&result)?;
            Ok(report::chain_exit_code(&result))
        }
    }
}

/// An explicit `--config` must exist; the default location is optional.
fn resolve_config(explicit: Option<&Path>) -> Result<StackupConfig> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            load_config(path)
        }
        None => load_config(Path::new(DEFAULT_CONFIG_FILE)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value).context("serialize json")?;
    println!("{payload}");
    Ok(())
}
