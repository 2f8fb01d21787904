//! CLI argument parsing and command dispatch

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use careen::settings::{Overrides, Settings};

use crate::commands;

/// careen - Synchronize source repositories and apply verified patches
#[derive(Parser, Debug)]
#[command(name = "careen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    settings: SettingsArgs,

    /// Colorize output (always, never, auto)
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = ["error", "warn", "info", "debug", "trace", "off"]
    )]
    log_level: String,
}

/// Flags that feed the run settings. Each can also come from a `CAREEN_*`
/// environment variable; the flag wins when both are set.
#[derive(Args, Debug, Clone, Default)]
pub struct SettingsArgs {
    /// Configuration file (default: first config.{yaml,yml,toml} in ~/.careen or the current directory)
    #[arg(short, long, global = true, value_name = "FILE", env = "CAREEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Manifest listing packages and patches [default: manifests/docker.yaml]
    #[arg(short, long, global = true, value_name = "FILE", env = "CAREEN_MANIFEST")]
    pub manifest: Option<PathBuf>,

    /// Directory repositories are cloned into [default: src]
    #[arg(
        short,
        long,
        global = true,
        value_name = "DIR",
        env = "CAREEN_OUTPUT_DIRECTORY"
    )]
    pub output: Option<PathBuf>,

    /// Directory patch filenames are relative to [default: patches]
    #[arg(
        short,
        long,
        global = true,
        value_name = "DIR",
        env = "CAREEN_PATCHES_DIRECTORY"
    )]
    pub patches: Option<PathBuf>,

    /// Seconds a single patch may take before it is killed [default: 300]
    #[arg(long, global = true, value_name = "SECONDS", env = "CAREEN_APPLY_TIMEOUT")]
    pub timeout: Option<u64>,
}

impl SettingsArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            manifest: self.manifest.clone(),
            output_dir: self.output.clone(),
            patch_dir: self.patches.clone(),
            timeout_secs: self.timeout,
        }
    }

    /// Resolves the full settings against the current directory.
    pub fn resolve(&self) -> Result<Settings> {
        let cwd = std::env::current_dir().context("Cannot determine current directory")?;
        Ok(Settings::resolve(&self.overrides(), &cwd)?)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Clone missing repositories and check out each package's tag
    Clone(commands::clone::CloneArgs),

    /// Verify and apply every package's patches to existing repositories
    Apply(commands::apply::ApplyArgs),

    /// Clone, check out and patch every package in manifest order
    Sync(commands::sync::SyncArgs),

    /// Check the manifest and patch hashes without changing anything
    Validate(commands::validate::ValidateArgs),

    /// Show version, build and platform information
    Version,

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        match self.command {
            Commands::Clone(args) => commands::clone::execute(args, &self.settings, &self.color),
            Commands::Apply(args) => commands::apply::execute(args, &self.settings, &self.color),
            Commands::Sync(args) => commands::sync::execute(args, &self.settings, &self.color),
            Commands::Validate(args) => {
                commands::validate::execute(args, &self.settings, &self.color)
            }
            Commands::Version => commands::version::execute(),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }
}

/// Routes `log` output to stderr at `level`. `RUST_LOG` takes precedence
/// when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // Ignore a second initialisation, e.g. when a test harness already set a logger.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_target(false)
        .try_init();
}
