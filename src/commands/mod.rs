//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the `careen`
//! command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` together with the
//!   global settings flags and performs the command's logic.
//!
//! `clone`, `apply` and `sync` differ only in which pipeline stages they run,
//! so they share [`run_stages`].

pub mod apply;
pub mod clone;
pub mod completions;
pub mod sync;
pub mod validate;
pub mod version;

use anyhow::{Context, Result};

use careen::apply::PatchApplicator;
use careen::orchestrator::{Orchestrator, RunSummary, Stages};
use careen::output::{OutputConfig, Status};
use careen::repository::RepositorySynchronizer;
use careen::settings::Settings;

/// Builds an orchestrator from `settings` and runs `stages` over the
/// manifest, printing a one-line summary on success.
pub fn run_stages(settings: &Settings, stages: Stages, color_flag: &str) -> Result<RunSummary> {
    let out = OutputConfig::from_env_and_flag(color_flag);

    if matches!(stages, Stages::Clone | Stages::All) {
        std::fs::create_dir_all(&settings.output_dir).with_context(|| {
            format!(
                "Cannot create output directory {}",
                settings.output_dir.display()
            )
        })?;
    }

    let orchestrator = Orchestrator::new(
        RepositorySynchronizer::new(),
        Box::new(PatchApplicator::git(settings.apply_timeout)),
        &settings.output_dir,
        &settings.patch_dir,
    );

    let summary = orchestrator.run(&settings.manifest, stages)?;

    match stages {
        Stages::Clone => println!(
            "{} Checked out {} package(s), {} newly cloned",
            out.marker(Status::Ok),
            summary.checked_out,
            summary.cloned
        ),
        Stages::Apply => println!(
            "{} Applied {} patch(es) across {} package(s)",
            out.marker(Status::Ok),
            summary.patches_applied,
            summary.packages
        ),
        Stages::All => println!(
            "{} Synchronized {} package(s) ({} newly cloned), applied {} patch(es)",
            out.marker(Status::Ok),
            summary.packages,
            summary.cloned,
            summary.patches_applied
        ),
    }

    Ok(summary)
}
