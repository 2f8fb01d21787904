//! # Sync Command Implementation
//!
//! Runs the full pipeline. For each package in manifest order the repository
//! is synchronized and then its patches are verified and applied in order.
//! The first failure stops the run; packages already processed stay as they
//! are.

use anyhow::Result;
use clap::Args;

use careen::orchestrator::Stages;

use crate::cli::SettingsArgs;

/// Clone, check out and patch every package in manifest order
#[derive(Args, Debug, Default)]
pub struct SyncArgs {}

/// Execute the `sync` command.
pub fn execute(_args: SyncArgs, settings: &SettingsArgs, color_flag: &str) -> Result<()> {
    let settings = settings.resolve()?;
    super::run_stages(&settings, Stages::All, color_flag)?;
    Ok(())
}
