//! # Apply Command Implementation
//!
//! Verifies and applies patches to repositories that were already cloned
//! (typically by `careen clone`). No git synchronization happens here; a
//! package whose directory is missing fails when the patch tool is started.
//!
//! Each patch's SHA-1 is checked before the tool runs, so a tampered or
//! outdated patch file never reaches the working tree.

use anyhow::Result;
use clap::Args;

use careen::orchestrator::Stages;

use crate::cli::SettingsArgs;

/// Verify and apply every package's patches to existing repositories
#[derive(Args, Debug, Default)]
pub struct ApplyArgs {}

/// Execute the `apply` command.
pub fn execute(_args: ApplyArgs, settings: &SettingsArgs, color_flag: &str) -> Result<()> {
    let settings = settings.resolve()?;
    super::run_stages(&settings, Stages::Apply, color_flag)?;
    Ok(())
}
