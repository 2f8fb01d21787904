//! # Clone Command Implementation
//!
//! Synchronizes every package of the manifest without touching patches:
//! missing repositories are cloned into `<output>/<name>` and each one is
//! left with a detached HEAD at the package's tag. Existing, non-empty
//! directories are never re-cloned.

use anyhow::Result;
use clap::Args;

use careen::orchestrator::Stages;

use crate::cli::SettingsArgs;

/// Clone missing repositories and check out each package's tag
#[derive(Args, Debug, Default)]
pub struct CloneArgs {}

/// Execute the `clone` command.
pub fn execute(_args: CloneArgs, settings: &SettingsArgs, color_flag: &str) -> Result<()> {
    let settings = settings.resolve()?;
    super::run_stages(&settings, Stages::Clone, color_flag)?;
    Ok(())
}
