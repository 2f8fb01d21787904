//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, a read-only check of the
//! manifest and the patch files it pins.
//!
//! ## Checks
//!
//! - **Manifest parsing**: the file exists and matches the schema.
//! - **Package names**: non-empty, unique, and a single path component.
//! - **Repository URLs and patch filenames**: present.
//! - **Hash format**: 40 lowercase hexadecimal characters.
//! - **Patch integrity** (skipped with `--skip-patches`): every patch file
//!   exists under the patches directory and its SHA-1 matches the manifest.
//!
//! Every problem found is reported before the command exits with status 1.

use anyhow::{anyhow, Result};
use clap::Args;

use careen::manifest::{self, Manifest};
use careen::output::{OutputConfig, Status};
use careen::settings::Settings;
use careen::verify;

use crate::cli::SettingsArgs;

/// Check the manifest and patch hashes without changing anything
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Only check the manifest itself, not the patch files it references
    #[arg(long)]
    pub skip_patches: bool,
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs, settings: &SettingsArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let settings = settings.resolve()?;

    println!(
        "{} Validating manifest: {}",
        out.marker(Status::Info),
        settings.manifest.display()
    );

    let manifest = match manifest::from_file(&settings.manifest) {
        Ok(manifest) => manifest,
        Err(e) => {
            println!("{} {}", out.marker(Status::Error), e);
            return Err(anyhow!("Manifest could not be loaded"));
        }
    };

    println!(
        "   {} package(s), {} patch(es)",
        manifest.packages.len(),
        manifest.patch_count()
    );

    let mut problems = manifest.problems();
    if !args.skip_patches {
        problems.extend(patch_problems(&manifest, &settings));
    }

    if problems.is_empty() {
        println!("{} Manifest is valid", out.marker(Status::Ok));
        return Ok(());
    }

    for problem in &problems {
        println!("{} {}", out.marker(Status::Error), problem);
    }
    Err(anyhow!("Manifest has {} problem(s)", problems.len()))
}

/// Checks that each patch file exists and hashes to its pinned value.
/// Patches with a malformed hash are left to `Manifest::problems`.
fn patch_problems(manifest: &Manifest, settings: &Settings) -> Vec<String> {
    let mut problems = Vec::new();

    for package in &manifest.packages {
        for patch in &package.patches {
            if patch.filename.is_empty() || !manifest::is_valid_hash(&patch.hash) {
                continue;
            }
            let path = patch.path_in(&settings.patch_dir);
            match verify::compute_hash(&path) {
                Ok(computed) if computed == patch.hash => {}
                Ok(computed) => problems.push(format!(
                    "package '{}': patch {} hashes to {} but the manifest pins {}",
                    package.name, patch.filename, computed, patch.hash
                )),
                Err(e) => problems.push(format!("package '{}': {}", package.name, e)),
            }
        }
    }

    problems
}
