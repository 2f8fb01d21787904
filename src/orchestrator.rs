//! # Pipeline Orchestration
//!
//! The orchestrator walks a loaded manifest and drives the other components
//! in a fixed order:
//!
//! 1. For each package, in manifest order, synchronize `output_root/name`
//!    (clone if absent, then detach at `tag`).
//! 2. For each patch of that package, in manifest order, verify the patch
//!    file's SHA-1 against the pinned hash, and only then apply it.
//!
//! Processing is strictly sequential and fail-fast: the first error stops
//! the whole run, including packages that have not been started. Nothing is
//! rolled back, so the tree on disk reflects every step that succeeded.
//!
//! Errors are returned wrapped in `Error::Package` or `Error::Patch` so the
//! caller can report which package and patch failed.
//!
//! The `clone` and `apply` commands run only one half of the pipeline; see
//! [`Stages`].

use std::path::{Path, PathBuf};

use log::info;

use crate::apply::PatchOperations;
use crate::error::{Error, Result};
use crate::manifest::{self, Manifest, Package};
use crate::repository::RepositorySynchronizer;
use crate::verify;

/// Which halves of the pipeline a run performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stages {
    /// Synchronize repositories only.
    Clone,
    /// Verify and apply patches only; repositories must already exist.
    Apply,
    /// Synchronize each package, then patch it.
    All,
}

impl Stages {
    fn synchronizes(self) -> bool {
        matches!(self, Stages::Clone | Stages::All)
    }

    fn patches(self) -> bool {
        matches!(self, Stages::Apply | Stages::All)
    }
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Packages processed.
    pub packages: usize,
    /// Packages that were freshly cloned.
    pub cloned: usize,
    /// Packages checked out (cloned or not).
    pub checked_out: usize,
    /// Patches verified and applied.
    pub patches_applied: usize,
}

/// Drives synchronization and patching for a manifest.
pub struct Orchestrator {
    synchronizer: RepositorySynchronizer,
    applicator: Box<dyn PatchOperations>,
    output_root: PathBuf,
    patch_root: PathBuf,
}

impl Orchestrator {
    pub fn new(
        synchronizer: RepositorySynchronizer,
        applicator: Box<dyn PatchOperations>,
        output_root: impl Into<PathBuf>,
        patch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            synchronizer,
            applicator,
            output_root: output_root.into(),
            patch_root: patch_root.into(),
        }
    }

    /// Loads the manifest at `manifest_path` and executes `stages` for every
    /// package.
    pub fn run(&self, manifest_path: &Path, stages: Stages) -> Result<RunSummary> {
        info!("Using manifest {}", manifest_path.display());
        let manifest = manifest::from_file(manifest_path)?;
        self.execute(&manifest, stages)
    }

    /// Executes `stages` for every package of an already loaded manifest.
    pub fn execute(&self, manifest: &Manifest, stages: Stages) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for package in &manifest.packages {
            let repo_dir = package
                .output_dir(&self.output_root)
                .map_err(|e| e.in_package(&package.name))?;

            if stages.synchronizes() {
                let outcome = self
                    .synchronizer
                    .synchronize(&package.repo_url, &package.revision, &package.tag, &repo_dir)
                    .map_err(|e| e.in_package(&package.name))?;
                summary.checked_out += 1;
                if outcome.cloned {
                    summary.cloned += 1;
                }
            }

            if stages.patches() {
                summary.patches_applied += self.patch_package(package, &repo_dir)?;
            }

            summary.packages += 1;
        }

        Ok(summary)
    }

    /// Verifies then applies each patch of `package` in order. Returns the
    /// number of patches applied.
    fn patch_package(&self, package: &Package, repo_dir: &Path) -> Result<usize> {
        info!("Applying patches to package: {}", package.name);

        for patch in &package.patches {
            let patch_path = patch.path_in(&self.patch_root);
            let in_patch = |e: Error| e.in_patch(&package.name, patch.label(), &patch.filename);

            info!(
                "Applying patch {} to repo {}",
                patch_path.display(),
                repo_dir.display()
            );
            verify::ensure_verified(&patch_path, &patch.hash).map_err(in_patch)?;
            self.applicator
                .apply(repo_dir, &patch_path)
                .map_err(in_patch)?;
            info!(
                "Applied patch {} to repo {}",
                patch_path.display(),
                repo_dir.display()
            );
        }

        Ok(package.patches.len())
    }
}
