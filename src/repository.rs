//! # Repository Synchronization
//!
//! This module provides the `RepositorySynchronizer`, which brings a package's
//! output directory to the reference named in the manifest. Each destination
//! is in one of two states:
//!
//! - **Absent**: the directory does not exist or has no entries. It is
//!   cloned (full clone, optionally seeded at the manifest `revision`).
//! - **Present**: the directory has entries. Cloning is skipped.
//!
//! In both states the directory is then opened as a repository, the
//! manifest `tag` is resolved, and HEAD is detached at the resolved commit.
//!
//! ## Design
//!
//! Git access goes through the `GitOperations` trait. In the main
//! application `DefaultGitOperations` wraps the system `git` command (see
//! `crate::git`). Tests substitute mock implementations to exercise the
//! state machine without touching a real repository.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::error::{Error, Result};

/// An opened repository: its canonical working-tree root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoHandle {
    pub root: PathBuf,
}

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Full clone of `url` into `target_dir`, seeded at `revision` when it is
    /// non-empty.
    fn clone_repo(&self, url: &str, revision: &str, target_dir: &Path) -> Result<()>;

    /// Opens `path`, which must be the root of a working tree.
    fn open(&self, path: &Path) -> Result<RepoHandle>;

    /// Resolves a tag, branch or commit prefix to a full commit id.
    fn resolve(&self, repo: &RepoHandle, name: &str) -> Result<String>;

    /// Detaches HEAD at `commit`.
    fn set_detached_head(&self, repo: &RepoHandle, commit: &str) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command to perform real Git operations.
pub struct DefaultGitOperations;

impl GitOperations for DefaultGitOperations {
    fn clone_repo(&self, url: &str, revision: &str, target_dir: &Path) -> Result<()> {
        let spinner = crate::progress::spinner(format!("Cloning {}", url));
        let result = crate::git::clone(url, revision, target_dir);
        spinner.finish_and_clear();
        result
    }

    fn open(&self, path: &Path) -> Result<RepoHandle> {
        crate::git::open(path).map(|root| RepoHandle { root })
    }

    fn resolve(&self, repo: &RepoHandle, name: &str) -> Result<String> {
        crate::git::resolve_dwim(&repo.root, name)
    }

    fn set_detached_head(&self, repo: &RepoHandle, commit: &str) -> Result<()> {
        crate::git::set_detached_head(&repo.root, commit)
    }
}

/// What `synchronize` did for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// True if the destination was Absent and got cloned.
    pub cloned: bool,
    /// Commit HEAD was detached at.
    pub commit: String,
}

/// Returns true when `path` does not exist or is a directory with no entries.
///
/// A path whose existence cannot be determined, or that exists but cannot be
/// listed (including a regular file), is an `Error::DirectoryList`.
pub fn is_absent(path: &Path) -> Result<bool> {
    let exists = path.try_exists().map_err(|source| Error::DirectoryList {
        path: path.to_path_buf(),
        source,
    })?;
    if !exists {
        return Ok(true);
    }
    let mut entries = std::fs::read_dir(path).map_err(|source| Error::DirectoryList {
        path: path.to_path_buf(),
        source,
    })?;
    match entries.next() {
        None => Ok(true),
        Some(Ok(_)) => Ok(false),
        Some(Err(source)) => Err(Error::DirectoryList {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Clones (when needed) and checks out packages.
pub struct RepositorySynchronizer {
    git_ops: Box<dyn GitOperations>,
}

impl RepositorySynchronizer {
    /// Creates a synchronizer backed by the system `git` command.
    pub fn new() -> Self {
        Self {
            git_ops: Box::new(DefaultGitOperations),
        }
    }

    /// Creates a synchronizer with a custom `GitOperations` implementation.
    pub fn with_operations(git_ops: Box<dyn GitOperations>) -> Self {
        Self { git_ops }
    }

    /// Brings `dest_dir` to `tag`, cloning `repo_url` first if the directory
    /// is Absent. A populated directory is never re-cloned.
    pub fn synchronize(
        &self,
        repo_url: &str,
        revision: &str,
        tag: &str,
        dest_dir: &Path,
    ) -> Result<SyncOutcome> {
        info!("Checking if repository directory {} is empty", dest_dir.display());
        let cloned = if is_absent(dest_dir)? {
            info!(
                "Attempting to clone repository {} to directory {}",
                repo_url,
                dest_dir.display()
            );
            self.git_ops.clone_repo(repo_url, revision, dest_dir)?;
            true
        } else {
            warn!(
                "Repository directory {} is not empty, skipping clone",
                dest_dir.display()
            );
            false
        };

        info!(
            "Attempting to checkout tag {} from repository directory {}",
            tag,
            dest_dir.display()
        );
        let repo = self.git_ops.open(dest_dir)?;
        let commit = self.git_ops.resolve(&repo, tag)?;
        self.git_ops.set_detached_head(&repo, &commit)?;
        info!(
            "Checked out tag {} ({}) in repository directory {}",
            tag,
            commit,
            dest_dir.display()
        );

        Ok(SyncOutcome { cloned, commit })
    }
}

impl Default for RepositorySynchronizer {
    fn default() -> Self {
        Self::new()
    }
}
