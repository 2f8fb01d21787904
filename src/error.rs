//! # Error Handling
//!
//! This module defines the centralized error type for `careen`. It uses the
//! `thiserror` library to build a single `Error` enum covering every failure
//! the synchronization and patch pipeline can hit, each with enough context
//! for an operator to act on it.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Variants group into a few families:
//!   - Manifest problems (`ManifestRead`, `ManifestParse`, `InvalidManifest`).
//!   - Integrity failures (`Integrity`, `PatchRead`), raised when a patch file no longer
//!     matches its pinned SHA-1.
//!   - Synchronization failures (`GitClone`, `GitOpen`, `GitResolve`,
//!     `GitCheckout`, `DirectoryList`).
//!   - Patch application failures (`PatchSpawn`, `PatchApply`, `PatchTimeout`,
//!     `ProcessKill`).
//!   - Settings and wrapped library errors (`Settings`, `Io`, `Yaml`, `Toml`).
//!   - Context wrappers (`Package`, `Patch`) added by the orchestrator so the
//!     first failure names the package and patch it came from.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Every error is fatal to a run. Nothing in the pipeline retries.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for careen operations
#[derive(Error, Debug)]
pub enum Error {
    /// The manifest file could not be opened or read.
    #[error("Error reading manifest {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest file is not well-formed YAML or does not match the schema.
    #[error("Error parsing manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The manifest parsed but contains values that cannot be used safely,
    /// such as a package name that escapes the output root.
    #[error("Invalid manifest: {message}")]
    InvalidManifest { message: String },

    /// A patch file's SHA-1 does not match the hash pinned in the manifest.
    #[error("Computed hash {computed} of {} does not equal expected hash {expected}", path.display())]
    Integrity {
        path: PathBuf,
        expected: String,
        computed: String,
    },

    /// A patch file could not be read for verification.
    #[error("Error reading patch {}: {source}", path.display())]
    PatchRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The destination directory exists but could not be listed.
    #[error("Cannot list repository directory {}: {source}", path.display())]
    DirectoryList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cloning a repository failed (network, authentication, bad revision).
    #[error("Git clone error for {url}{}: {message}", revision_suffix(revision))]
    GitClone {
        url: String,
        revision: String,
        message: String,
    },

    /// The destination directory is not the root of a git repository.
    #[error("Cannot open repository {}: {message}", path.display())]
    GitOpen { path: PathBuf, message: String },

    /// A reference name did not match any tag, branch or commit.
    #[error("Cannot resolve reference '{reference}' in {}", path.display())]
    GitResolve { path: PathBuf, reference: String },

    /// Moving HEAD to the resolved commit failed.
    #[error("Cannot check out {commit} in {}: {message}", path.display())]
    GitCheckout {
        path: PathBuf,
        commit: String,
        message: String,
    },

    /// A path could not be made absolute.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// The patch tool could not be started at all.
    #[error("Failed to run \"{command}\": {source}")]
    PatchSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The patch tool exited with a non-zero status.
    #[error("There was an error running \"{command}\" ({status})\nStdout:\n{stdout}\nStderr:\n{stderr}")]
    PatchApply {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    /// The patch tool did not finish within the configured timeout and was killed.
    #[error("\"{command}\" timed out after {}s and was killed", timeout.as_secs())]
    PatchTimeout {
        command: String,
        timeout: Duration,
        /// Process id of the killed (and reaped) tool.
        pid: u32,
    },

    /// A timed-out patch tool could not be terminated. The process may still
    /// be running and needs operator attention.
    #[error("FATAL: failed to terminate \"{command}\" (pid {pid}) after timeout: {source}")]
    ProcessKill {
        command: String,
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file could not be read or understood.
    #[error("Settings error: {message}")]
    Settings { message: String },

    /// A failure while synchronizing a package.
    #[error("package '{package}': {source}")]
    Package {
        package: String,
        #[source]
        source: Box<Error>,
    },

    /// A failure while verifying or applying a patch.
    #[error("package '{package}', patch '{patch}' ({filename}): {source}")]
    Patch {
        package: String,
        patch: String,
        filename: String,
        #[source]
        source: Box<Error>,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A TOML parsing error, wrapped from `toml::de::Error`.
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn revision_suffix(revision: &str) -> String {
    if revision.is_empty() {
        String::new()
    } else {
        format!("@{}", revision)
    }
}

impl Error {
    /// Wraps an error with the package it occurred in.
    pub fn in_package(self, package: &str) -> Self {
        Error::Package {
            package: package.to_string(),
            source: Box::new(self),
        }
    }

    /// Wraps an error with the package and patch it occurred in.
    pub fn in_patch(self, package: &str, patch: &str, filename: &str) -> Self {
        Error::Patch {
            package: package.to_string(),
            patch: patch.to_string(),
            filename: filename.to_string(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, looking through `Package` and `Patch`
    /// context wrappers.
    pub fn root(&self) -> &Error {
        match self {
            Error::Package { source, .. } | Error::Patch { source, .. } => source.root(),
            other => other,
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
