//! # careen
//!
//! This library synchronizes a declared set of source repositories to pinned
//! tags and then applies integrity-checked patches to each of them, driven by
//! a YAML manifest. It backs the `careen` command-line tool but can be used
//! directly by other build tooling.
//!
//! ## Quick Example
//!
//! ```
//! use careen::manifest;
//! use careen::verify;
//!
//! let yaml = r#"
//! version: "1"
//! packages:
//!   - name: foo
//!     repo: https://example.com/foo.git
//!     tag: v1.0.0
//!     patches:
//!       - name: fix
//!         filename: foo/0001-fix.patch
//!         hash: a9993e364706816aba3e25717850c26c9cd0d89d
//! "#;
//! let manifest = manifest::parse(yaml).unwrap();
//! assert_eq!(manifest.packages[0].patches.len(), 1);
//! assert_eq!(verify::digest_hex(b"abc"), manifest.packages[0].patches[0].hash);
//! ```
//!
//! ## Core Concepts
//!
//! - **Manifest (`manifest`)**: packages (repository, revision, tag) and their
//!   ordered patches, each pinned by a SHA-1.
//! - **Verification (`verify`)**: hashes a patch file's exact bytes and
//!   compares with the pinned value.
//! - **Synchronization (`repository`, `git`)**: clones a package when its
//!   directory is absent and detaches HEAD at the manifest tag.
//! - **Application (`apply`)**: runs `git apply` (or another tool) inside the
//!   repository under a timeout.
//! - **Orchestration (`orchestrator`)**: runs the above per package, in
//!   manifest order, stopping at the first failure.
//! - **Settings (`settings`, `defaults`)**: the explicit configuration value
//!   assembled from flags, environment, config file and defaults.

pub mod apply;
pub mod defaults;
pub mod error;
pub mod git;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod repository;
pub mod settings;
pub mod verify;
