//! # Manifest Schema and Loading
//!
//! This module defines the data structures that represent a careen manifest
//! and the logic for loading it from disk. A manifest is a YAML document that
//! declares which repositories to clone, which reference to check out, and
//! which patches to apply afterwards:
//!
//! ```yaml
//! version: "1"
//! packages:
//!   - name: docker
//!     repo: https://github.com/docker/docker.git
//!     revision: ""
//!     tag: v1.11.2
//!     patches:
//!       - name: fix-build
//!         filename: docker/0001-fix-build.patch
//!         hash: 3b1e2c9d7d4f5a6b8c9d0e1f2a3b4c5d6e7f8091
//!         documentation:
//!           - Backport of upstream build fix
//! ```
//!
//! Missing fields, and keys left without a value, load as empty values;
//! malformed YAML is an error. Plain scalars keep their text exactly as
//! written, so `tag: 1.10` is the tag `"1.10"`.
//!
//! Package and patch records are plain immutable values once loaded. Names
//! are checked with [`Package::output_dir`] before they are used as a path
//! segment under the output root.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

static SHA1_HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9a-f]{40}$").expect("static regex is valid"));

/// A parsed manifest: the ordered list of packages to process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Informational manifest version.
    #[serde(deserialize_with = "null_as_default")]
    pub version: String,
    /// Packages, in processing order.
    #[serde(deserialize_with = "null_as_default")]
    pub packages: Vec<Package>,
}

/// One repository to synchronize and patch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    /// Directory name of the package under the output root.
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Clone source.
    #[serde(rename = "repo", deserialize_with = "null_as_default")]
    pub repo_url: String,
    /// Commit-ish the fresh clone is seeded at. Empty means the remote default.
    #[serde(deserialize_with = "null_as_default")]
    pub revision: String,
    /// Reference checked out (detached) after synchronization.
    #[serde(deserialize_with = "null_as_default")]
    pub tag: String,
    /// Patches, in application order.
    #[serde(deserialize_with = "null_as_default")]
    pub patches: Vec<Patch>,
}

/// A single patch file pinned by its SHA-1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Patch {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    /// Path relative to the patch directory.
    #[serde(deserialize_with = "null_as_default")]
    pub filename: String,
    /// Lowercase hex SHA-1 of the file's exact bytes.
    #[serde(deserialize_with = "null_as_default")]
    pub hash: String,
    /// Free-form notes. Not interpreted.
    #[serde(deserialize_with = "null_as_default")]
    pub documentation: Vec<String>,
}

/// Reads a key written without a value (YAML null) as the type's empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Package {
    /// Returns `output_root/name`, refusing names that are empty or that would
    /// resolve anywhere other than a direct child of `output_root`.
    pub fn output_dir(&self, output_root: &Path) -> Result<PathBuf> {
        validate_package_name(&self.name)?;
        Ok(output_root.join(&self.name))
    }

    /// Total number of patches declared for this package.
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }
}

impl Patch {
    /// Returns `patch_root/filename`.
    pub fn path_in(&self, patch_root: &Path) -> PathBuf {
        patch_root.join(&self.filename)
    }

    /// Label used in log output: the patch name, or the filename when unnamed.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.filename
        } else {
            &self.name
        }
    }
}

/// Checks that a package name is usable as a single path segment.
pub fn validate_package_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidManifest {
            message: "package name must not be empty".to_string(),
        });
    }

    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !single_normal || name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidManifest {
            message: format!(
                "package name '{}' must be a single directory name without path separators or '..'",
                name
            ),
        });
    }

    Ok(())
}

/// Returns true when `hash` is a lowercase 40-character hex string.
pub fn is_valid_hash(hash: &str) -> bool {
    SHA1_HEX.is_match(hash)
}

impl Manifest {
    /// Number of patches across all packages.
    pub fn patch_count(&self) -> usize {
        self.packages.iter().map(Package::patch_count).sum()
    }

    /// Collects every structural problem in the manifest without touching the
    /// filesystem. An empty result means the manifest is usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        let mut seen = std::collections::HashSet::new();

        for (index, package) in self.packages.iter().enumerate() {
            if let Err(e) = validate_package_name(&package.name) {
                problems.push(format!("packages[{}]: {}", index, e));
            } else if !seen.insert(package.name.as_str()) {
                problems.push(format!(
                    "packages[{}]: duplicate package name '{}'",
                    index, package.name
                ));
            }

            if package.repo_url.is_empty() {
                problems.push(format!(
                    "package '{}': missing 'repo' url",
                    package.name
                ));
            }

            for patch in &package.patches {
                if patch.filename.is_empty() {
                    problems.push(format!(
                        "package '{}', patch '{}': missing 'filename'",
                        package.name,
                        patch.label()
                    ));
                }
                if !is_valid_hash(&patch.hash) {
                    problems.push(format!(
                        "package '{}', patch '{}': hash '{}' is not a lowercase 40-character SHA-1",
                        package.name,
                        patch.label(),
                        patch.hash
                    ));
                }
            }
        }

        problems
    }
}

/// Parses manifest YAML. An empty document yields an empty manifest.
pub fn parse(yaml_content: &str) -> std::result::Result<Manifest, serde_yaml::Error> {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml_content)?;
    if value.is_null() {
        return Ok(Manifest::default());
    }
    serde_yaml::from_value(value)
}

/// Reads and parses the manifest at `path`.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Manifest> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content).map_err(|source| Error::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}
