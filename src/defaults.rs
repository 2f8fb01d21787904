//! Default values for careen configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base name of the configuration file, searched with each supported extension.
pub const CONFIG_FILE_STEM: &str = "config";

/// Extensions searched for configuration files, in order.
pub const CONFIG_EXTENSIONS: &[&str] = &["yaml", "yml", "toml"];

/// Default patch tool timeout.
pub const APPLY_TIMEOUT: Duration = crate::apply::DEFAULT_TIMEOUT;

/// Default manifest location relative to the working directory.
pub fn default_manifest(cwd: &Path) -> PathBuf {
    cwd.join("manifests").join("docker.yaml")
}

/// Default output root relative to the working directory.
pub fn default_output_dir(cwd: &Path) -> PathBuf {
    cwd.join("src")
}

/// Default patch directory relative to the working directory.
pub fn default_patch_dir(cwd: &Path) -> PathBuf {
    cwd.join("patches")
}

/// Directories searched for a configuration file, in order: `~/.careen/`,
/// then the working directory.
pub fn config_search_dirs(cwd: &Path) -> Vec<PathBuf> {
    let mut dirs_list = Vec::new();
    if let Some(home) = dirs::home_dir() {
        dirs_list.push(home.join(".careen"));
    }
    dirs_list.push(cwd.to_path_buf());
    dirs_list
}
