//! # Run Settings
//!
//! `Settings` is the explicit configuration value handed to the orchestrator.
//! It is built once per invocation from four layers, highest priority first:
//!
//! 1. command-line flags,
//! 2. `CAREEN_*` environment variables,
//! 3. a configuration file,
//! 4. built-in defaults (see `crate::defaults`).
//!
//! The first two layers are merged by `clap` before they reach this module
//! and arrive together as `Overrides`. This module adds the file and default
//! layers.
//!
//! ## Configuration file
//!
//! An explicit `--config` path must exist. Otherwise the first
//! `config.{yaml,yml,toml}` found in `~/.careen/` or the working directory is
//! used, and having none is fine. Both formats share one schema:
//!
//! ```yaml
//! manifest: manifests/docker.yaml
//! output:
//!   directory: src
//! patches:
//!   directory: patches
//! apply:
//!   timeout: 300   # seconds
//! ```
//!
//! Relative paths, wherever they come from, are taken relative to the
//! working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use log::info;
use serde::Deserialize;

use crate::defaults;
use crate::error::{Error, Result};

/// Values already resolved from flags and environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub patch_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
}

/// Contents of a configuration file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub manifest: Option<PathBuf>,
    pub output: DirectorySection,
    pub patches: DirectorySection,
    pub apply: ApplySection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectorySection {
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApplySection {
    /// Seconds.
    pub timeout: Option<u64>,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub manifest: PathBuf,
    pub output_dir: PathBuf,
    pub patch_dir: PathBuf,
    pub apply_timeout: Duration,
    /// The configuration file that was read, if any.
    pub config_file: Option<PathBuf>,
}

/// Parses a configuration file, choosing the format from its extension.
/// Anything other than `.toml` is read as YAML.
pub fn load_file(path: &Path) -> Result<FileSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::Settings {
        message: format!("cannot read config file {}: {}", path.display(), e),
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        Ok(toml::from_str(&content)?)
    } else if content.trim().is_empty() {
        Ok(FileSettings::default())
    } else {
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Returns the first existing `config.<ext>` in `search_dirs`.
pub fn discover(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs.iter().find_map(|dir| {
        defaults::CONFIG_EXTENSIONS
            .iter()
            .map(|ext| dir.join(format!("{}.{}", defaults::CONFIG_FILE_STEM, ext)))
            .find(|candidate| candidate.is_file())
    })
}

impl Settings {
    /// Resolves settings, searching the standard locations for a config file.
    pub fn resolve(overrides: &Overrides, cwd: &Path) -> Result<Self> {
        Self::resolve_with_search(overrides, cwd, &defaults::config_search_dirs(cwd))
    }

    /// Resolves settings, searching `search_dirs` for a config file when none
    /// is given explicitly.
    pub fn resolve_with_search(
        overrides: &Overrides,
        cwd: &Path,
        search_dirs: &[PathBuf],
    ) -> Result<Self> {
        let config_file = match &overrides.config {
            Some(path) => Some(cwd.join(path)),
            None => discover(search_dirs),
        };

        let file = match &config_file {
            Some(path) => {
                info!("Using careen config file: {}", path.display());
                load_file(path)?
            }
            None => FileSettings::default(),
        };

        let pick = |flag: &Option<PathBuf>, from_file: Option<PathBuf>, default: PathBuf| {
            flag.clone()
                .or(from_file)
                .map(|p| cwd.join(p))
                .unwrap_or(default)
        };

        let timeout_secs = overrides
            .timeout_secs
            .or(file.apply.timeout)
            .unwrap_or(defaults::APPLY_TIMEOUT.as_secs());
        if timeout_secs == 0 {
            return Err(Error::Settings {
                message: "apply timeout must be at least one second".to_string(),
            });
        }

        Ok(Settings {
            manifest: pick(&overrides.manifest, file.manifest, defaults::default_manifest(cwd)),
            output_dir: pick(
                &overrides.output_dir,
                file.output.directory,
                defaults::default_output_dir(cwd),
            ),
            patch_dir: pick(
                &overrides.patch_dir,
                file.patches.directory,
                defaults::default_patch_dir(cwd),
            ),
            apply_timeout: Duration::from_secs(timeout_secs),
            config_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn no_search() -> Vec<PathBuf> {
        Vec::new()
    }

    #[test]
    fn test_defaults_when_nothing_given() {
        let cwd = Path::new("/work");
        let settings =
            Settings::resolve_with_search(&Overrides::default(), cwd, &no_search()).unwrap();
        assert_eq!(settings.manifest, PathBuf::from("/work/manifests/docker.yaml"));
        assert_eq!(settings.output_dir, PathBuf::from("/work/src"));
        assert_eq!(settings.patch_dir, PathBuf::from("/work/patches"));
        assert_eq!(settings.apply_timeout, Duration::from_secs(300));
        assert_eq!(settings.config_file, None);
    }

    #[test]
    fn test_yaml_file_overrides_defaults() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.yaml"),
            "manifest: m.yaml\noutput:\n  directory: out\napply:\n  timeout: 12\n",
        )
        .unwrap();

        let settings = Settings::resolve_with_search(
            &Overrides::default(),
            temp.path(),
            &[temp.path().to_path_buf()],
        )
        .unwrap();

        assert_eq!(settings.manifest, temp.path().join("m.yaml"));
        assert_eq!(settings.output_dir, temp.path().join("out"));
        assert_eq!(settings.patch_dir, temp.path().join("patches"));
        assert_eq!(settings.apply_timeout, Duration::from_secs(12));
        assert_eq!(settings.config_file, Some(temp.path().join("config.yaml")));
    }

    #[test]
    fn test_overrides_beat_file() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join("config.toml"),
            "manifest = \"file.yaml\"\n[patches]\ndirectory = \"file-patches\"\n[apply]\ntimeout = 5\n",
        )
        .unwrap();

        let overrides = Overrides {
            manifest: Some(PathBuf::from("/abs/flag.yaml")),
            timeout_secs: Some(9),
            ..Default::default()
        };
        let settings =
            Settings::resolve_with_search(&overrides, temp.path(), &[temp.path().to_path_buf()])
                .unwrap();

        assert_eq!(settings.manifest, PathBuf::from("/abs/flag.yaml"));
        assert_eq!(settings.patch_dir, temp.path().join("file-patches"));
        assert_eq!(settings.apply_timeout, Duration::from_secs(9));
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let temp = TempDir::new().unwrap();
        let overrides = Overrides {
            config: Some(PathBuf::from("missing.yaml")),
            ..Default::default()
        };
        let err = Settings::resolve_with_search(&overrides, temp.path(), &no_search()).unwrap_err();
        assert!(matches!(err, Error::Settings { .. }));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "outptu:\n  directory: x\n").unwrap();
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn test_empty_yaml_file_is_empty_settings() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(load_file(&path).unwrap(), FileSettings::default());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let overrides = Overrides {
            timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(Settings::resolve_with_search(&overrides, Path::new("/w"), &no_search()).is_err());
    }

    #[test]
    fn test_discover_prefers_earlier_dirs_and_extension_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        std::fs::write(second.path().join("config.yaml"), "").unwrap();
        std::fs::write(first.path().join("config.toml"), "").unwrap();
        std::fs::write(first.path().join("config.yml"), "").unwrap();

        let found = discover(&[first.path().to_path_buf(), second.path().to_path_buf()]);
        assert_eq!(found, Some(first.path().join("config.yml")));
        assert_eq!(discover(&no_search()), None);
    }
}
