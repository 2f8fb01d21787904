//! Shared test utilities for end-to-end tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_manifest(manifests::EMPTY);
//!     fixture.command().arg("validate").assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::{git_available, manifests, sha1_hex, TestFixture, Upstream};
}

/// Manifest snippets reused across tests.
#[allow(dead_code)]
pub mod manifests {
    /// A manifest with no packages.
    pub const EMPTY: &str = "version: 1\npackages: []\n";

    /// Not YAML at all.
    pub const INVALID_YAML: &str = "packages: [unclosed\n";
}

/// Environment variables the binary reads; cleared so the caller's shell
/// cannot leak into a test.
const CAREEN_ENV: &[&str] = &[
    "CAREEN_CONFIG",
    "CAREEN_MANIFEST",
    "CAREEN_OUTPUT_DIRECTORY",
    "CAREEN_PATCHES_DIRECTORY",
    "CAREEN_APPLY_TIMEOUT",
    "RUST_LOG",
];

/// Lowercase hex SHA-1 of `content`.
#[allow(dead_code)]
pub fn sha1_hex(content: &str) -> String {
    careen::verify::digest_hex(content.as_bytes())
}

/// Whether a `git` binary is on the PATH.
#[allow(dead_code)]
pub fn git_available() -> bool {
    careen::git::is_available()
}

/// A temporary working directory laid out the way `careen` expects by
/// default: `manifests/docker.yaml`, `patches/` and `src/`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write the default manifest.
    pub fn with_manifest(self, content: &str) -> Self {
        self.with_file("manifests/docker.yaml", content)
    }

    /// Write a patch under `patches/`.
    pub fn with_patch(self, filename: &str, content: &str) -> Self {
        self.with_file(&format!("patches/{}", filename), content)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of a package checkout under the default output root.
    pub fn package_dir(&self, name: &str) -> PathBuf {
        self.path().join("src").join(name)
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `careen` command running in the fixture directory, with a private
    /// home directory and no inherited `CAREEN_*` variables.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("careen");
        cmd.current_dir(self.path())
            .env("HOME", self.path().join("home"))
            .env("NO_COLOR", "1");
        for var in CAREEN_ENV {
            cmd.env_remove(var);
        }
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs git in `dir` with a fixed identity so commits work on any machine.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args([
            "-c",
            "user.name=careen",
            "-c",
            "user.email=careen@example.com",
            "-c",
            "commit.gpgsign=false",
            "-c",
            "tag.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// An upstream repository inside a fixture. `README.md` reads
/// `version one\n` at the annotated tag `v1.0.0` and `version two\n` on
/// branch `main`.
#[allow(dead_code)]
pub struct Upstream {
    pub path: PathBuf,
    pub tagged: String,
    pub head: String,
}

#[allow(dead_code)]
impl Upstream {
    /// Creates `upstream/<name>` inside the fixture.
    pub fn create(fixture: &TestFixture, name: &str) -> Self {
        let path = fixture.path().join("upstream").join(name);
        std::fs::create_dir_all(&path).expect("Failed to create upstream dir");

        git(&path, &["init", "--quiet"]);
        git(&path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        std::fs::write(path.join("README.md"), "version one\n").unwrap();
        git(&path, &["add", "README.md"]);
        git(&path, &["commit", "--quiet", "-m", "first"]);
        git(&path, &["tag", "-a", "v1.0.0", "-m", "release"]);
        let tagged = git(&path, &["rev-parse", "HEAD"]);
        std::fs::write(path.join("README.md"), "version two\n").unwrap();
        git(&path, &["commit", "--quiet", "-am", "second"]);
        let head = git(&path, &["rev-parse", "HEAD"]);

        Self { path, tagged, head }
    }

    /// The upstream path as a clone URL.
    pub fn url(&self) -> String {
        self.path.display().to_string()
    }
}

/// A patch that appends a line to `README.md` as it reads at `v1.0.0`.
#[allow(dead_code)]
pub const README_PATCH: &str = "\
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 version one
+patched
";

/// A patch whose context matches nothing in the upstream repository.
#[allow(dead_code)]
pub const CONFLICTING_PATCH: &str = "\
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1,2 @@
 something else entirely
+patched
";
