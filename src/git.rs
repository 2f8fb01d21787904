//! Git operations backed by the system `git` command.
//!
//! Using the git binary means authentication works the same way it does for
//! the operator's shell: SSH keys, credential helpers, personal access tokens
//! and anything else configured in `~/.gitconfig`.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::Error;

/// Minimum length accepted when a reference is treated as an abbreviated
/// commit id.
const MIN_ABBREV_LEN: usize = 4;

/// Runs `git <args>`, optionally inside `dir`.
fn run_git(dir: Option<&Path>, args: &[&str]) -> std::io::Result<Output> {
    let mut cmd = Command::new("git");
    if let Some(dir) = dir {
        cmd.arg("-C").arg(dir);
    }
    cmd.args(args).env("GIT_TERMINAL_PROMPT", "0").output()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// Full (non-shallow) clone of `url` into `target_dir`.
///
/// When `revision` is non-empty the fresh clone is detached at that
/// revision before returning.
pub fn clone(url: &str, revision: &str, target_dir: &Path) -> Result<(), Error> {
    if let Some(parent) = target_dir.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let clone_error = |message: String| Error::GitClone {
        url: url.to_string(),
        revision: revision.to_string(),
        message,
    };

    let target = target_dir.to_string_lossy();
    let output = run_git(None, &["clone", "--quiet", "--", url, &target])
        .map_err(|e| clone_error(e.to_string()))?;

    if !output.status.success() {
        let stderr = stderr_of(&output);

        // Provide helpful error message for common auth failures
        let message = if stderr.contains("Authentication failed")
            || stderr.contains("Permission denied")
            || stderr.contains("Could not read from remote repository")
        {
            format!(
                "Authentication failed. Make sure you have access to the repository.\n\
                For private repos, ensure you have:\n\
                - SSH key added to ssh-agent\n\
                - Git credentials configured\n\
                - Personal access token set up\n\
                Error: {}",
                stderr
            )
        } else {
            stderr
        };

        return Err(clone_error(message));
    }

    if !revision.is_empty() {
        let seed_error = |e: Error| {
            clone_error(format!("cannot seed clone at revision {}: {}", revision, e))
        };
        let commit = resolve_dwim(target_dir, revision).map_err(seed_error)?;
        set_detached_head(target_dir, &commit).map_err(seed_error)?;
    }

    Ok(())
}

/// Confirms `path` is the top level of a git working tree and returns its
/// canonical path.
///
/// A subdirectory of some other repository is rejected even though git
/// itself would happily operate on the enclosing repository.
pub fn open(path: &Path) -> Result<PathBuf, Error> {
    let open_error = |message: String| Error::GitOpen {
        path: path.to_path_buf(),
        message,
    };

    let canonical = path
        .canonicalize()
        .map_err(|e| open_error(e.to_string()))?;

    let output = run_git(Some(&canonical), &["rev-parse", "--show-toplevel"])
        .map_err(|e| open_error(e.to_string()))?;
    if !output.status.success() {
        return Err(open_error(stderr_of(&output)));
    }

    let toplevel = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let toplevel = PathBuf::from(toplevel)
        .canonicalize()
        .map_err(|e| open_error(e.to_string()))?;

    if toplevel != canonical {
        return Err(open_error(format!(
            "not a repository root (enclosing repository is {})",
            toplevel.display()
        )));
    }

    Ok(canonical)
}

/// Resolves `rev` to a full commit id, or `None` if it names nothing.
pub fn rev_parse_commit(repo: &Path, rev: &str) -> Result<Option<String>, Error> {
    let peeled = format!("{}^{{commit}}", rev);
    let output = run_git(
        Some(repo),
        &["rev-parse", "--verify", "--quiet", "--end-of-options", &peeled],
    )?;

    if !output.status.success() {
        return Ok(None);
    }

    let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if commit.is_empty() { None } else { Some(commit) })
}

/// Candidate full reference names for a short name, in resolution order.
///
/// Tags win over local branches, which win over `origin` remote-tracking
/// branches. A name that already starts with `refs/` is tried verbatim
/// after those. Abbreviated commit ids are handled separately by
/// [`resolve_dwim`].
pub fn dwim_candidates(name: &str) -> Vec<String> {
    let mut candidates = vec![
        format!("refs/tags/{}", name),
        format!("refs/heads/{}", name),
        format!("refs/remotes/origin/{}", name),
    ];
    if name.starts_with("refs/") {
        candidates.push(name.to_string());
    }
    candidates
}

/// Returns true when `name` could be a (possibly abbreviated) commit id.
pub fn looks_like_commit(name: &str) -> bool {
    (MIN_ABBREV_LEN..=40).contains(&name.len()) && name.chars().all(|c| c.is_ascii_hexdigit())
}

/// Resolves `name` to a commit id using a fixed priority order: tag, local
/// branch, remote-tracking branch, full ref name, then commit id prefix.
/// Annotated tags are peeled to the commit they point at.
pub fn resolve_dwim(repo: &Path, name: &str) -> Result<String, Error> {
    let not_found = || Error::GitResolve {
        path: repo.to_path_buf(),
        reference: name.to_string(),
    };

    if name.is_empty() || name.starts_with('-') {
        return Err(not_found());
    }

    for candidate in dwim_candidates(name) {
        if let Some(commit) = rev_parse_commit(repo, &candidate)? {
            return Ok(commit);
        }
    }

    if looks_like_commit(name) {
        if let Some(commit) = rev_parse_commit(repo, name)? {
            return Ok(commit);
        }
    }

    Err(not_found())
}

/// Points HEAD directly at `commit` and updates the working tree to match.
///
/// Local modifications that would be overwritten make this fail rather than
/// being discarded.
pub fn set_detached_head(repo: &Path, commit: &str) -> Result<(), Error> {
    let checkout_error = |message: String| Error::GitCheckout {
        path: repo.to_path_buf(),
        commit: commit.to_string(),
        message,
    };

    let output = run_git(
        Some(repo),
        &["-c", "advice.detachedHead=false", "checkout", "--quiet", "--detach", commit],
    )
    .map_err(|e| checkout_error(e.to_string()))?;

    if !output.status.success() {
        return Err(checkout_error(stderr_of(&output)));
    }

    Ok(())
}

/// Returns the commit HEAD points at and whether HEAD is detached.
pub fn head_state(repo: &Path) -> Result<(String, bool), Error> {
    let commit = rev_parse_commit(repo, "HEAD")?.ok_or_else(|| Error::GitResolve {
        path: repo.to_path_buf(),
        reference: "HEAD".to_string(),
    })?;
    let symbolic = run_git(Some(repo), &["symbolic-ref", "--quiet", "HEAD"])?;
    Ok((commit, !symbolic.status.success()))
}

/// Returns true if a usable `git` binary is on the PATH.
pub fn is_available() -> bool {
    run_git(None, &["--version"])
        .map(|o| o.status.success())
        .unwrap_or(false)
}
