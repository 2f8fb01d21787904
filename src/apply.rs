//! # Patch Application
//!
//! Runs an external patch tool (by default `git apply <patch>`) against a
//! repository working tree, bounded by a timeout.
//!
//! The tool is started with the repository as its working directory via
//! `Command::current_dir`. The process-wide current directory is never
//! changed, so applying patches is reentrant and leaves the caller's working
//! directory exactly as it was on every exit path.
//!
//! Standard output and standard error are captured on background threads so
//! a chatty tool can never fill a pipe and stall. The child's exit races the
//! timeout:
//!
//! - exit status zero: success, captured output is logged at debug level;
//! - non-zero exit: `Error::PatchApply` carrying the captured output;
//! - timeout: the child and everything in its process group are killed,
//!   the child is reaped, then `Error::PatchTimeout`.
//!   If the kill itself fails the result is `Error::ProcessKill`, which the
//!   caller must treat as fatal.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info};
use wait_timeout::ChildExt;

use crate::error::{Error, Result};

/// Default timeout for a single patch tool invocation (5 minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Trait for applying one patch - allows mocking in tests
pub trait PatchOperations: Send + Sync {
    /// Applies the patch at `patch_path` to the working tree at `repo_dir`.
    fn apply(&self, repo_dir: &Path, patch_path: &Path) -> Result<()>;
}

/// The external program used to apply a patch. The absolute patch path is
/// appended as the final argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchTool {
    pub program: String,
    pub args: Vec<String>,
}

impl PatchTool {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// `git apply`
    pub fn git_apply() -> Self {
        Self::new("git", &["apply"])
    }

    fn display_with(&self, patch: &Path) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.push(patch.display().to_string());
        parts.join(" ")
    }
}

impl Default for PatchTool {
    fn default() -> Self {
        Self::git_apply()
    }
}

/// Applies patches by running a `PatchTool` with a timeout.
#[derive(Debug, Clone)]
pub struct PatchApplicator {
    tool: PatchTool,
    timeout: Duration,
}

impl PatchApplicator {
    pub fn new(tool: PatchTool, timeout: Duration) -> Self {
        Self { tool, timeout }
    }

    /// `git apply` with the given timeout.
    pub fn git(timeout: Duration) -> Self {
        Self::new(PatchTool::git_apply(), timeout)
    }
}

impl Default for PatchApplicator {
    fn default() -> Self {
        Self::git(DEFAULT_TIMEOUT)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::Path {
        message: format!("cannot resolve {}: {}", path.display(), e),
    })
}

/// Drains a child pipe on its own thread.
fn capture<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn join_output(handle: JoinHandle<String>) -> String {
    handle.join().unwrap_or_default()
}

/// Puts the tool in a process group of its own so a timeout can take down
/// anything it forked.
#[cfg(unix)]
fn isolate(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn isolate(_cmd: &mut Command) {}

/// Sends SIGKILL to the child's whole process group.
#[cfg(unix)]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    let pgid = child.id() as libc::pid_t;
    // SAFETY: kill(2) has no memory-safety preconditions; the negative pid
    // addresses only the group created for this child by `isolate`.
    if unsafe { libc::kill(-pgid, libc::SIGKILL) } == 0 {
        return Ok(());
    }
    let err = io::Error::last_os_error();
    if err.raw_os_error() == Some(libc::ESRCH) {
        // Group already empty; make sure the direct child is gone too.
        return child.kill();
    }
    Err(err)
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) -> io::Result<()> {
    child.kill()
}

/// Kills a timed-out child together with its descendants and reaps it so no
/// process is left behind.
fn terminate(child: &mut Child, command: &str) -> Result<()> {
    let pid = child.id();
    kill_tree(child).map_err(|source| Error::ProcessKill {
        command: command.to_string(),
        pid,
        source,
    })?;
    child.wait().map_err(|source| Error::ProcessKill {
        command: command.to_string(),
        pid,
        source,
    })?;
    Ok(())
}

impl PatchOperations for PatchApplicator {
    fn apply(&self, repo_dir: &Path, patch_path: &Path) -> Result<()> {
        let repo_dir = absolute(repo_dir)?;
        let patch_path = absolute(patch_path)?;
        let command = self.tool.display_with(&patch_path);

        info!("Running command \"{}\" in {}", command, repo_dir.display());

        let mut cmd = Command::new(&self.tool.program);
        cmd.args(&self.tool.args)
            .arg(&patch_path)
            .current_dir(&repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        isolate(&mut cmd);

        let mut child = cmd
            .spawn()
            .map_err(|source| Error::PatchSpawn {
                command: command.clone(),
                source,
            })?;

        let stdout = capture(child.stdout.take());
        let stderr = capture(child.stderr.take());

        let status = match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => status,
            Ok(None) => {
                let pid = child.id();
                error!(
                    "\"{}\" did not finish within {}s, killing pid {}",
                    command,
                    self.timeout.as_secs(),
                    pid
                );
                terminate(&mut child, &command)?;
                // Reader threads are detached: a grandchild may still hold
                // the pipes open.
                return Err(Error::PatchTimeout {
                    command,
                    timeout: self.timeout,
                    pid,
                });
            }
            Err(e) => {
                terminate(&mut child, &command)?;
                return Err(Error::Io(e));
            }
        };

        let stdout = join_output(stdout);
        let stderr = join_output(stderr);

        if !status.success() {
            error!("Stdout:\n {}", stdout);
            error!("Stderr:\n {}", stderr);
            return Err(Error::PatchApply {
                command,
                status: status.to_string(),
                stdout,
                stderr,
            });
        }

        debug!("Stdout:\n {}", stdout);
        debug!("Stderr:\n {}", stderr);
        info!("Command completed successfully");
        Ok(())
    }
}
