//! Handles spawning the real NFC binaries and capturing their output.
//! Invocations are always structured argv, never a shell-interpreted
//! string, so paths and key material cannot be mangled by quoting.

use locksmith_core::error::{LocksmithError, LocksmithResult};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

#[derive(Debug, Clone)]
/// Wraps a concrete binary path and an optional invocation timeout.
pub struct CommandRunner {
    path: PathBuf,
    timeout: Option<Duration>,
}

#[derive(Debug)]
/// Collects stdout, stderr, and exit status from a finished command.
pub struct Output {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl CommandRunner {
    /// Build a new runner targeting the supplied binary.
    pub fn new(path: PathBuf, timeout: Option<Duration>) -> Self {
        Self { path, timeout }
    }

    /// Return the binary path this runner will execute.
    pub fn binary(&self) -> &std::path::Path {
        &self.path
    }

    /// Execute the binary with arguments and capture the result. With a
    /// timeout configured, an overrunning child is killed on expiry;
    /// without one the caller waits as long as the tool runs.
    pub async fn run(&self, args: &[String]) -> LocksmithResult<Output> {
        let mut command = Command::new(&self.path);
        command.args(args);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        let child = command.spawn()?;
        let waited = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| {
                    LocksmithError::Process(format!(
                        "{} timed out after {:?}",
                        self.path.display(),
                        limit
                    ))
                })?,
            None => child.wait_with_output().await,
        };

        let output = waited?;
        Ok(Output {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status.code().unwrap_or(-1),
        })
    }
}
