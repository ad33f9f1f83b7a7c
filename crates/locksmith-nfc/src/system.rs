//! System-backed `NfcProvider` implementation. It shells out to the
//! `nfc-list`, `mfoc`, and `nfc-mfclassic` binaries and translates
//! their textual behaviour into the crate's contracts.

use crate::command::{CommandRunner, Output};
use crate::parse::extract_uid;
use locksmith_core::config::LocksmithConfig;
use locksmith_core::error::{LocksmithError, LocksmithResult};
use locksmith_core::provider::{CloneRequest, DumpRequest, NfcProvider};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default locations probed when looking for `nfc-list` on the host.
pub const DEFAULT_NFC_LIST_PATHS: &[&str] = &[
    "/usr/bin/nfc-list",
    "/usr/local/bin/nfc-list",
    "/opt/homebrew/bin/nfc-list",
    "/bin/nfc-list",
];

/// Default locations probed when looking for `mfoc` on the host.
pub const DEFAULT_MFOC_PATHS: &[&str] = &[
    "/usr/bin/mfoc",
    "/usr/local/bin/mfoc",
    "/opt/homebrew/bin/mfoc",
    "/bin/mfoc",
];

/// Default locations probed when looking for `nfc-mfclassic` on the host.
pub const DEFAULT_NFC_MFCLASSIC_PATHS: &[&str] = &[
    "/usr/bin/nfc-mfclassic",
    "/usr/local/bin/nfc-mfclassic",
    "/opt/homebrew/bin/nfc-mfclassic",
    "/bin/nfc-mfclassic",
];

/// Provider that drives the real Mifare tooling through the shell.
#[derive(Clone)]
pub struct SystemNfcProvider {
    list_runner: CommandRunner,
    dump_runner: CommandRunner,
    clone_runner: CommandRunner,
}

impl SystemNfcProvider {
    /// Build a provider from user configuration, falling back to
    /// path discovery for any binary not pinned explicitly.
    pub fn from_config(config: &LocksmithConfig) -> LocksmithResult<Self> {
        let timeout = config.tool_timeout();
        let list_runner = match config.nfc_list_path() {
            Some(path) => Self::runner_with_path(path, timeout)?,
            None => Self::discover_binary("nfc-list", DEFAULT_NFC_LIST_PATHS, timeout)?,
        };
        let dump_runner = match config.mfoc_path() {
            Some(path) => Self::runner_with_path(path, timeout)?,
            None => Self::discover_binary("mfoc", DEFAULT_MFOC_PATHS, timeout)?,
        };
        let clone_runner = match config.nfc_mfclassic_path() {
            Some(path) => Self::runner_with_path(path, timeout)?,
            None => Self::discover_binary("nfc-mfclassic", DEFAULT_NFC_MFCLASSIC_PATHS, timeout)?,
        };

        Ok(Self {
            list_runner,
            dump_runner,
            clone_runner,
        })
    }

    /// Construct a provider with explicit paths for all three binaries.
    pub fn with_paths(
        nfc_list: PathBuf,
        mfoc: PathBuf,
        nfc_mfclassic: PathBuf,
        timeout: Option<Duration>,
    ) -> LocksmithResult<Self> {
        Ok(Self {
            list_runner: Self::runner_with_path(nfc_list, timeout)?,
            dump_runner: Self::runner_with_path(mfoc, timeout)?,
            clone_runner: Self::runner_with_path(nfc_mfclassic, timeout)?,
        })
    }

    /// Validate that the given path exists and wrap it in a runner.
    fn runner_with_path(
        path: PathBuf,
        timeout: Option<Duration>,
    ) -> LocksmithResult<CommandRunner> {
        if !path.exists() {
            return Err(LocksmithError::InvalidConfig(format!(
                "binary not found at {}",
                path.display()
            )));
        }
        Ok(CommandRunner::new(path, timeout))
    }

    /// Walk the built-in search paths until a workable binary is found.
    fn discover_binary(
        name: &str,
        candidates: &[&str],
        timeout: Option<Duration>,
    ) -> LocksmithResult<CommandRunner> {
        for candidate in candidates {
            let p = Path::new(candidate);
            if p.exists() {
                return Self::runner_with_path(p.to_path_buf(), timeout);
            }
        }
        Err(LocksmithError::InvalidConfig(format!(
            "unable to locate {} binary; tried {:?}",
            name, candidates
        )))
    }

    /// Run a tool and treat a non-zero exit or any stderr output as a
    /// hard failure. The NFC tools report progress on stdout only, so
    /// stderr content means something went wrong even on exit 0.
    async fn run_checked(
        runner: &CommandRunner,
        args: &[String],
    ) -> LocksmithResult<Output> {
        let out = runner.run(args).await?;
        if out.status != 0 || !out.stderr.trim().is_empty() {
            return Err(Self::classify_cli_error(runner.binary(), args, &out));
        }
        Ok(out)
    }

    /// Build a descriptive `Process` error carrying the diagnostics the
    /// tool emitted.
    fn classify_cli_error(binary: &Path, args: &[String], output: &Output) -> LocksmithError {
        let stderr = output.stderr.trim();
        let stdout = output.stdout.trim();
        let diagnostic = if !stderr.is_empty() { stderr } else { stdout };
        LocksmithError::Process(format!(
            "{} {} exited with code {}: {}",
            binary.display(),
            args.join(" "),
            output.status,
            if diagnostic.is_empty() {
                "no additional output"
            } else {
                diagnostic
            }
        ))
    }
}

impl NfcProvider for SystemNfcProvider {
    /// Run the tag-listing tool and pull the UID out of its report.
    /// Tool execution failures propagate as `Process`; a clean run with
    /// no tag block in the output is `TagNotFound`.
    async fn read_uid(&self) -> LocksmithResult<String> {
        let out = Self::run_checked(&self.list_runner, &[]).await?;
        extract_uid(&out.stdout).ok_or(LocksmithError::TagNotFound)
    }

    /// Invoke the dump tool with the assembled parameters and return
    /// them on success. The tool itself tries every candidate key
    /// against every sector; this side only gathers and formats them.
    async fn dump(&self, request: DumpRequest) -> LocksmithResult<Vec<String>> {
        let mut params = vec![format!("-O {}", request.output_path.display())];
        if !request.key_flags.is_empty() {
            params.push(request.key_flags.join(" "));
        }
        params.extend(request.extra_options.iter().cloned());

        info!("Please wait while trying to authenticate to the tag...");
        Self::run_checked(&self.dump_runner, &params).await?;
        Ok(params)
    }

    /// Invoke the clone tool. `W X` writes the whole card including
    /// sector zero; `w x` is the restricted mode for tags whose sector
    /// zero is not rewritable. Order is fixed: mode, target, source.
    async fn clone_tag(&self, request: CloneRequest) -> LocksmithResult<()> {
        let mode: &[&str] = if request.unlock_sector_zero {
            &["W", "X"]
        } else {
            &["w", "x"]
        };
        let mut params: Vec<String> = mode.iter().map(|s| s.to_string()).collect();
        params.push(request.target_path.display().to_string());
        params.push(request.source_path.display().to_string());

        Self::run_checked(&self.clone_runner, &params).await?;
        info!("Successfully cloned.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_failure_names_the_binary() {
        let err =
            SystemNfcProvider::discover_binary("mfoc", &["/nonexistent/mfoc"], None).unwrap_err();
        match err {
            LocksmithError::InvalidConfig(msg) => assert!(msg.contains("mfoc"), "{}", msg),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn classify_prefers_stderr_diagnostics() {
        let out = Output {
            stdout: "progress".to_string(),
            stderr: "ERROR: No NFC device found.\n".to_string(),
            status: 1,
        };
        let err = SystemNfcProvider::classify_cli_error(
            Path::new("/usr/bin/nfc-list"),
            &[],
            &out,
        );
        assert!(err.to_string().contains("No NFC device found"));
    }

    #[test]
    fn classify_falls_back_to_stdout() {
        let out = Output {
            stdout: "mfoc: quitting\n".to_string(),
            stderr: String::new(),
            status: 1,
        };
        let err = SystemNfcProvider::classify_cli_error(
            Path::new("/usr/bin/mfoc"),
            &["-O /tmp/dump.mfd".to_string()],
            &out,
        );
        assert!(err.to_string().contains("mfoc: quitting"));
    }
}
