//! Running install scripts through the system shell.

use std::io::Write;
use std::process::{Command, Stdio};

use crate::error::InstallError;

/// Shell the install script is piped into.
const SHELL: &str = "sh";

/// Executes a downloaded install script.
pub trait ScriptRunner {
    /// Runs `script` to completion.
    ///
    /// # Errors
    ///
    /// Returns an [`InstallError`] if the script cannot be started or exits
    /// unsuccessfully.
    fn run(&self, script: &[u8]) -> Result<(), InstallError>;
}

/// [`ScriptRunner`] that feeds the script to `sh` on stdin.
///
/// The shell inherits stdout and stderr, so installer output streams
/// straight to the action's log.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellRunner;

impl ShellRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ScriptRunner for ShellRunner {
    fn run(&self, script: &[u8]) -> Result<(), InstallError> {
        let shell = which::which(SHELL).map_err(|source| InstallError::ShellNotFound { source })?;

        let mut child = Command::new(&shell)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| InstallError::Spawn {
                shell: shell.clone(),
                source,
            })?;
        tracing::debug!(shell = %shell.display(), pid = child.id(), "running install script");

        // A script that exits early closes its stdin; the exit status below
        // is the meaningful result in that case.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(script) {
                tracing::debug!(error = %e, "install script stopped reading stdin");
            }
        }

        let status = child
            .wait()
            .map_err(|source| InstallError::Wait { source })?;
        if !status.success() {
            return Err(InstallError::ScriptFailed { status });
        }
        Ok(())
    }
}
