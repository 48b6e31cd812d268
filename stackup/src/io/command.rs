//! Command-runner seam for `installPackages` steps.
//!
//! The executor only sees [`CommandRunner`]; tests substitute a scripted
//! runner that records invocations without spawning anything.

use std::path::Path;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::core::error::InstallError;
use crate::io::process::{run_process, shell};

/// What a successful command printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    /// Bytes of stdout dropped beyond the output limit.
    pub stdout_truncated: usize,
}

impl CommandOutput {
    /// Trimmed stdout, or `None` when the command printed nothing.
    pub fn summary(&self) -> Option<String> {
        let trimmed = self.stdout.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }
}

/// Runs a rendered shell command in a project directory.
///
/// Success means the command exited with status zero; any non-zero exit is
/// an error.
pub trait CommandRunner {
    fn run(&self, command: &str, cwd: &Path) -> Result<CommandOutput, InstallError>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, command: &str, cwd: &Path) -> Result<CommandOutput, InstallError> {
        (**self).run(command, cwd)
    }
}

/// Runner that spawns commands through the platform shell.
#[derive(Debug, Clone)]
pub struct ShellCommandRunner {
    /// `None` waits for the command indefinitely.
    pub timeout: Option<Duration>,
    pub output_limit_bytes: usize,
}

impl ShellCommandRunner {
    pub fn new(timeout: Option<Duration>, output_limit_bytes: usize) -> Self {
        Self {
            timeout,
            output_limit_bytes,
        }
    }
}

impl CommandRunner for ShellCommandRunner {
    #[instrument(skip_all, fields(command = %command, cwd = %cwd.display()))]
    fn run(&self, command: &str, cwd: &Path) -> Result<CommandOutput, InstallError> {
        info!("running command");
        let mut cmd = shell(command);
        cmd.current_dir(cwd);

        let output = run_process(cmd, self.timeout, self.output_limit_bytes).map_err(|err| {
            InstallError::CommandExecution {
                command: command.to_string(),
                exit_code: None,
                detail: format!("{err:#}"),
            }
        })?;

        if output.timed_out {
            warn!("command timed out");
            return Err(InstallError::CommandExecution {
                command: command.to_string(),
                exit_code: None,
                detail: format!("timed out after {:?}", self.timeout.unwrap_or_default()),
            });
        }
        if !output.status.success() {
            let exit_code = output.status.code();
            warn!(?exit_code, "command failed");
            let detail = match output.stderr_tail() {
                Some(tail) => format!("exit status {exit_code:?}: {tail}"),
                None => format!("exit status {exit_code:?}"),
            };
            return Err(InstallError::CommandExecution {
                command: command.to_string(),
                exit_code,
                detail,
            });
        }
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stdout_truncated: output.stdout_truncated,
        })
    }
}
