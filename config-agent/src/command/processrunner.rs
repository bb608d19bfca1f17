use super::{CommandError, CommandOutput, CommandRunner};
use std::io::ErrorKind;
use std::process::{Command, Stdio};
use tracing::{debug, error};

/// Runs commands as child processes of the agent, capturing their output.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError> {
        debug!(program, ?args, "running command");
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => CommandError::CommandNotFound(program.to_string()),
                _ => CommandError::from(err),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            error!(program, status = %output.status, stderr = %stderr, "command failed");
            return Err(CommandError::ProcessError {
                status: output.status,
                stderr,
            });
        }
        Ok(CommandOutput { stdout, stderr })
    }
}
