mod error;
mod processrunner;

pub use error::CommandError;
pub use processrunner::ProcessRunner;

/// Captured output of a finished command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Trait that specifies the interface for running an external command to completion
#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner {
    /// Runs `program` with `args`, failing when it cannot be started or exits unsuccessfully.
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput, CommandError>;
}
