use std::process::ExitStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("process exited with error: `{status}`: {stderr}")]
    ProcessError { status: ExitStatus, stderr: String },

    #[error("command not found: `{0}`")]
    CommandNotFound(String),

    #[error("io error: `{0}`")]
    IOError(#[source] std::io::Error),
}

impl From<std::io::Error> for CommandError {
    fn from(value: std::io::Error) -> CommandError {
        CommandError::IOError(value)
    }
}
