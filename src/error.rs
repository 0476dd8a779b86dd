use thiserror::Error;

/// Unified error type for relkit operations
#[derive(Error, Debug)]
pub enum RelkitError {
    #[error("Unknown commit type '{given}'. Valid types are: {}", .valid.join(", "))]
    InvalidCommitType { given: String, valid: Vec<String> },

    #[error("Command '{action}' failed with exit code {code}\nstdout: {stdout}\nstderr: {stderr}")]
    ShellCommandFailed {
        action: String,
        stdout: String,
        stderr: String,
        /// Exit code of the failed process; -1 when killed by a signal
        code: i32,
    },

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git repository error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in relkit
pub type Result<T> = std::result::Result<T, RelkitError>;

impl RelkitError {
    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        RelkitError::Manifest(msg.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        RelkitError::Config(msg.into())
    }

    /// Create an invalid commit type error listing the valid types
    pub fn invalid_commit_type(given: impl Into<String>, valid: &[&str]) -> Self {
        RelkitError::InvalidCommitType {
            given: given.into(),
            valid: valid.iter().map(|s| s.to_string()).collect(),
        }
    }
}
