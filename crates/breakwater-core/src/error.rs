//! Error types for guarded execution

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// The breaker declined to run a call. The unit of work never executed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Circuit is open (or a half-open probe is already in flight)
    #[error("circuit open for command '{command}'")]
    CircuitOpen { command: String },

    /// Too many calls in flight for this command
    #[error("max concurrency ({limit}) reached for command '{command}'")]
    MaxConcurrency { command: String, limit: usize },
}

impl Rejection {
    /// Name of the command that rejected the call
    pub fn command(&self) -> &str {
        match self {
            Self::CircuitOpen { command } | Self::MaxConcurrency { command, .. } => command,
        }
    }
}

/// Outcome error of one guarded call.
///
/// `Failed` always carries the unit of work's own error, whether or not the
/// trip policy reported it to the breaker.
#[derive(Error, Debug)]
pub enum GuardError<E> {
    /// Breaker rejected the call before it ran
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// Unit of work exceeded the command's run timeout
    #[error("command '{command}' timed out after {limit:?}")]
    Timeout { command: String, limit: Duration },

    /// Unit of work returned an error
    #[error(transparent)]
    Failed(E),
}

impl<E> GuardError<E> {
    /// Whether the breaker refused to run the call
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// The unit of work's own error, if that is what this is
    pub fn into_failure(self) -> Option<E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Borrow the unit of work's own error
    pub fn failure(&self) -> Option<&E> {
        match self {
            Self::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Configuration and registration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Tuning parameters the breaker cannot apply
    #[error("invalid settings for command '{command}': {reason}")]
    InvalidSettings { command: String, reason: String },

    /// Configuration file could not be read
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed
    #[error("failed to parse config file '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    /// Create an invalid settings error
    pub fn invalid(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSettings {
            command: command.into(),
            reason: reason.into(),
        }
    }
}
