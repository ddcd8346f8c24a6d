//! Error types for remote command execution.
//!
//! Errors are categorized so the session layer can decide whether to retry
//! and the CLI can show a short hint next to the failure.

use thiserror::Error;

/// Categories of remote execution errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// SSH transport failure (connection refused, host unreachable, auth)
    Connection,
    /// The remote command ran and exited non-zero
    CommandFailed,
    /// The remote command exceeded its timeout
    Timeout,
    /// The `ssh` client is not installed locally
    SshNotFound,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection)
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Connection => "Check the host address, SSH keys and that sshd is running",
            Self::CommandFailed => "Inspect the remote stderr and the host's package repositories",
            Self::Timeout => "Raise the timeout or check the host for a stuck process",
            Self::SshNotFound => "Install an OpenSSH client and make sure it is on PATH",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur while executing commands on a remote host.
#[derive(Debug, Error)]
pub enum Error {
    /// SSH could not establish or keep the session
    #[error("connection to {host} failed: {message}")]
    Connection {
        /// Host the session was opened against
        host: String,
        /// Transport error reported by the ssh client
        message: String,
    },

    /// A long-running command exited with a non-zero status
    #[error("command `{command}` failed on {host} (exit {code}): {stderr}")]
    CommandFailed {
        /// Host the command ran on
        host: String,
        /// The command line sent to the host
        command: String,
        /// Exit status reported by the remote shell
        code: i32,
        /// Standard error output from the failed command
        stderr: String,
    },

    /// A command with a timeout did not finish in time
    #[error("command `{command}` timed out on {host} after {secs}s")]
    Timeout {
        /// Host the command ran on
        host: String,
        /// The command line sent to the host
        command: String,
        /// Timeout that was applied
        secs: u64,
    },

    /// No `ssh` executable found on PATH
    #[error("ssh client not found on PATH")]
    SshNotFound,

    /// IO error while spawning or talking to the ssh process
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category for retry logic.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Connection { .. } => ErrorCategory::Connection,
            Error::CommandFailed { .. } => ErrorCategory::CommandFailed,
            Error::Timeout { .. } => ErrorCategory::Timeout,
            Error::SshNotFound => ErrorCategory::SshNotFound,
            _ => ErrorCategory::Other,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }
}

/// Result type for remote operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connection_errors_retry() {
        assert!(ErrorCategory::Connection.is_retryable());
        assert!(!ErrorCategory::CommandFailed.is_retryable());
        assert!(!ErrorCategory::Timeout.is_retryable());
        assert!(!ErrorCategory::SshNotFound.is_retryable());
    }

    #[test]
    fn test_error_category_mapping() {
        let err = Error::CommandFailed {
            host: "h1".into(),
            command: "false".into(),
            code: 1,
            stderr: String::new(),
        };
        assert_eq!(err.category(), ErrorCategory::CommandFailed);
        assert!(!err.is_retryable());

        let err = Error::Connection {
            host: "h1".into(),
            message: "Connection refused".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_command_failed_display() {
        let err = Error::CommandFailed {
            host: "h2".into(),
            command: "sudo yum clean metadata".into(),
            code: 1,
            stderr: "no repos".into(),
        };
        assert_eq!(
            err.to_string(),
            "command `sudo yum clean metadata` failed on h2 (exit 1): no repos"
        );
    }
}
