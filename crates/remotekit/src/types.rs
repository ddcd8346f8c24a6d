//! Core types for remote execution.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Output;
use std::time::Duration;

/// How a command should be executed on the remote host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecOptions {
    /// The command is expected to take significant wall-clock time; a
    /// non-zero exit is reported as an error instead of being returned.
    pub long_running: bool,
    /// Upper bound on the remote command's run time
    pub timeout: Option<Duration>,
}

impl ExecOptions {
    /// Quick command: exit status is returned, never raised.
    pub fn quick() -> Self {
        Self::default()
    }

    /// Long-running command: non-zero exit becomes an error.
    pub fn long_running() -> Self {
        Self {
            long_running: true,
            timeout: None,
        }
    }

    /// Set a timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Output captured from a remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Captured standard output
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
    /// Exit status, `None` if the process was killed by a signal
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            code: Some(0),
        }
    }

    /// Whether the command exited with status 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}

/// Connection settings for the SSH backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshTarget {
    /// Address to connect to (hostname or IP)
    pub address: String,
    /// Remote login user, defaults to the local ssh configuration
    pub user: Option<String>,
    /// Remote port
    pub port: Option<u16>,
    /// Private key passed with `-i`
    pub identity_file: Option<PathBuf>,
    /// Seconds before the TCP connect attempt is abandoned
    pub connect_timeout: u64,
}

impl SshTarget {
    /// Target with default connection settings.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            user: None,
            port: None,
            identity_file: None,
            connect_timeout: 30,
        }
    }

    /// Set the login user.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the identity file.
    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    /// `user@address` or plain `address`.
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{}@{}", user, self.address),
            None => self.address.clone(),
        }
    }
}

/// Configuration for retry logic.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts
    pub max_attempts: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_factor: f64,
    /// Maximum delay between retries
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    /// Calculate the delay for a given attempt number (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(attempt as i32);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exec_options() {
        assert!(!ExecOptions::quick().long_running);
        let opts = ExecOptions::long_running().with_timeout(Duration::from_secs(240));
        assert!(opts.long_running);
        assert_eq!(opts.timeout, Some(Duration::from_secs(240)));
    }

    #[test]
    fn test_destination() {
        assert_eq!(SshTarget::new("10.0.0.5").destination(), "10.0.0.5");
        assert_eq!(
            SshTarget::new("node1").with_user("cephuser").destination(),
            "cephuser@node1"
        );
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            max_attempts: 10,
            ..RetryConfig::default()
        };
        assert_eq!(config.delay_for_attempt(0), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(1), Duration::from_secs(10));
        assert_eq!(config.delay_for_attempt(6), Duration::from_secs(60));
    }

    #[test]
    fn test_output_success() {
        assert!(CommandOutput::ok("").success());
        let killed = CommandOutput {
            code: None,
            ..Default::default()
        };
        assert!(!killed.success());
    }
}
