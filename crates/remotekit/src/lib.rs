//! # remotekit
//!
//! Blocking remote command execution for test-node provisioning.
//!
//! This crate provides:
//! - The [`Remote`] trait, a per-host execution capability
//! - An SSH backend driving the system `ssh` client
//! - Long-running vs quick execution modes and remote-side timeouts
//! - Retry with exponential backoff for SSH transport failures
//!
//! ## Example
//!
//! ```no_run
//! use remotekit::{Remote, Session, SshTarget};
//! use std::time::Duration;
//!
//! let session = Session::ssh("node1", SshTarget::new("10.0.0.5").with_user("cephuser"))
//!     .expect("ssh not available");
//!
//! session
//!     .await_ready("/ceph-qa-ready", Duration::from_secs(15))
//!     .expect("wait failed");
//! session
//!     .exec_command("sudo apt-get install -y wget", true, None)
//!     .expect("install failed");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod retry;
pub mod types;

pub use backend::{
    Remote, ready_command, shell_quote,
    ssh::{SshBackend, find_ssh},
};
pub use error::{Error, ErrorCategory, Result};
pub use types::{CommandOutput, ExecOptions, RetryConfig, SshTarget};

use std::time::Duration;

/// High-level handle on one remote host.
///
/// Wraps a backend and retries SSH transport failures. A `Session` is itself
/// a [`Remote`], so it can be handed to anything that takes a backend.
pub struct Session {
    backend: Box<dyn Remote>,
    retry: RetryConfig,
}

impl Session {
    /// Open a session backed by the system `ssh` client.
    pub fn ssh(hostname: impl Into<String>, target: SshTarget) -> Result<Self> {
        let backend = SshBackend::new(hostname, target)?;
        Ok(Self::with_backend(Box::new(backend)))
    }

    /// Create a session with a custom backend (useful for testing).
    pub fn with_backend(backend: Box<dyn Remote>) -> Self {
        Self {
            backend,
            retry: RetryConfig::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Run `cmd` on the host.
    ///
    /// `long_running` turns a non-zero exit into an error; `timeout` is
    /// enforced on the remote side.
    pub fn exec_command(
        &self,
        cmd: &str,
        long_running: bool,
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        let opts = ExecOptions {
            long_running,
            timeout,
        };
        self.exec(cmd, &opts)
    }
}

impl Remote for Session {
    fn hostname(&self) -> &str {
        self.backend.hostname()
    }

    fn exec(&self, command: &str, opts: &ExecOptions) -> Result<CommandOutput> {
        retry::with_retry(&self.retry, self.hostname(), || {
            self.backend.exec(command, opts)
        })
    }

    /// Wait for the sentinel, riding out a host whose sshd is not up yet.
    ///
    /// Connection failures are retried every `poll_interval` without limit,
    /// so the retry policy's attempt cap never applies here.
    fn await_ready(&self, sentinel: &str, poll_interval: Duration) -> Result<()> {
        retry::until_reachable(self.hostname(), poll_interval, || {
            self.backend.await_ready(sentinel, poll_interval)
        })
    }
}
