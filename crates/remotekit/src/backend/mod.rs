//! Backend abstraction for remote command execution.
//!
//! The [`Remote`] trait is the only thing the provisioning layer knows about
//! a host's execution capability, allowing for different implementations
//! (real `ssh` CLI, recording mocks for testing).

pub mod ssh;

use crate::error::{Error, Result};
use crate::types::{CommandOutput, ExecOptions};
use std::time::Duration;

/// Blocking command execution against one remote host.
pub trait Remote: Send + Sync {
    /// Name of the host this capability talks to.
    fn hostname(&self) -> &str;

    /// Run a shell command on the host and block until it finishes.
    ///
    /// With `opts.long_running` set, a non-zero exit is returned as
    /// [`Error::CommandFailed`]. Quick commands hand back their output
    /// whatever the exit status.
    fn exec(&self, command: &str, opts: &ExecOptions) -> Result<CommandOutput>;

    /// Block until `sentinel` exists on the host.
    ///
    /// The poll loop runs on the remote side as a single invocation, so
    /// there is no local timeout: a host that never writes the file keeps
    /// this call blocked.
    fn await_ready(&self, sentinel: &str, poll_interval: Duration) -> Result<()> {
        let command = ready_command(sentinel, poll_interval);
        let output = self.exec(&command, &ExecOptions::quick())?;
        if output.success() {
            Ok(())
        } else {
            Err(Error::CommandFailed {
                host: self.hostname().to_string(),
                command,
                code: output.code.unwrap_or(-1),
                stderr: output.stderr_str().trim().to_string(),
            })
        }
    }
}

/// Remote shell loop that waits for `sentinel` to appear.
pub fn ready_command(sentinel: &str, poll_interval: Duration) -> String {
    format!(
        "while [ ! -f {} ]; do sleep {}; done",
        shell_quote(sentinel),
        poll_interval.as_secs().max(1)
    )
}

/// Quote a word for a POSIX shell. Plain words pass through unchanged.
pub fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '_' | ':' | '='));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
