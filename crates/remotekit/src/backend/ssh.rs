//! Remote backend that shells out to the system `ssh` client.

use crate::backend::{Remote, shell_quote};
use crate::error::{Error, Result};
use crate::types::{CommandOutput, ExecOptions, SshTarget};
use std::process::{Command, Stdio};

/// Exit status the OpenSSH client reserves for its own failures.
const SSH_TRANSPORT_FAILURE: i32 = 255;

/// Exit status of coreutils `timeout` when the limit is hit.
const TIMEOUT_EXPIRED: i32 = 124;

/// Backend that executes commands through `ssh`.
pub struct SshBackend {
    /// Name used in logs and errors
    hostname: String,
    target: SshTarget,
    /// Path to the ssh executable
    ssh_path: String,
}

impl SshBackend {
    /// Create a new SshBackend.
    ///
    /// Returns an error if no `ssh` client is installed.
    pub fn new(hostname: impl Into<String>, target: SshTarget) -> Result<Self> {
        let ssh_path = find_ssh()?;
        Ok(Self {
            hostname: hostname.into(),
            target,
            ssh_path,
        })
    }
}

impl Remote for SshBackend {
    fn hostname(&self) -> &str {
        &self.hostname
    }

    fn exec(&self, command: &str, opts: &ExecOptions) -> Result<CommandOutput> {
        let args = ssh_args(&self.target, command, opts);
        log::debug!("[{}] $ {}", self.hostname, command);

        let output = Command::new(&self.ssh_path)
            .args(&args)
            .stdin(Stdio::null())
            .output()?;

        classify(&self.hostname, command, opts, output.into())
    }
}

/// Build the argument list for one `ssh` invocation.
pub fn ssh_args(target: &SshTarget, command: &str, opts: &ExecOptions) -> Vec<String> {
    let mut args = vec![
        "-o".to_string(),
        "BatchMode=yes".to_string(),
        "-o".to_string(),
        format!("ConnectTimeout={}", target.connect_timeout),
        "-o".to_string(),
        "StrictHostKeyChecking=accept-new".to_string(),
    ];

    if let Some(port) = target.port {
        args.push("-p".to_string());
        args.push(port.to_string());
    }

    if let Some(identity) = &target.identity_file {
        args.push("-i".to_string());
        args.push(identity.display().to_string());
    }

    args.push(target.destination());
    args.push("--".to_string());
    args.push(remote_command(command, opts));
    args
}

/// Wrap `command` in `timeout` when the options carry one.
pub fn remote_command(command: &str, opts: &ExecOptions) -> String {
    match opts.timeout {
        Some(limit) => format!(
            "timeout {} sh -c {}",
            limit.as_secs().max(1),
            shell_quote(command)
        ),
        None => command.to_string(),
    }
}

/// Turn raw ssh output into the execution contract of [`Remote::exec`].
pub fn classify(
    host: &str,
    command: &str,
    opts: &ExecOptions,
    output: CommandOutput,
) -> Result<CommandOutput> {
    match output.code {
        Some(SSH_TRANSPORT_FAILURE) => Err(Error::Connection {
            host: host.to_string(),
            message: output.stderr_str().trim().to_string(),
        }),
        Some(TIMEOUT_EXPIRED) if opts.timeout.is_some() => Err(Error::Timeout {
            host: host.to_string(),
            command: command.to_string(),
            secs: opts.timeout.map(|t| t.as_secs()).unwrap_or_default(),
        }),
        _ if opts.long_running && !output.success() => Err(Error::CommandFailed {
            host: host.to_string(),
            command: command.to_string(),
            code: output.code.unwrap_or(-1),
            stderr: output.stderr_str().trim().to_string(),
        }),
        _ => Ok(output),
    }
}

/// Locate the ssh client.
pub fn find_ssh() -> Result<String> {
    let paths = ["/usr/bin/ssh", "/usr/local/bin/ssh", "/bin/ssh"];

    for path in &paths {
        if std::path::Path::new(path).exists() {
            return Ok(path.to_string());
        }
    }

    let output = Command::new("which")
        .arg("ssh")
        .output()
        .map_err(|_| Error::SshNotFound)?;

    if output.status.success() {
        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !path.is_empty() {
            return Ok(path);
        }
    }

    Err(Error::SshNotFound)
}
