//! Remote execution through the system OpenSSH client.
//!
//! Everything is passed to `ssh` as an argv, never through a local shell.
//! Values that end up in the *remote* command line are quoted with
//! `shell_escape` by the callers that build them.

use std::borrow::Cow;
use std::process::{Command, ExitStatus, Stdio};

use crate::error::ExecError;
use crate::runner::{CommandOutput, Outcome, RemoteCommand, RemoteRunner};
use crate::types::ConnectionConfig;

pub const SERVER_ALIVE_INTERVAL: u32 = 30;

/// `ssh` exits with this status when the session itself failed.
const SSH_SESSION_FAILURE: i32 = 255;

const NETWORK_MARKERS: &[&str] = &[
    "connection refused",
    "connection timed out",
    "operation timed out",
    "no route to host",
    "network is unreachable",
    "host is down",
    "could not resolve hostname",
    "name or service not known",
    "temporary failure in name resolution",
    "connection closed by",
    "closed by remote host",
    "connection reset",
    "kex_exchange_identification",
    "broken pipe",
];

/// Options that disable host-key verification.
pub fn insecure_options() -> [&'static str; 4] {
    [
        "-o",
        "UserKnownHostsFile=/dev/null",
        "-o",
        "StrictHostKeyChecking=no",
    ]
}

/// Matched in stderr when `sudo -n` refuses to run the command at all.
const SUDO_REFUSED_MARKERS: &[&str] = &[
    "sudo: a password is required",
    "sudo: a terminal is required",
    "is not in the sudoers file",
    "may not run sudo on",
    "is not allowed to execute",
];

/// Quote `value` for a POSIX shell on the remote side.
///
/// A leading `~` or `~/` stays bare so the remote shell still expands it to
/// the login user's home; the rest is quoted.
pub fn quote(value: &str) -> String {
    if value == "~" {
        return value.to_string();
    }
    match value.strip_prefix("~/") {
        Some("") => "~/".to_string(),
        Some(rest) => format!("~/{}", escape(rest)),
        None => escape(value),
    }
}

fn escape(value: &str) -> String {
    shell_escape::unix::escape(Cow::Borrowed(value)).into_owned()
}

/// Map an `ssh` exit code and its stderr onto an [`Outcome`].
///
/// Exit 255 is OpenSSH's own failure; stderr tells a dead network apart from
/// authentication or host-key problems. A remote command that itself exits
/// 255 is indistinguishable and is reported as a session failure.
pub fn classify(code: Option<i32>, stderr: &str) -> Outcome {
    match code {
        Some(0) => Outcome::Success,
        Some(SSH_SESSION_FAILURE) => {
            let lower = stderr.to_ascii_lowercase();
            if NETWORK_MARKERS.iter().any(|m| lower.contains(m)) {
                Outcome::NetworkUnreachable
            } else {
                Outcome::Other
            }
        }
        Some(code) => Outcome::NonZeroExit(code),
        None => Outcome::Other,
    }
}

/// [`classify`] for a command wrapped by [`privileged_line`].
///
/// `sudo -n` exits 1 when it needs a password or the user may not use it.
/// That is an authentication failure of the session, not the command's own
/// exit status, so it becomes [`Outcome::Other`].
pub fn classify_privileged(code: Option<i32>, stderr: &str) -> Outcome {
    match classify(code, stderr) {
        Outcome::NonZeroExit(_) if sudo_refused(stderr) => Outcome::Other,
        outcome => outcome,
    }
}

fn sudo_refused(stderr: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    SUDO_REFUSED_MARKERS.iter().any(|m| lower.contains(m))
}

/// Wrap a command line for passwordless `sudo`.
pub fn privileged_line(line: &str) -> String {
    format!("sudo -n -- sh -c {}", quote(line))
}

/// Arguments for running `command` non-interactively.
pub fn exec_args(config: &ConnectionConfig, command: &RemoteCommand) -> Result<Vec<String>, ExecError> {
    let destination = config.destination()?;
    let mut args: Vec<String> = vec![
        "-o".into(),
        "BatchMode=yes".into(),
        "-o".into(),
        format!("ConnectTimeout={}", config.connect_timeout.as_secs().max(1)),
        "-o".into(),
        format!("ServerAliveInterval={SERVER_ALIVE_INTERVAL}"),
    ];
    push_identity_and_port(&mut args, config);
    if config.insecure {
        args.extend(insecure_options().iter().map(|s| s.to_string()));
    }
    args.push("--".into());
    args.push(destination);
    args.push(if command.privileged {
        privileged_line(&command.line)
    } else {
        command.line.clone()
    });
    Ok(args)
}

/// Arguments for an interactive session with keep-alive and agent forwarding,
/// optionally tunnelling `local_port` to `127.0.0.1:remote_port` on the host.
pub fn interactive_args(
    config: &ConnectionConfig,
    forward: Option<(u16, u16)>,
) -> Result<Vec<String>, ExecError> {
    let destination = config.destination()?;
    let mut args: Vec<String> = vec![
        "-o".into(),
        format!("ServerAliveInterval={SERVER_ALIVE_INTERVAL}"),
        "-A".into(),
    ];
    push_identity_and_port(&mut args, config);
    if config.insecure {
        args.extend(insecure_options().iter().map(|s| s.to_string()));
    }
    if let Some((local, remote)) = forward {
        args.push("-L".into());
        args.push(format!("{local}:127.0.0.1:{remote}"));
    }
    args.push("--".into());
    args.push(destination);
    Ok(args)
}

fn push_identity_and_port(args: &mut Vec<String>, config: &ConnectionConfig) {
    if let Some(key) = &config.key_file {
        args.push("-i".into());
        args.push(key.display().to_string());
    }
    args.push("-p".into());
    args.push(config.port.to_string());
}

/// Hand the terminal to an interactive `ssh` and wait for it.
///
/// The child inherits stdin/stdout/stderr, so ^C reaches the remote process.
pub fn open_interactive(
    config: &ConnectionConfig,
    forward: Option<(u16, u16)>,
) -> Result<ExitStatus, ExecError> {
    let args = interactive_args(config, forward)?;
    tracing::debug!(host = %config.host, ?forward, "opening interactive ssh");
    Command::new("ssh")
        .args(&args)
        .status()
        .map_err(|source| ExecError::Spawn {
            program: "ssh".into(),
            source,
        })
}

/// Production [`RemoteRunner`] that spawns `ssh` per command.
#[derive(Debug, Clone)]
pub struct SshRunner {
    config: ConnectionConfig,
    program: String,
}

impl SshRunner {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            program: "ssh".into(),
        }
    }

    /// Use a different client binary (e.g. a wrapper script).
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl RemoteRunner for SshRunner {
    fn host(&self) -> &str {
        &self.config.host
    }

    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput, ExecError> {
        let args = exec_args(&self.config, command)?;
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let code = output.status.code();

        let outcome = if command.privileged {
            classify_privileged(code, &stderr)
        } else {
            classify(code, &stderr)
        };

        match outcome {
            Outcome::Success => Ok(CommandOutput {
                code: 0,
                stdout,
                stderr,
            }),
            Outcome::NonZeroExit(code) => Ok(CommandOutput {
                code,
                stdout,
                stderr,
            }),
            Outcome::NetworkUnreachable => Err(ExecError::Network {
                host: self.config.host.clone(),
                reason: stderr.trim().to_string(),
            }),
            Outcome::Other => Err(ExecError::Remote {
                host: self.config.host.clone(),
                reason: if stderr.trim().is_empty() {
                    format!("ssh exited with {}", output.status)
                } else {
                    stderr.trim().to_string()
                },
            }),
        }
    }
}
