//! Error types for hostops-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while running a command on a remote host.
///
/// A command that ran and exited non-zero is only an error when the session is
/// not in warn-only mode; see [`crate::session::Session::run`].
#[derive(Debug, Error)]
pub enum ExecError {
    /// The host could not be reached: refused, unreachable, timed out, or the
    /// connection dropped before the command ran.
    #[error("network error talking to {host}: {reason}")]
    Network { host: String, reason: String },

    /// The command ran and exited with a non-zero status.
    #[error("command `{command}` on {host} exited with status {code}")]
    NonZeroExit {
        host: String,
        command: String,
        code: i32,
        stderr: String,
    },

    /// The SSH client ran but the session failed for a non-network reason
    /// (authentication, host key verification, killed by signal, ...).
    #[error("remote execution on {host} failed: {reason}")]
    Remote { host: String, reason: String },

    /// A local program (`ssh`, `rsync`) could not be spawned.
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Writing to the console failed.
    #[error("console write failed: {0}")]
    Console(#[from] std::io::Error),

    /// The connection parameters are unusable (see [`ConfigError`]).
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ExecError {
    /// `true` for connection-level failures that are worth retrying.
    pub fn is_network(&self) -> bool {
        matches!(self, ExecError::Network { .. })
    }
}

/// Errors from connection parameters and the host-profile registry.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Parse error on load, with the offending file path.
    #[error("failed to parse host registry at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("no target host: pass --host or --profile, or set a default profile")]
    NoTarget,

    #[error("unknown host profile '{0}'")]
    UnknownProfile(String),

    #[error("invalid {field} '{value}': {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Errors from [`crate::wait::wait_for_shell`].
#[derive(Debug, Error)]
pub enum WaitError {
    /// A non-network failure; not retried.
    #[error(transparent)]
    Exec(#[from] ExecError),

    #[error("host still unreachable after {attempts} attempts ({elapsed_secs}s)")]
    DeadlineExceeded { attempts: u32, elapsed_secs: u64 },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
