//! Remote executor abstraction.
//!
//! `RemoteRunner` is the seam every task runs commands through.
//! [`crate::ssh::SshRunner`] is the production implementation;
//! [`crate::mock::MockRunner`] is the scripted test double.

use crate::error::ExecError;

/// One command line to run on the remote host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommand {
    /// Shell command line, interpreted by the remote shell.
    pub line: String,
    /// Run with superuser privileges.
    pub privileged: bool,
}

impl RemoteCommand {
    pub fn plain(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            privileged: false,
        }
    }

    pub fn privileged(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            privileged: true,
        }
    }
}

/// Captured result of a command that actually ran.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn exit(code: i32) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    pub fn succeeded(&self) -> bool {
        self.code == 0
    }

    pub fn failed(&self) -> bool {
        !self.succeeded()
    }
}

/// How a single remote invocation ended.
///
/// Runners classify raw results into this before deciding between
/// `Ok(CommandOutput)` and an [`ExecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    NonZeroExit(i32),
    NetworkUnreachable,
    Other,
}

/// Runs command lines on one remote host.
///
/// Contract: a command that ran returns `Ok`, whatever its exit code. A
/// connection-level failure returns [`ExecError::Network`]; any other failure
/// to run returns another `ExecError` variant.
pub trait RemoteRunner {
    /// Host label used in console echo and errors.
    fn host(&self) -> &str;

    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput, ExecError>;
}

impl<R: RemoteRunner + ?Sized> RemoteRunner for &R {
    fn host(&self) -> &str {
        (**self).host()
    }

    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput, ExecError> {
        (**self).run(command)
    }
}
