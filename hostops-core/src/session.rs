//! A connection to one host plus the current execution mode.
//!
//! The mode decides what gets echoed to the console and whether a non-zero
//! exit is an error. Callers change it only through [`Session::scoped`], which
//! hands back a guard that puts the previous mode back when dropped, so the
//! mode is restored on early returns, `?` and panics alike.

use std::cell::{Cell, RefCell};
use std::io::{self, Write};

use crate::error::ExecError;
use crate::runner::{CommandOutput, RemoteCommand, RemoteRunner};

/// Which console output to suppress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hide {
    /// The `run: <command>` echo line.
    pub running: bool,
    pub stdout: bool,
    pub stderr: bool,
    /// The notice printed for a non-zero exit in warn-only mode.
    pub warnings: bool,
}

impl Hide {
    pub const NOTHING: Hide = Hide {
        running: false,
        stdout: false,
        stderr: false,
        warnings: false,
    };

    pub const EVERYTHING: Hide = Hide {
        running: true,
        stdout: true,
        stderr: true,
        warnings: true,
    };

    pub const RUNNING: Hide = Hide {
        running: true,
        stdout: false,
        stderr: false,
        warnings: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecMode {
    pub hide: Hide,
    /// Report a non-zero exit as a warning and return the output instead of
    /// failing with [`ExecError::NonZeroExit`].
    pub warn_only: bool,
}

impl ExecMode {
    /// Hide everything and never fail on exit status.
    pub fn quiet() -> Self {
        Self {
            hide: Hide::EVERYTHING,
            warn_only: true,
        }
    }

    pub fn with_hide(mut self, hide: Hide) -> Self {
        self.hide = hide;
        self
    }

    pub fn with_warn_only(mut self, warn_only: bool) -> Self {
        self.warn_only = warn_only;
        self
    }
}

/// Restores the session's previous [`ExecMode`] on drop.
#[must_use = "the mode is restored as soon as the guard is dropped"]
pub struct ModeGuard<'a> {
    cell: &'a Cell<ExecMode>,
    previous: ExecMode,
}

impl Drop for ModeGuard<'_> {
    fn drop(&mut self) {
        self.cell.set(self.previous);
    }
}

pub struct Session<R: RemoteRunner> {
    runner: R,
    mode: Cell<ExecMode>,
    console: RefCell<Box<dyn Write>>,
}

impl<R: RemoteRunner> Session<R> {
    /// Session echoing to stdout in the default (show all, fail on error) mode.
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            mode: Cell::new(ExecMode::default()),
            console: RefCell::new(Box::new(io::stdout())),
        }
    }

    pub fn with_console(self, console: Box<dyn Write>) -> Self {
        Self {
            console: RefCell::new(console),
            ..self
        }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn host(&self) -> &str {
        self.runner.host()
    }

    pub fn mode(&self) -> ExecMode {
        self.mode.get()
    }

    /// Switch to `mode` until the returned guard is dropped.
    pub fn scoped(&self, mode: ExecMode) -> ModeGuard<'_> {
        let previous = self.mode.replace(mode);
        ModeGuard {
            cell: &self.mode,
            previous,
        }
    }

    /// Run `line` as the connecting user.
    pub fn run(&self, line: &str) -> Result<CommandOutput, ExecError> {
        self.execute(&RemoteCommand::plain(line))
    }

    /// Run `line` with superuser privileges.
    pub fn sudo(&self, line: &str) -> Result<CommandOutput, ExecError> {
        self.execute(&RemoteCommand::privileged(line))
    }

    pub fn execute(&self, command: &RemoteCommand) -> Result<CommandOutput, ExecError> {
        let mode = self.mode.get();
        let verb = if command.privileged { "sudo" } else { "run" };

        if !mode.hide.running {
            self.emit(&format!("[{}] {verb}: {}\n", self.host(), command.line))?;
        }
        tracing::debug!(
            host = %self.host(),
            privileged = command.privileged,
            command = %command.line,
            "executing remote command"
        );

        let output = self.runner.run(command)?;

        if !mode.hide.stdout {
            self.emit_lines("out", &output.stdout)?;
        }
        if !mode.hide.stderr {
            self.emit_lines("err", &output.stderr)?;
        }

        if output.failed() {
            if !mode.warn_only {
                return Err(ExecError::NonZeroExit {
                    host: self.host().to_string(),
                    command: command.line.clone(),
                    code: output.code,
                    stderr: output.stderr.trim().to_string(),
                });
            }
            if !mode.hide.warnings {
                self.emit(&format!(
                    "[{}] warning: `{}` exited with status {}\n",
                    self.host(),
                    command.line,
                    output.code
                ))?;
            }
        }
        Ok(output)
    }

    /// Write `text` to the console and flush, regardless of mode.
    pub fn print(&self, text: &str) -> Result<(), ExecError> {
        self.emit(text)
    }

    fn emit_lines(&self, stream: &str, text: &str) -> Result<(), ExecError> {
        for line in text.lines() {
            self.emit(&format!("[{}] {stream}: {line}\n", self.host()))?;
        }
        Ok(())
    }

    fn emit(&self, text: &str) -> Result<(), ExecError> {
        let mut console = self.console.borrow_mut();
        console.write_all(text.as_bytes())?;
        console.flush()?;
        Ok(())
    }
}
