//! Scripted [`RemoteRunner`] for tests.
//!
//! Records every command and replays preset results in order. When the
//! script runs out every further command succeeds with empty output.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;

use crate::error::ExecError;
use crate::runner::{CommandOutput, RemoteCommand, RemoteRunner};

/// A preset result. `ExecError` is not `Clone`, so errors are described and
/// built on replay.
#[derive(Debug, Clone)]
pub enum Scripted {
    Output(CommandOutput),
    Network,
    Remote(String),
}

impl Scripted {
    fn into_result(self, host: &str) -> Result<CommandOutput, ExecError> {
        match self {
            Scripted::Output(output) => Ok(output),
            Scripted::Network => Err(ExecError::Network {
                host: host.to_string(),
                reason: "Connection refused".to_string(),
            }),
            Scripted::Remote(reason) => Err(ExecError::Remote {
                host: host.to_string(),
                reason,
            }),
        }
    }
}

/// Test-double runner. Cloning shares the script and the call log, so a test
/// can keep a handle after moving the runner into a session.
#[derive(Debug, Clone)]
pub struct MockRunner {
    host: String,
    script: Rc<RefCell<VecDeque<Scripted>>>,
    calls: Rc<RefCell<Vec<RemoteCommand>>>,
    journal: Option<Rc<RefCell<Vec<String>>>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            host: "mock-host".to_string(),
            script: Rc::new(RefCell::new(VecDeque::new())),
            calls: Rc::new(RefCell::new(Vec::new())),
            journal: None,
        }
    }

    pub fn with_script(script: Vec<Scripted>) -> Self {
        let runner = Self::new();
        runner.script.borrow_mut().extend(script);
        runner
    }

    /// Also append `run: <line>` / `sudo: <line>` to a shared journal, for
    /// tests that check ordering against other collaborators.
    pub fn with_journal(mut self, journal: Rc<RefCell<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn push(&self, next: Scripted) {
        self.script.borrow_mut().push_back(next);
    }

    pub fn calls(&self) -> Vec<RemoteCommand> {
        self.calls.borrow().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteRunner for MockRunner {
    fn host(&self) -> &str {
        &self.host
    }

    fn run(&self, command: &RemoteCommand) -> Result<CommandOutput, ExecError> {
        self.calls.borrow_mut().push(command.clone());
        if let Some(journal) = &self.journal {
            let kind = if command.privileged { "sudo" } else { "run" };
            journal.borrow_mut().push(format!("{kind}: {}", command.line));
        }
        match self.script.borrow_mut().pop_front() {
            Some(next) => next.into_result(&self.host),
            None => Ok(CommandOutput::default()),
        }
    }
}

/// Console writer that keeps everything written to it.
#[derive(Debug, Clone, Default)]
pub struct CapturedConsole(Rc<RefCell<Vec<u8>>>);

impl CapturedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for CapturedConsole {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_commands_in_order() {
        let runner = MockRunner::new();
        runner.run(&RemoteCommand::plain("uptime")).unwrap();
        runner.run(&RemoteCommand::privileged("id")).unwrap();
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], RemoteCommand::plain("uptime"));
        assert!(calls[1].privileged);
    }

    #[test]
    fn replays_script_then_defaults_to_success() {
        let runner = MockRunner::with_script(vec![
            Scripted::Network,
            Scripted::Output(CommandOutput::exit(1)),
        ]);
        assert!(runner.run(&RemoteCommand::plain("a")).unwrap_err().is_network());
        assert_eq!(runner.run(&RemoteCommand::plain("b")).unwrap().code, 1);
        assert!(runner.run(&RemoteCommand::plain("c")).unwrap().succeeded());
    }

    #[test]
    fn clones_share_call_log() {
        let runner = MockRunner::new();
        let handle = runner.clone();
        runner.run(&RemoteCommand::plain("uptime")).unwrap();
        assert_eq!(handle.call_count(), 1);
    }
}
