//! Quiet check for a non-empty remote file.

use crate::error::ExecError;
use crate::runner::{RemoteCommand, RemoteRunner};
use crate::session::{ExecMode, Session};
use crate::ssh::quote;

/// `true` if `path` exists on the remote host and is not empty.
///
/// Runs `test -s <path>`, privileged when `use_privilege` is set. A non-zero
/// exit is a plain `false`. Unless `verbose`, nothing at all is echoed: not the
/// command, its output, nor the non-zero-exit warning. The session's previous
/// mode is back in place when this returns.
///
/// Connection and authentication failures are still errors.
pub fn exists<R: RemoteRunner>(
    session: &Session<R>,
    path: &str,
    use_privilege: bool,
    verbose: bool,
) -> Result<bool, ExecError> {
    let line = format!("test -s {}", quote(path));
    let command = if use_privilege {
        RemoteCommand::privileged(line)
    } else {
        RemoteCommand::plain(line)
    };

    let mode = if verbose {
        session.mode().with_warn_only(true)
    } else {
        ExecMode::quiet()
    };
    let _guard = session.scoped(mode);
    let output = session.execute(&command)?;
    Ok(output.succeeded())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{CapturedConsole, MockRunner, Scripted};
    use crate::runner::CommandOutput;

    #[test]
    fn quotes_the_path() {
        let runner = MockRunner::new();
        let session = Session::new(runner.clone()).with_console(Box::new(CapturedConsole::new()));
        exists(&session, "/srv/my app/.env", false, false).expect("exists");
        assert_eq!(runner.calls()[0].line, "test -s '/srv/my app/.env'");
    }

    #[test]
    fn verbose_still_treats_failure_as_false() {
        let runner = MockRunner::with_script(vec![Scripted::Output(CommandOutput::exit(1))]);
        let console = CapturedConsole::new();
        let session = Session::new(runner).with_console(Box::new(console.clone()));
        assert!(!exists(&session, "/missing", false, true).expect("exists"));
        let text = console.contents();
        assert!(text.contains("run: test -s /missing"), "got: {text}");
        assert!(text.contains("warning"), "got: {text}");
    }
}
