//! Reachability wait loop against a scripted runner.

use std::time::Duration;

use hostops_core::{
    mock::{CapturedConsole, MockRunner, Scripted},
    wait_for_shell_with, CommandOutput, ExecError, ExecMode, Session, WaitError, WaitOptions,
};

fn session(runner: &MockRunner) -> (Session<MockRunner>, CapturedConsole) {
    let console = CapturedConsole::new();
    let session = Session::new(runner.clone()).with_console(Box::new(console.clone()));
    (session, console)
}

#[test]
fn retries_network_errors_then_succeeds() {
    let n = 4;
    let mut script = vec![Scripted::Network; n];
    script.push(Scripted::Output(CommandOutput::success(" 12:00 up 1 min\n")));
    let runner = MockRunner::with_script(script);
    let (session, console) = session(&runner);

    let mut sleeps = Vec::new();
    let attempts = wait_for_shell_with(&session, &WaitOptions::default(), |d| sleeps.push(d))
        .expect("wait");

    assert_eq!(attempts as usize, n + 1);
    assert_eq!(runner.call_count(), n + 1);
    assert_eq!(sleeps, vec![Duration::from_secs(1); n]);
    assert!(runner.calls().iter().all(|c| c.line == "uptime" && !c.privileged));

    let text = console.contents();
    assert!(text.starts_with("Waiting for shell\n...."), "got: {text}");
    assert!(text.ends_with(" OK\n"), "got: {text}");
    assert!(!text.contains("run: uptime"), "probe echo must be hidden: {text}");
}

#[test]
fn immediate_success_does_not_sleep() {
    let runner = MockRunner::new();
    let (session, _) = session(&runner);
    let mut slept = false;
    let attempts =
        wait_for_shell_with(&session, &WaitOptions::default(), |_| slept = true).expect("wait");
    assert_eq!(attempts, 1);
    assert!(!slept);
}

#[test]
fn non_network_error_is_not_retried() {
    let runner = MockRunner::with_script(vec![Scripted::Remote(
        "Permission denied (publickey).".into(),
    )]);
    let (session, _) = session(&runner);
    let mut slept = false;
    let err = wait_for_shell_with(&session, &WaitOptions::default(), |_| slept = true).unwrap_err();
    assert!(matches!(err, WaitError::Exec(ExecError::Remote { .. })), "got: {err}");
    assert_eq!(runner.call_count(), 1);
    assert!(!slept);
}

#[test]
fn failing_probe_command_is_fatal() {
    let runner = MockRunner::with_script(vec![
        Scripted::Network,
        Scripted::Output(CommandOutput::exit(127)),
    ]);
    let (session, _) = session(&runner);
    let err = wait_for_shell_with(&session, &WaitOptions::default(), |_| {}).unwrap_err();
    assert!(matches!(err, WaitError::Exec(ExecError::NonZeroExit { code: 127, .. })));
    assert_eq!(runner.call_count(), 2);
}

#[test]
fn deadline_stops_the_wait() {
    let runner = MockRunner::with_script(vec![Scripted::Network; 10]);
    let (session, _) = session(&runner);
    let options = WaitOptions {
        deadline: Some(Duration::ZERO),
        ..WaitOptions::default()
    };
    let err = wait_for_shell_with(&session, &options, |_| {}).unwrap_err();
    assert!(matches!(err, WaitError::DeadlineExceeded { attempts: 1, .. }), "got: {err}");
}

#[test]
fn mode_restored_after_wait() {
    let runner = MockRunner::with_script(vec![Scripted::Network]);
    let (session, _) = session(&runner);
    wait_for_shell_with(&session, &WaitOptions::default(), |_| {}).expect("wait");
    assert_eq!(session.mode(), ExecMode::default());
}
