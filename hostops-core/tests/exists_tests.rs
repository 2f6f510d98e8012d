//! Existence check behaviour against a scripted runner.

use hostops_core::{
    exists,
    mock::{CapturedConsole, MockRunner, Scripted},
    CommandOutput, ExecError, ExecMode, Session,
};

fn quiet_session(runner: &MockRunner) -> (Session<MockRunner>, CapturedConsole) {
    let console = CapturedConsole::new();
    let session = Session::new(runner.clone()).with_console(Box::new(console.clone()));
    (session, console)
}

#[test]
fn present_file_is_true() {
    let runner = MockRunner::with_script(vec![Scripted::Output(CommandOutput::success(""))]);
    let (session, _) = quiet_session(&runner);
    assert!(exists(&session, "/etc/hosts", false, false).expect("exists"));
}

#[test]
fn missing_or_empty_file_is_false_not_error() {
    let runner = MockRunner::with_script(vec![Scripted::Output(CommandOutput {
        code: 1,
        stdout: String::new(),
        stderr: "some warning\n".into(),
    })]);
    let (session, _) = quiet_session(&runner);
    assert!(!exists(&session, "/var/empty.log", false, false).expect("no error on exit 1"));
}

#[test]
fn quiet_check_prints_nothing_either_way() {
    let runner = MockRunner::with_script(vec![
        Scripted::Output(CommandOutput::success("chatter\n")),
        Scripted::Output(CommandOutput::exit(1)),
    ]);
    let (session, console) = quiet_session(&runner);
    exists(&session, "/a", false, false).expect("first");
    exists(&session, "/b", true, false).expect("second");
    assert_eq!(console.contents(), "");
}

#[test]
fn privilege_flag_selects_privileged_command() {
    let runner = MockRunner::new();
    let (session, _) = quiet_session(&runner);
    exists(&session, "/root/.ssh/authorized_keys", true, false).expect("sudo");
    exists(&session, "/home/deploy/.profile", false, false).expect("plain");

    let calls = runner.calls();
    assert!(calls[0].privileged);
    assert_eq!(calls[0].line, "test -s /root/.ssh/authorized_keys");
    assert!(!calls[1].privileged);
}

#[test]
fn repeated_checks_agree() {
    let runner = MockRunner::with_script(vec![
        Scripted::Output(CommandOutput::exit(1)),
        Scripted::Output(CommandOutput::exit(1)),
        Scripted::Output(CommandOutput::exit(1)),
    ]);
    let (session, _) = quiet_session(&runner);
    let results: Vec<bool> = (0..3)
        .map(|_| exists(&session, "/nope", false, false).expect("exists"))
        .collect();
    assert_eq!(results, vec![false, false, false]);
    assert_eq!(runner.call_count(), 3);
}

#[test]
fn session_mode_is_restored_afterwards() {
    let runner = MockRunner::with_script(vec![Scripted::Output(CommandOutput::exit(1))]);
    let (session, _) = quiet_session(&runner);
    let before = session.mode();
    exists(&session, "/nope", false, false).expect("exists");
    assert_eq!(session.mode(), before);
    assert_eq!(before, ExecMode::default());

    // Back in fatal mode: the same exit status is an error again.
    runner.push(Scripted::Output(CommandOutput::exit(1)));
    assert!(matches!(
        session.run("test -s /nope"),
        Err(ExecError::NonZeroExit { code: 1, .. })
    ));
}

#[test]
fn network_failure_propagates() {
    let runner = MockRunner::with_script(vec![Scripted::Network]);
    let (session, _) = quiet_session(&runner);
    let err = exists(&session, "/etc/hosts", false, false).unwrap_err();
    assert!(err.is_network());
    assert_eq!(session.mode(), ExecMode::default());
}

#[test]
fn home_relative_path_is_left_for_the_remote_shell() {
    let runner = MockRunner::new();
    let (session, _) = quiet_session(&runner);
    exists(&session, "~/.bashrc", false, false).expect("exists");
    exists(&session, "~/my notes.txt", true, false).expect("exists");
    let calls = runner.calls();
    assert_eq!(calls[0].line, "test -s ~/.bashrc");
    assert_eq!(calls[1].line, "test -s ~/'my notes.txt'");
}

/// Stand-in `ssh` client that writes `stderr` and exits with `code`.
#[cfg(unix)]
fn fake_client(dir: &tempfile::TempDir, stderr: &str, code: i32) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("fake-ssh");
    std::fs::write(&path, format!("#!/bin/sh\necho '{stderr}' >&2\nexit {code}\n"))
        .expect("write fake client");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).expect("chmod");
    path.display().to_string()
}

#[cfg(unix)]
#[test]
fn sudo_refusal_is_an_error_not_false() {
    use hostops_core::{ConnectionConfig, SshRunner};

    let dir = tempfile::TempDir::new().expect("tempdir");
    let program = fake_client(&dir, "sudo: a password is required", 1);
    let runner = SshRunner::new(ConnectionConfig::new("web1").with_user("deploy"))
        .with_program(program);
    let session = Session::new(runner).with_console(Box::new(CapturedConsole::new()));

    let err = exists(&session, "/root/.ssh/authorized_keys", true, false).unwrap_err();
    assert!(matches!(err, ExecError::Remote { .. }), "got: {err}");
    assert!(err.to_string().contains("password is required"), "got: {err}");
}

#[cfg(unix)]
#[test]
fn privileged_miss_is_still_false() {
    use hostops_core::{ConnectionConfig, SshRunner};

    let dir = tempfile::TempDir::new().expect("tempdir");
    let program = fake_client(&dir, "", 1);
    let runner = SshRunner::new(ConnectionConfig::new("web1").with_user("deploy"))
        .with_program(program);
    let session = Session::new(runner).with_console(Box::new(CapturedConsole::new()));

    assert!(!exists(&session, "/root/missing", true, false).expect("exists"));
}
