//! Ordering and flag handling of `smart_sync` with test doubles.

use std::cell::RefCell;
use std::rc::Rc;

use hostops_core::{
    mock::{CapturedConsole, MockRunner, Scripted},
    ConnectionConfig, ExecError, Session,
};
use hostops_sync::{smart_sync, SyncError, SyncJob, SyncReport, SyncRequest, Syncer};
use rstest::rstest;

type Journal = Rc<RefCell<Vec<String>>>;

/// Records the job and logs `sync` into the shared journal.
struct RecordingSyncer {
    journal: Journal,
    jobs: RefCell<Vec<SyncJob>>,
    fail: bool,
}

impl RecordingSyncer {
    fn new(journal: &Journal, fail: bool) -> Self {
        Self {
            journal: journal.clone(),
            jobs: RefCell::new(Vec::new()),
            fail,
        }
    }
}

impl Syncer for RecordingSyncer {
    fn sync(&self, job: &SyncJob) -> Result<SyncReport, SyncError> {
        self.jobs.borrow_mut().push(job.clone());
        self.journal.borrow_mut().push("sync".to_string());
        if self.fail {
            return Err(SyncError::Rsync {
                status: "exit status: 23".into(),
                stderr: "some files could not be transferred".into(),
            });
        }
        Ok(SyncReport {
            output: "sent 1,024 bytes".into(),
        })
    }
}

fn config(insecure: bool) -> ConnectionConfig {
    ConnectionConfig::new("web1")
        .with_user("deploy")
        .with_insecure(insecure)
}

fn session(journal: &Journal, runner: MockRunner) -> Session<MockRunner> {
    Session::new(runner.with_journal(journal.clone()))
        .with_console(Box::new(CapturedConsole::new()))
}

#[test]
fn for_user_wraps_sync_in_ownership_steps() {
    let journal = Journal::default();
    let session = session(&journal, MockRunner::new());
    let syncer = RecordingSyncer::new(&journal, false);
    let request = SyncRequest::upload("dist/", "/srv/www").for_user("www-data");

    smart_sync(&session, &config(false), &syncer, &request).expect("sync");

    assert_eq!(
        *journal.borrow(),
        vec![
            "sudo: find /srv/www -type d -print0 | xargs -0 chmod u+rwx",
            "sudo: chown -R deploy /srv/www",
            "sync",
            "sudo: chown -R www-data /srv/www",
        ]
    );
}

#[test]
fn without_for_user_only_syncs() {
    let journal = Journal::default();
    let runner = MockRunner::new();
    let session = session(&journal, runner.clone());
    let syncer = RecordingSyncer::new(&journal, false);

    let report = smart_sync(
        &session,
        &config(false),
        &syncer,
        &SyncRequest::upload("dist/", "/srv/www"),
    )
    .expect("sync");

    assert_eq!(report.output, "sent 1,024 bytes");
    assert_eq!(*journal.borrow(), vec!["sync"]);
    assert_eq!(runner.call_count(), 0);
}

#[test]
fn failed_sync_skips_final_chown() {
    let journal = Journal::default();
    let session = session(&journal, MockRunner::new());
    let syncer = RecordingSyncer::new(&journal, true);
    let request = SyncRequest::upload("dist/", "/srv/www").for_user("www-data");

    let err = smart_sync(&session, &config(false), &syncer, &request).unwrap_err();

    match &err {
        SyncError::PartialOwnership {
            current_owner,
            intended_owner,
            source,
            ..
        } => {
            assert_eq!(current_owner, "deploy");
            assert_eq!(intended_owner, "www-data");
            assert!(matches!(**source, SyncError::Rsync { .. }));
        }
        other => panic!("expected PartialOwnership, got {other}"),
    }
    assert!(!journal.borrow().iter().any(|e| e.contains("www-data")));
    assert_eq!(journal.borrow().last().map(String::as_str), Some("sync"));
}

#[test]
fn failed_sync_without_for_user_returns_plain_error() {
    let journal = Journal::default();
    let session = session(&journal, MockRunner::new());
    let syncer = RecordingSyncer::new(&journal, true);
    let err = smart_sync(
        &session,
        &config(false),
        &syncer,
        &SyncRequest::upload("dist/", "/srv/www"),
    )
    .unwrap_err();
    assert!(matches!(err, SyncError::Rsync { .. }));
}

#[test]
fn failed_chmod_stops_before_sync() {
    let journal = Journal::default();
    let runner = MockRunner::with_script(vec![Scripted::Output(hostops_core::CommandOutput::exit(1))]);
    let session = session(&journal, runner);
    let syncer = RecordingSyncer::new(&journal, false);
    let request = SyncRequest::upload("dist/", "/srv/www").for_user("www-data");

    let err = smart_sync(&session, &config(false), &syncer, &request).unwrap_err();
    assert!(matches!(err, SyncError::Exec(ExecError::NonZeroExit { .. })));
    assert!(syncer.jobs.borrow().is_empty());
}

#[test]
fn paths_and_owner_are_quoted() {
    let journal = Journal::default();
    let session = session(&journal, MockRunner::new());
    let syncer = RecordingSyncer::new(&journal, false);
    let request = SyncRequest::upload("dist/", "/srv/my site").for_user("www-data");

    smart_sync(&session, &config(false), &syncer, &request).expect("sync");
    assert_eq!(journal.borrow()[1], "sudo: chown -R deploy '/srv/my site'");
}

#[test]
fn option_like_owner_is_rejected() {
    let journal = Journal::default();
    let session = session(&journal, MockRunner::new());
    let syncer = RecordingSyncer::new(&journal, false);
    let request = SyncRequest::upload("dist/", "/srv/www").for_user("--reference=/etc");

    let err = smart_sync(&session, &config(false), &syncer, &request).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)));
    assert!(journal.borrow().is_empty());
}

#[rstest]
#[case(true, vec!["-o", "UserKnownHostsFile=/dev/null", "-o", "StrictHostKeyChecking=no"])]
#[case(false, vec![])]
fn insecure_flag_controls_ssh_opts(#[case] insecure: bool, #[case] expected: Vec<&str>) {
    let journal = Journal::default();
    let session = session(&journal, MockRunner::new());
    let syncer = RecordingSyncer::new(&journal, false);

    smart_sync(
        &session,
        &config(insecure),
        &syncer,
        &SyncRequest::upload("dist/", "/srv/www"),
    )
    .expect("sync");

    let jobs = syncer.jobs.borrow();
    assert_eq!(jobs[0].ssh_opts, expected);
    assert_eq!(jobs[0].destination, "deploy@web1");
}

#[test]
fn home_relative_directory_expands_remotely() {
    let journal = Journal::default();
    let session = session(&journal, MockRunner::new());
    let syncer = RecordingSyncer::new(&journal, false);
    let request = SyncRequest::upload("site/", "~/public_html").for_user("www-data");

    smart_sync(&session, &config(false), &syncer, &request).expect("sync");

    assert_eq!(
        *journal.borrow(),
        vec![
            "sudo: find ~/public_html -type d -print0 | xargs -0 chmod u+rwx",
            "sudo: chown -R deploy ~/public_html",
            "sync",
            "sudo: chown -R www-data ~/public_html",
        ]
    );
}
