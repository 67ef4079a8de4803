//! Tests for host name resolution.

#![allow(clippy::expect_used)]

use setlive::application::ports::HostIdentity;
use setlive::infra::host::SystemHost;

use crate::mocks::{Journal, ScriptedRunner};

#[tokio::test]
async fn test_override_wins_without_running_anything() {
    let journal = Journal::default();
    let runner = ScriptedRunner::new(&journal);
    let host = SystemHost::new(&runner, Some(" host1 ".to_string()));

    assert_eq!(host.hostname().await.expect("hostname"), "host1");
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn test_falls_back_to_kernel_record_when_program_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let record = dir.path().join("hostname");
    std::fs::write(&record, "host7\n").expect("write");

    let journal = Journal::default();
    let runner = ScriptedRunner::new(&journal);
    runner.refuse("hostname");
    let host = SystemHost::new(&runner, None).with_fallback(&record);

    assert_eq!(host.hostname().await.expect("hostname"), "host7");
    assert_eq!(journal.entries(), vec!["run hostname".to_string()]);
}

#[tokio::test]
async fn test_no_program_and_no_record_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let journal = Journal::default();
    let runner = ScriptedRunner::new(&journal);
    runner.refuse("hostname");
    let host = SystemHost::new(&runner, None).with_fallback(dir.path().join("missing"));

    let err = host.hostname().await.expect_err("no host name source");
    assert!(format!("{err:#}").contains("cannot determine hostname"));
}

#[tokio::test]
async fn test_failing_program_does_not_fall_back() {
    let dir = tempfile::tempdir().expect("tempdir");
    let record = dir.path().join("hostname");
    std::fs::write(&record, "host7\n").expect("write");

    let journal = Journal::default();
    let runner = ScriptedRunner::new(&journal);
    runner.fail("hostname", 1);
    let host = SystemHost::new(&runner, None).with_fallback(&record);

    assert!(host.hostname().await.is_err());
}
