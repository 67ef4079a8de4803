//! End-to-end reconciliation scenarios against mocked ports.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use serde_json::json;
use setlive::application::services::lifecycle::Lifecycle;
use setlive::application::services::reconcile::{Mode, reconcile_once};
use setlive::domain::lifecycle::RunSummary;

use crate::mocks::{
    FixedHost, Journal, Level, MemoryFs, MemoryKv, NoHost, RecordingLog, ScriptedRunner,
    test_config,
};

const MODES: [Mode; 3] = [
    Mode::Inline,
    Mode::Pipeline { depth: 1 },
    Mode::Pipeline { depth: 8 },
];

fn web_kv(status: &str, version: &str) -> MemoryKv {
    MemoryKv::new()
        .with("nodes/host1/web", json!({"cluster": "prod"}))
        .with("clusters/web/prod/versions", json!({ version: status }))
        .with("clusters/web/prod/deploy_config", json!({"basedir": "/srv/web"}))
}

fn app_kv(kv: MemoryKv, app: &str) -> MemoryKv {
    kv.with(&format!("nodes/host1/{app}"), json!({"cluster": "prod"}))
        .with(&format!("clusters/{app}/prod/versions"), json!({"v1": "active"}))
        .with(
            &format!("clusters/{app}/prod/deploy_config"),
            json!({ "basedir": format!("/srv/{app}") }),
        )
}

struct World {
    journal: Journal,
    runner: ScriptedRunner,
    fs: MemoryFs,
    log: RecordingLog,
}

impl World {
    fn new() -> Self {
        let journal = Journal::default();
        Self {
            runner: ScriptedRunner::new(&journal),
            fs: MemoryFs::new(&journal),
            log: RecordingLog::new(),
            journal,
        }
    }

    fn prepare(&self, app: &str, version: &str) {
        self.fs.add_dir(&format!("/srv/{app}/installs/{app}_{version}"));
        self.fs.add_link(&format!("/srv/{app}/current"), &format!("/srv/{app}/installs/{app}_old"));
    }

    async fn run(&self, kv: &MemoryKv, mode: Mode) -> anyhow::Result<RunSummary> {
        let config = test_config();
        let lifecycle = Lifecycle::new(&config, &self.runner, &self.fs, &self.log);
        reconcile_once(&FixedHost("host1"), kv, &lifecycle, &self.log, mode).await
    }
}

#[tokio::test]
async fn test_scenario_single_app_goes_live() {
    for mode in MODES {
        let w = World::new();
        w.prepare("web", "v1");
        let summary = w.run(&web_kv("active", "v1"), mode).await.expect("run");

        assert_eq!(summary, RunSummary { live: 1, skipped: 0, failed: 0 });
        assert_eq!(
            w.journal.entries(),
            vec![
                "run sv stop /var/service/web",
                "write /etc/servicebuilder.d/web.yaml",
                "run servicebuilder -c /etc/servicebuilder.d -d /var/service -s /var/service-stage",
                "remove /srv/web/current",
                "symlink /srv/web/current -> /srv/web/installs/web_v1",
                "run sv start /var/service/web",
            ],
            "mode {mode:?}"
        );
        let yaml = w.fs.file("/etc/servicebuilder.d/web.yaml").expect("descriptor");
        assert!(yaml.contains("/srv/web/current/bin/launch"));
        assert_eq!(
            w.fs.link("/srv/web/current"),
            Some(PathBuf::from("/srv/web/installs/web_v1"))
        );
    }
}

#[tokio::test]
async fn test_scenario_inactive_version_is_skipped() {
    for mode in MODES {
        let w = World::new();
        w.prepare("web", "v1");
        let summary = w.run(&web_kv("inactive", "v1"), mode).await.expect("run");
        assert_eq!(summary, RunSummary { live: 0, skipped: 1, failed: 0 });
        assert!(!w.journal.contains("run sv"));
        assert!(w.log.has(Level::Info, "No active version"));
    }
}

#[tokio::test]
async fn test_scenario_unprepared_version_is_skipped() {
    let w = World::new();
    w.prepare("web", "v1");
    let summary = w
        .run(&web_kv("active", "v2"), Mode::Pipeline { depth: 1 })
        .await
        .expect("run");
    assert_eq!(summary.skipped, 1);
    assert!(w.journal.entries().is_empty());
    assert!(w.log.has(Level::Info, "not prepared"));
}

#[tokio::test]
async fn test_scenario_app_without_cluster_is_excluded() {
    for mode in MODES {
        let w = World::new();
        w.prepare("web", "v1");
        let kv = web_kv("active", "v1").with("nodes/host1/batch", json!({"role": "worker"}));
        let summary = w.run(&kv, mode).await.expect("run");

        assert_eq!(summary, RunSummary { live: 1, skipped: 0, failed: 0 });
        assert!(!w.journal.contains("batch"));
        assert!(w.log.has(Level::Error, "no cluster key in node data for batch"));
    }
}

#[tokio::test]
async fn test_scenario_stop_failure_is_isolated() {
    for mode in MODES {
        let w = World::new();
        w.prepare("api", "v1");
        w.prepare("web", "v1");
        w.runner.fail("sv stop /var/service/api", 1);
        let kv = app_kv(app_kv(MemoryKv::new(), "api"), "web");

        let summary = w.run(&kv, mode).await.expect("run");

        assert_eq!(summary, RunSummary { live: 1, skipped: 0, failed: 1 });
        assert!(w.fs.file("/etc/servicebuilder.d/api.yaml").is_none());
        assert_eq!(
            w.fs.link("/srv/api/current"),
            Some(PathBuf::from("/srv/api/installs/api_old"))
        );
        assert!(w.journal.contains("run sv start /var/service/web"));
        assert!(w.log.has(Level::Error, "api: could not stop"));
    }
}

#[tokio::test]
async fn test_apps_are_processed_in_name_order() {
    let w = World::new();
    for app in ["alpha", "mid", "zulu"] {
        w.prepare(app, "v1");
    }
    let kv = app_kv(app_kv(app_kv(MemoryKv::new(), "zulu"), "alpha"), "mid");
    w.run(&kv, Mode::Pipeline { depth: 1 }).await.expect("run");

    let stops: Vec<String> = w
        .journal
        .entries()
        .into_iter()
        .filter(|e| e.starts_with("run sv stop"))
        .collect();
    assert_eq!(
        stops,
        vec![
            "run sv stop /var/service/alpha",
            "run sv stop /var/service/mid",
            "run sv stop /var/service/zulu",
        ]
    );
}

#[tokio::test]
async fn test_lifecycles_never_interleave() {
    let w = World::new();
    w.prepare("api", "v1");
    w.prepare("web", "v1");
    let kv = app_kv(app_kv(MemoryKv::new(), "api"), "web");
    w.run(&kv, Mode::Pipeline { depth: 4 }).await.expect("run");

    let entries = w.journal.entries();
    let api_start = entries
        .iter()
        .position(|e| e == "run sv start /var/service/api")
        .expect("api started");
    let web_stop = entries
        .iter()
        .position(|e| e == "run sv stop /var/service/web")
        .expect("web stopped");
    assert!(api_start < web_stop);
}

#[tokio::test]
async fn test_unreachable_kv_is_fatal_and_touches_nothing() {
    for mode in MODES {
        let w = World::new();
        let err = w
            .run(&MemoryKv::new().unreachable(), mode)
            .await
            .expect_err("list failure must be fatal");
        assert!(format!("{err:#}").contains("connection refused"));
        assert!(w.journal.entries().is_empty());
    }
}

#[tokio::test]
async fn test_unknown_host_is_fatal() {
    let w = World::new();
    let config = test_config();
    let lifecycle = Lifecycle::new(&config, &w.runner, &w.fs, &w.log);
    let err = reconcile_once(&NoHost, &web_kv("active", "v1"), &lifecycle, &w.log, Mode::Inline)
        .await
        .expect_err("no host identity");
    assert!(format!("{err:#}").contains("resolving host identity"));
    assert!(w.journal.entries().is_empty());
}

#[tokio::test]
async fn test_run_summary_is_logged() {
    let w = World::new();
    w.prepare("web", "v1");
    w.run(&web_kv("active", "v1"), Mode::Inline).await.expect("run");
    assert!(w.log.has(Level::Info, "Reconciled host1: 1 live, 0 skipped, 0 failed"));
}
