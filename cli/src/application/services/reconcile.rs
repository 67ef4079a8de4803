//! Application service — one reconciliation pass for the local host.
//!
//! Traversal of the KV store and lifecycle execution are two stages joined
//! by a bounded queue: a single producer, a single consumer, and at most one
//! lifecycle sequence in flight. `Mode::Inline` runs the same steps without
//! the queue.

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::application::ports::{CommandRunner, EventLog, HostIdentity, KvStore, LocalFs};
use crate::application::services::intent::poll_intent;
use crate::application::services::lifecycle::Lifecycle;
use crate::domain::intent::IntentApp;
use crate::domain::lifecycle::RunSummary;

/// How decoded applications reach the lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Decode everything, then process apps one by one on the same task.
    Inline,
    /// Feed apps through a bounded queue of the given depth.
    Pipeline { depth: usize },
}

/// Run one reconciliation pass.
///
/// Per-application failures are logged and counted in the summary; they
/// never end the run.
///
/// # Errors
///
/// Returns an error if the host identity cannot be resolved or the
/// host-level KV listing fails.
pub async fn reconcile_once<K, R, F, L>(
    host: &impl HostIdentity,
    kv: &K,
    lifecycle: &Lifecycle<'_, R, F, L>,
    log: &L,
    mode: Mode,
) -> Result<RunSummary>
where
    K: KvStore,
    R: CommandRunner,
    F: LocalFs,
    L: EventLog,
{
    let hostname = host.hostname().await.context("resolving host identity")?;

    let summary = match mode {
        Mode::Inline => {
            let intent = poll_intent(kv, log, &hostname).await?;
            let mut summary = RunSummary::default();
            for app in intent.into_apps() {
                summary.record(&lifecycle.set_live(&app).await);
            }
            summary
        }
        Mode::Pipeline { depth } => pipeline(kv, lifecycle, log, &hostname, depth).await?,
    };

    log.info(&format!("Reconciled {hostname}: {summary}"));
    Ok(summary)
}

async fn pipeline<K, R, F, L>(
    kv: &K,
    lifecycle: &Lifecycle<'_, R, F, L>,
    log: &L,
    hostname: &str,
    depth: usize,
) -> Result<RunSummary>
where
    K: KvStore,
    R: CommandRunner,
    F: LocalFs,
    L: EventLog,
{
    let (tx, mut rx) = mpsc::channel::<IntentApp>(depth.max(1));

    // The whole intent is read before the first send, so traversal finishes
    // before execution starts. Dropping `tx` closes the queue.
    let producer = async move {
        let intent = poll_intent(kv, log, hostname).await?;
        for app in intent.into_apps() {
            if tx.send(app).await.is_err() {
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    };

    let consumer = async {
        let mut summary = RunSummary::default();
        while let Some(app) = rx.recv().await {
            summary.record(&lifecycle.set_live(&app).await);
        }
        summary
    };

    let (produced, summary) = tokio::join!(producer, consumer);
    produced?;
    Ok(summary)
}
