//! `TracingLog` — implements the `EventLog` port on top of `tracing`.

use crate::application::ports::EventLog;

/// Forwards log events to the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl EventLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!("{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!("{message}");
    }

    fn fatal(&self, message: &str) {
        tracing::error!(fatal = true, "{message}");
    }
}

/// Install the process-wide subscriber: `RUST_LOG` filter, stderr output.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setlive=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
