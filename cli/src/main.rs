//! setlive - node-local deployment reconciler

#![cfg_attr(test, allow(clippy::expect_used))]

use clap::Parser;

use setlive::application::ports::EventLog;
use setlive::cli::Cli;
use setlive::infra::log::{TracingLog, init_tracing};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();
    if let Err(e) = cli.run().await {
        TracingLog.fatal(&format!("{e:#}"));
        std::process::exit(1);
    }
}
