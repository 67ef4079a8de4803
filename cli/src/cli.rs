//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::application::services::lifecycle::Lifecycle;
use crate::application::services::reconcile::{Mode, reconcile_once};
use crate::domain::config::SetliveConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::YamlConfigStore;
use crate::infra::consul::ConsulKv;
use crate::infra::fs::HostFs;
use crate::infra::host::SystemHost;
use crate::infra::log::TracingLog;

/// Reconcile the applications declared for this host with what is running
#[derive(Debug, Parser)]
#[command(name = "setlive", version)]
pub struct Cli {
    /// Path to the YAML config file [default: /etc/setlive.yaml]
    #[arg(long, env = "SETLIVE_CONFIG")]
    pub config: Option<PathBuf>,

    /// KV store base URL
    #[arg(long, env = "SETLIVE_KV_URL")]
    pub kv_url: Option<String>,

    /// KV store ACL token
    #[arg(long, env = "SETLIVE_KV_TOKEN", hide_env_values = true)]
    pub kv_token: Option<String>,

    /// Host name to reconcile (defaults to the system host name)
    #[arg(long, env = "SETLIVE_HOSTNAME")]
    pub hostname: Option<String>,

    /// Directory receiving generated service descriptors
    #[arg(long, env = "SETLIVE_DESCRIPTOR_DIR")]
    pub descriptor_dir: Option<PathBuf>,

    /// Supervisor staging directory
    #[arg(long, env = "SETLIVE_STAGING_DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Supervisor active service directory
    #[arg(long, env = "SETLIVE_SERVICE_DIR")]
    pub service_dir: Option<PathBuf>,

    /// Supervisor control program
    #[arg(long, env = "SETLIVE_SUPERVISOR")]
    pub supervisor: Option<String>,

    /// Service descriptor generator program
    #[arg(long, env = "SETLIVE_SERVICEBUILDER")]
    pub servicebuilder: Option<String>,

    /// Bound of the queue between KV traversal and lifecycle execution
    #[arg(long, env = "SETLIVE_QUEUE_DEPTH")]
    pub queue_depth: Option<usize>,

    /// Process applications inline instead of through the worker queue
    #[arg(long)]
    pub inline: bool,
}

impl Cli {
    /// Layer command-line and environment overrides over `config`.
    #[must_use]
    pub fn apply_overrides(&self, mut config: SetliveConfig) -> SetliveConfig {
        if let Some(v) = &self.kv_url {
            config.kv_url.clone_from(v);
        }
        if let Some(v) = &self.kv_token {
            config.kv_token = Some(v.clone());
        }
        if let Some(v) = &self.hostname {
            config.hostname = Some(v.clone());
        }
        if let Some(v) = &self.descriptor_dir {
            config.descriptor_dir.clone_from(v);
        }
        if let Some(v) = &self.staging_dir {
            config.staging_dir.clone_from(v);
        }
        if let Some(v) = &self.service_dir {
            config.service_dir.clone_from(v);
        }
        if let Some(v) = &self.supervisor {
            config.supervisor.clone_from(v);
        }
        if let Some(v) = &self.servicebuilder {
            config.servicebuilder.clone_from(v);
        }
        if let Some(v) = self.queue_depth {
            config.queue_depth = v;
        }
        config
    }

    /// Load the config file, apply overrides and validate the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or invalid.
    pub fn resolve_config(&self) -> Result<SetliveConfig> {
        let store = YamlConfigStore::locate(self.config.clone());
        let config = self.apply_overrides(store.load()?);
        config
            .validate()
            .with_context(|| format!("invalid configuration ({})", store.path().display()))?;
        Ok(config)
    }

    #[must_use]
    pub fn mode(&self, config: &SetliveConfig) -> Mode {
        if self.inline {
            Mode::Inline
        } else {
            Mode::Pipeline {
                depth: config.queue_depth,
            }
        }
    }

    /// Execute one reconciliation pass.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, host identity or the host-level
    /// KV listing fails. Per-application failures are only logged.
    pub async fn run(self) -> Result<()> {
        let config = self.resolve_config()?;
        let mode = self.mode(&config);

        let runner = TokioCommandRunner;
        let host = SystemHost::new(&runner, config.hostname.clone());
        let kv = ConsulKv::new(&config.kv_url, config.kv_token.clone())?;
        let fs = HostFs;
        let log = TracingLog;
        let lifecycle = Lifecycle::new(&config, &runner, &fs, &log);

        reconcile_once(&host, &kv, &lifecycle, &log, mode).await?;
        Ok(())
    }
}
