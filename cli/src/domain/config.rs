//! Domain types and validators for setlive configuration.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Defaults ─────────────────────────────────────────────────────────────────

pub const DEFAULT_DESCRIPTOR_DIR: &str = "/etc/servicebuilder.d";
pub const DEFAULT_STAGING_DIR: &str = "/var/service-stage";
pub const DEFAULT_SERVICE_DIR: &str = "/var/service";
pub const DEFAULT_SUPERVISOR: &str = "sv";
pub const DEFAULT_SERVICEBUILDER: &str = "servicebuilder";
pub const DEFAULT_KV_URL: &str = "http://127.0.0.1:8500";
pub const DEFAULT_CONFIG_PATH: &str = "/etc/setlive.yaml";

// ── Config schema ────────────────────────────────────────────────────────────

/// Host-wide configuration, optionally stored in `/etc/setlive.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetliveConfig {
    /// Directory holding one `<app>.yaml` descriptor per application.
    pub descriptor_dir: PathBuf,
    /// Supervisor staging directory handed to `servicebuilder -s`.
    pub staging_dir: PathBuf,
    /// Supervisor active directory; each app is supervised at `<service_dir>/<app>`.
    pub service_dir: PathBuf,
    /// Supervisor control program (`stop` / `start`).
    pub supervisor: String,
    /// Descriptor generator program.
    pub servicebuilder: String,
    /// KV store base URL.
    pub kv_url: String,
    /// Optional KV ACL token.
    pub kv_token: Option<String>,
    /// Host identity override; the system host name is used when unset.
    pub hostname: Option<String>,
    /// Bound of the traversal → execution queue.
    pub queue_depth: usize,
}

impl Default for SetliveConfig {
    fn default() -> Self {
        Self {
            descriptor_dir: PathBuf::from(DEFAULT_DESCRIPTOR_DIR),
            staging_dir: PathBuf::from(DEFAULT_STAGING_DIR),
            service_dir: PathBuf::from(DEFAULT_SERVICE_DIR),
            supervisor: DEFAULT_SUPERVISOR.to_string(),
            servicebuilder: DEFAULT_SERVICEBUILDER.to_string(),
            kv_url: DEFAULT_KV_URL.to_string(),
            kv_token: None,
            hostname: None,
            queue_depth: 1,
        }
    }
}

impl SetliveConfig {
    /// `<service_dir>/<app>` — the path the supervisor controls.
    #[must_use]
    pub fn service_path(&self, app: &str) -> PathBuf {
        self.service_dir.join(app)
    }

    /// Check invariants that the rest of the program relies on.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory is relative, a program name is
    /// empty, or the queue depth is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, dir) in [
            ("descriptor_dir", &self.descriptor_dir),
            ("staging_dir", &self.staging_dir),
            ("service_dir", &self.service_dir),
        ] {
            if !dir.is_absolute() {
                return Err(ConfigError::RelativePath {
                    field,
                    value: dir.display().to_string(),
                });
            }
        }
        for (field, program) in [
            ("supervisor", &self.supervisor),
            ("servicebuilder", &self.servicebuilder),
        ] {
            if program.trim().is_empty() {
                return Err(ConfigError::EmptyProgram { field });
            }
        }
        if self.queue_depth == 0 {
            return Err(ConfigError::ZeroQueueDepth);
        }
        Ok(())
    }
}
