//! Intent model — what should be live on this host, as declared in the KV store.
//!
//! Pure functions only — no I/O, no async, no filesystem access.
//!
//! Raw KV values arrive as a generic `serde_json::Value` tree. They are
//! validated into typed structures here; nothing is ever coerced.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::domain::error::IntentError;

// ── Constants ────────────────────────────────────────────────────────────────

/// Status string marking the version that should be running.
pub const ACTIVE_STATUS: &str = "active";

/// Node record key naming the cluster configuration for an app on this host.
pub const CLUSTER_KEY: &str = "cluster";

/// Deploy config key holding the app's base directory.
pub const BASEDIR_KEY: &str = "basedir";

// ── KV namespace ─────────────────────────────────────────────────────────────

/// `nodes/<host>` — lists every application assigned to a host.
#[must_use]
pub fn node_key(host: &str) -> String {
    format!("nodes/{host}")
}

/// `clusters/<app>/<cluster>/versions` — the version-status map.
#[must_use]
pub fn versions_key(app: &str, cluster: &str) -> String {
    format!("clusters/{app}/{cluster}/versions")
}

/// `clusters/<app>/<cluster>/deploy_config` — the deploy configuration.
#[must_use]
pub fn deploy_config_key(app: &str, cluster: &str) -> String {
    format!("clusters/{app}/{cluster}/deploy_config")
}

// ── Decoding ─────────────────────────────────────────────────────────────────

/// Validate a raw KV value as a flat string-to-string map.
///
/// # Errors
///
/// Returns [`IntentError::NotStringMap`] if `raw` is not a mapping, or
/// [`IntentError::NonStringValue`] if any value in it is not a string.
pub fn string_map(key: &str, raw: &Value) -> Result<BTreeMap<String, String>, IntentError> {
    let Value::Object(fields) = raw else {
        return Err(IntentError::NotStringMap {
            key: key.to_string(),
        });
    };
    fields
        .iter()
        .map(|(field, value)| match value {
            Value::String(s) => Ok((field.clone(), s.clone())),
            _ => Err(IntentError::NonStringValue {
                key: key.to_string(),
                field: field.clone(),
            }),
        })
        .collect()
}

/// Node-level record for one application on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub cluster: String,
}

impl NodeRecord {
    /// Decode the node record stored under `nodes/<host>/<app>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is not a string map or has no
    /// non-empty `cluster` entry.
    pub fn decode(host: &str, app: &str, raw: &Value) -> Result<Self, IntentError> {
        let key = format!("{}/{app}", node_key(host));
        let fields = string_map(&key, raw)?;
        match fields.get(CLUSTER_KEY) {
            Some(cluster) if !cluster.is_empty() => Ok(Self {
                cluster: cluster.clone(),
            }),
            _ => Err(IntentError::MissingCluster {
                app: app.to_string(),
            }),
        }
    }
}

/// Deploy configuration for an application-cluster pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployConfig {
    /// Absolute root under which installs and the `current` link live.
    pub basedir: PathBuf,
}

impl DeployConfig {
    /// Decode a deploy config value fetched from `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a string map, has no `basedir`,
    /// or the `basedir` is not absolute.
    pub fn decode(key: &str, raw: &Value) -> Result<Self, IntentError> {
        let fields = string_map(key, raw)?;
        let basedir = fields
            .get(BASEDIR_KEY)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| IntentError::MissingBasedir {
                key: key.to_string(),
            })?;
        if !Path::new(basedir).is_absolute() {
            return Err(IntentError::RelativeBasedir {
                key: key.to_string(),
                basedir: basedir.clone(),
            });
        }
        Ok(Self {
            basedir: PathBuf::from(basedir),
        })
    }
}

// ── Intent ───────────────────────────────────────────────────────────────────

/// Declared state of one application on this host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentApp {
    pub name: String,
    /// Always absolute; enforced by [`DeployConfig::decode`].
    pub basedir: PathBuf,
    /// version-id → status.
    pub versions: BTreeMap<String, String>,
}

impl IntentApp {
    /// The version whose status is `"active"`, if any.
    ///
    /// Versions are ordered by id, so when several are marked active the
    /// lexicographically smallest id wins. Use [`Self::active_versions`] to
    /// detect that case.
    #[must_use]
    pub fn active_version(&self) -> Option<&str> {
        self.active_versions().next()
    }

    /// Every version marked `"active"`, in ascending id order.
    pub fn active_versions(&self) -> impl Iterator<Item = &str> {
        self.versions
            .iter()
            .filter(|(_, status)| status.as_str() == ACTIVE_STATUS)
            .map(|(id, _)| id.as_str())
    }

    /// `<basedir>/installs/<app>_<version>`
    #[must_use]
    pub fn install_dir(&self, version: &str) -> PathBuf {
        self.basedir
            .join("installs")
            .join(format!("{}_{version}", self.name))
    }

    /// `<basedir>/current`
    #[must_use]
    pub fn current_link(&self) -> PathBuf {
        self.basedir.join("current")
    }

    /// `<basedir>/current/bin/launch`
    #[must_use]
    pub fn launch_path(&self) -> PathBuf {
        self.current_link().join("bin").join("launch")
    }
}

/// All applications declared for one host during a single poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntentNode {
    pub apps: BTreeMap<String, IntentApp>,
}

impl IntentNode {
    pub fn insert(&mut self, app: IntentApp) {
        self.apps.insert(app.name.clone(), app);
    }

    /// Consume the node, yielding apps in ascending name order.
    pub fn into_apps(self) -> impl Iterator<Item = IntentApp> {
        self.apps.into_values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }
}
