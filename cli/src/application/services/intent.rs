//! Application service — intent decoding.
//!
//! Reads everything declared for one host from the KV store and shapes it
//! into an [`IntentNode`]. A malformed record only costs its own
//! application; the host-level listing is the one failure that propagates.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::application::ports::{EventLog, KvStore};
use crate::domain::error::IntentError;
use crate::domain::intent::{
    DeployConfig, IntentApp, IntentNode, NodeRecord, deploy_config_key, node_key, string_map,
    versions_key,
};

/// Poll the KV store once and build the intent for `host`.
///
/// Applications whose records fail to decode are logged and left out.
///
/// # Errors
///
/// Returns an error only if listing `nodes/<host>` fails.
pub async fn poll_intent(
    kv: &impl KvStore,
    log: &impl EventLog,
    host: &str,
) -> Result<IntentNode> {
    log.info("Polling intent store");
    let prefix = node_key(host);
    let apps = kv
        .list(&prefix)
        .await
        .with_context(|| format!("listing {prefix}"))?;

    let mut intent = IntentNode::default();
    for (name, raw) in &apps {
        log.info(&format!("Checking intent for {name}"));
        match decode_app(kv, host, name, raw).await {
            Ok(app) => intent.insert(app),
            Err(e) => log.error(&format!("{name}: skipping, {e}")),
        }
    }
    Ok(intent)
}

/// Decode one application from its node record plus the cluster records
/// that record points at.
///
/// # Errors
///
/// Returns an [`IntentError`] describing the first record that is missing,
/// unreadable or malformed.
pub async fn decode_app(
    kv: &impl KvStore,
    host: &str,
    name: &str,
    node_raw: &Value,
) -> Result<IntentApp, IntentError> {
    let node = NodeRecord::decode(host, name, node_raw)?;

    let versions = fetch_string_map(kv, &versions_key(name, &node.cluster)).await?;

    let config_key = deploy_config_key(name, &node.cluster);
    let deploy = DeployConfig::decode(&config_key, &fetch(kv, &config_key).await?)?;

    Ok(IntentApp {
        name: name.to_string(),
        basedir: deploy.basedir,
        versions,
    })
}

async fn fetch(kv: &impl KvStore, key: &str) -> Result<Value, IntentError> {
    match kv.get(key).await {
        Ok(Some(raw)) => Ok(raw),
        Ok(None) => Err(IntentError::Missing {
            key: key.to_string(),
        }),
        Err(e) => Err(IntentError::Fetch {
            key: key.to_string(),
            reason: format!("{e:#}"),
        }),
    }
}

async fn fetch_string_map(
    kv: &impl KvStore,
    key: &str,
) -> Result<BTreeMap<String, String>, IntentError> {
    let raw = fetch(kv, key).await?;
    string_map(key, &raw)
}
