//! Consul-backed implementation of the `KvStore` port.
//!
//! Values are stored as YAML (JSON is accepted too, being a subset) and are
//! handed to the application layer as untyped `serde_json::Value` trees.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;

use crate::application::ports::KvStore;

/// Header carrying the Consul ACL token.
const TOKEN_HEADER: &str = "X-Consul-Token";

/// One entry of a `?recurse` listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct KvEntry {
    key: String,
    /// Base64-encoded; `null` for keys without a value.
    value: Option<String>,
}

/// Consul HTTP KV client.
pub struct ConsulKv {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ConsulKv {
    /// Create a client for the agent at `base_url`, e.g. `http://127.0.0.1:8500`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("setlive/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to create KV client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, key: &str) -> String {
        format!("{}/v1/kv/{}", self.base_url, key.trim_matches('/'))
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let req = self.http.get(url);
        match &self.token {
            Some(token) => req.header(TOKEN_HEADER, token),
            None => req,
        }
    }
}

impl KvStore for ConsulKv {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let url = format!("{}?raw", self.url(key));
        let resp = self
            .request(&url)
            .send()
            .await
            .with_context(|| format!("failed to connect to KV store for {key}"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = resp
            .error_for_status()
            .with_context(|| format!("KV get {key} failed"))?;
        let body = resp
            .bytes()
            .await
            .with_context(|| format!("reading KV value for {key}"))?;
        Ok(Some(parse_value(&body)))
    }

    async fn list(&self, prefix: &str) -> Result<BTreeMap<String, Value>> {
        let url = format!("{}/?recurse", self.url(prefix));
        let resp = self
            .request(&url)
            .send()
            .await
            .with_context(|| format!("failed to connect to KV store for {prefix}"))?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(BTreeMap::new());
        }
        let entries: Vec<KvEntry> = resp
            .error_for_status()
            .with_context(|| format!("KV list {prefix} failed"))?
            .json()
            .await
            .with_context(|| format!("parsing KV listing for {prefix}"))?;
        Ok(children(prefix, entries))
    }
}

/// Decode a stored value into a generic tree.
///
/// Text that is not valid YAML is kept as a plain string so that strict
/// decoding downstream rejects it instead of it vanishing here. Bytes that
/// are not UTF-8 become `Null`, which strict decoding rejects as well.
fn parse_value(raw: &[u8]) -> Value {
    let Ok(text) = std::str::from_utf8(raw) else {
        return Value::Null;
    };
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_yaml::from_str::<Value>(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Keep only direct children of `prefix`, keyed by their last segment.
///
/// A value that is not valid base64 only spoils its own entry: it is kept
/// as `Null` so the owning application is rejected downstream.
fn children(prefix: &str, entries: Vec<KvEntry>) -> BTreeMap<String, Value> {
    let prefix = format!("{}/", prefix.trim_matches('/'));
    let mut out = BTreeMap::new();
    for entry in entries {
        let Some(name) = entry.key.strip_prefix(&prefix) else {
            continue;
        };
        if name.is_empty() || name.contains('/') {
            continue;
        }
        let value = match entry.value.map(|encoded| STANDARD.decode(encoded.as_bytes())) {
            Some(Ok(raw)) => parse_value(&raw),
            Some(Err(e)) => {
                tracing::warn!("undecodable KV value for {}: {e}", entry.key);
                Value::Null
            }
            None => Value::Null,
        };
        out.insert(name.to_string(), value);
    }
    out
}
