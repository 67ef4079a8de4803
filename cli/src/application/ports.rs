//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`
//! or `crate::cli`.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Output;

use anyhow::Result;
use serde_json::Value;

// ── KV Store Port ─────────────────────────────────────────────────────────────

/// Read access to the hierarchical intent store.
///
/// Values are opaque trees; shaping them into typed intent is the decoder's job.
#[allow(async_fn_in_trait)]
pub trait KvStore {
    /// Fetch a single key. Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Value>>;
    /// List the direct children of `prefix`, keyed by their last path segment.
    async fn list(&self, prefix: &str) -> Result<BTreeMap<String, Value>>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program to completion and capture its output.
    ///
    /// A non-zero exit is reported through `Output::status`, not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or waited on.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Filesystem Port ───────────────────────────────────────────────────────────

/// The filesystem operations the lifecycle needs.
pub trait LocalFs {
    /// `true` if something exists at `path` (following symlinks).
    fn exists(&self, path: &Path) -> bool;
    /// Create or truncate `path` with `content`.
    fn write(&self, path: &Path, content: &str) -> Result<()>;
    /// Remove a file or symlink. Fails if nothing is there.
    fn remove_file(&self, path: &Path) -> Result<()>;
    /// Create `link` pointing at `target`.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;
}

// ── Logging Port ──────────────────────────────────────────────────────────────

/// Abstracts logging so services never depend on a concrete logger.
/// Sync trait — no async needed.
pub trait EventLog {
    /// Routine progress.
    fn info(&self, message: &str);
    /// A failure confined to one application.
    fn error(&self, message: &str);
    /// The run cannot continue.
    fn fatal(&self, message: &str);
}

// ── Host Identity Port ────────────────────────────────────────────────────────

/// Resolves the identifier this host is registered under in the KV store.
#[allow(async_fn_in_trait)]
pub trait HostIdentity {
    async fn hostname(&self) -> Result<String>;
}
