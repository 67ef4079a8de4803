//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::cli`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Intent errors ─────────────────────────────────────────────────────────────

/// A per-application KV record that failed decoding or validation.
///
/// Never fatal to a run: the owning application is excluded from the
/// intent and the remaining applications are still processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    #[error("{key}: not a string map")]
    NotStringMap { key: String },

    #[error("{key}: value of '{field}' is not a string")]
    NonStringValue { key: String, field: String },

    #[error("{key}: no such key")]
    Missing { key: String },

    #[error("{key}: could not fetch: {reason}")]
    Fetch { key: String, reason: String },

    #[error("no cluster key in node data for {app}")]
    MissingCluster { app: String },

    #[error("{key}: no basedir")]
    MissingBasedir { key: String },

    #[error("{key}: not allowing relative basedir '{basedir}'")]
    RelativeBasedir { key: String, basedir: String },
}

// ── Transition errors ─────────────────────────────────────────────────────────

/// A lifecycle step that failed part-way through an application's sequence.
///
/// The sequence stops at the failing step. Side effects of earlier steps
/// are left in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("{app}: could not stop: {reason}")]
    Stop { app: String, reason: String },

    #[error("{app}: could not configure servicebuilder: {reason}")]
    Configure { app: String, reason: String },

    #[error("{app}: could not remove current symlink: {reason}")]
    RemoveLink { app: String, reason: String },

    #[error("{app}: could not symlink current: {reason}")]
    CreateLink { app: String, reason: String },

    #[error("{app}: could not start: {reason}")]
    Start { app: String, reason: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be an absolute path, got '{value}'")]
    RelativePath { field: &'static str, value: String },

    #[error("queue_depth must be at least 1")]
    ZeroQueueDepth,

    #[error("{field} must not be empty")]
    EmptyProgram { field: &'static str },
}
