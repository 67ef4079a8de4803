//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::cli`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod intent;
pub mod lifecycle;

pub use config::SetliveConfig;
pub use descriptor::ServiceDescriptor;
pub use error::{ConfigError, IntentError, TransitionError};
pub use intent::{DeployConfig, IntentApp, IntentNode, NodeRecord};
pub use lifecycle::{LifecycleState, Outcome, RunSummary, SkipReason, Stage};
