//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: KV access, process
//! execution, filesystem access, host identity and logging.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::cli` are forbidden.

pub mod command_runner;
pub mod config;
pub mod consul;
pub mod fs;
pub mod host;
pub mod log;
