//! Service descriptors consumed by the external `servicebuilder` tool.
//!
//! One file per application, `<app>.yaml`, of shape
//! `{ <app>: { run: [ <launch path> ] } }`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::intent::IntentApp;

/// Per-service entry inside a descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    pub run: Vec<String>,
}

/// Descriptor for a single supervised application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    pub app_name: String,
    pub run_command: Vec<String>,
}

impl ServiceDescriptor {
    /// Descriptor launching `<basedir>/current/bin/launch`.
    #[must_use]
    pub fn for_app(app: &IntentApp) -> Self {
        Self {
            app_name: app.name.clone(),
            run_command: vec![app.launch_path().to_string_lossy().into_owned()],
        }
    }

    /// `<descriptor_dir>/<app>.yaml`
    #[must_use]
    pub fn file_path(&self, descriptor_dir: &Path) -> PathBuf {
        descriptor_dir.join(format!("{}.yaml", self.app_name))
    }

    /// Serialize to the YAML document `servicebuilder` reads.
    ///
    /// # Errors
    ///
    /// Returns an error if YAML serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        let doc: BTreeMap<&str, ServiceEntry> = BTreeMap::from([(
            self.app_name.as_str(),
            ServiceEntry {
                run: self.run_command.clone(),
            },
        )]);
        serde_yaml::to_string(&doc).context("cannot serialize service descriptor")
    }
}
