//! Infrastructure implementation of the `HostIdentity` port.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, HostIdentity};

/// Kernel copy of the host name, read when `hostname` cannot be run.
pub const KERNEL_HOSTNAME: &str = "/proc/sys/kernel/hostname";

/// Resolves the host name, preferring a configured override, then the
/// `hostname` program, then the kernel's record.
pub struct SystemHost<'a, R> {
    runner: &'a R,
    override_name: Option<String>,
    fallback: PathBuf,
}

impl<'a, R: CommandRunner> SystemHost<'a, R> {
    #[must_use]
    pub fn new(runner: &'a R, override_name: Option<String>) -> Self {
        Self {
            runner,
            override_name,
            fallback: PathBuf::from(KERNEL_HOSTNAME),
        }
    }

    /// Read the fallback host name from `path` instead of [`KERNEL_HOSTNAME`].
    #[must_use]
    pub fn with_fallback(mut self, path: impl Into<PathBuf>) -> Self {
        self.fallback = path.into();
        self
    }
}

impl<R: CommandRunner> HostIdentity for SystemHost<'_, R> {
    async fn hostname(&self) -> Result<String> {
        if let Some(name) = self.override_name.as_deref().map(str::trim) {
            anyhow::ensure!(!name.is_empty(), "configured hostname is empty");
            return Ok(name.to_string());
        }
        let output = match self.runner.run("hostname", &[]).await {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(
                    "hostname unavailable ({e:#}), reading {}",
                    self.fallback.display()
                );
                return read_fallback(&self.fallback);
            }
        };
        anyhow::ensure!(
            output.status.success(),
            "hostname exited with {}",
            output.status
        );
        let name = String::from_utf8(output.stdout).context("hostname is not valid UTF-8")?;
        non_empty(&name, "hostname")
    }
}

fn read_fallback(path: &Path) -> Result<String> {
    let name = std::fs::read_to_string(path)
        .with_context(|| format!("cannot determine hostname: reading {}", path.display()))?;
    non_empty(&name, &path.display().to_string())
}

fn non_empty(raw: &str, source: &str) -> Result<String> {
    let name = raw.trim();
    anyhow::ensure!(!name.is_empty(), "{source} is empty");
    Ok(name.to_string())
}
