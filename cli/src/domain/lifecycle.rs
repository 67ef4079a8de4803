//! Per-application lifecycle states and the outcome of one transition attempt.
//!
//! Pure types only — no I/O, no async.

use std::fmt;
use std::path::PathBuf;

use crate::domain::error::TransitionError;

/// States an application passes through during one reconciliation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Unprepared,
    Stopping,
    Configuring,
    Relinking,
    Starting,
    Live,
    Skipped,
    Failed,
}

impl LifecycleState {
    /// `true` for `Live`, `Skipped` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Live | Self::Skipped | Self::Failed)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unprepared => "unprepared",
            Self::Stopping => "stopping",
            Self::Configuring => "configuring",
            Self::Relinking => "relinking",
            Self::Starting => "starting",
            Self::Live => "live",
            Self::Skipped => "skipped",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// The transition step an application was in when its sequence stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Stopping,
    Configuring,
    Relinking,
    Starting,
}

impl From<Stage> for LifecycleState {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::Stopping => Self::Stopping,
            Stage::Configuring => Self::Configuring,
            Stage::Relinking => Self::Relinking,
            Stage::Starting => Self::Starting,
        }
    }
}

/// Why an application was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No version carries the `"active"` status.
    NoActiveVersion,
    /// The active version has no install directory on disk.
    NotPrepared { version: String, install: PathBuf },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoActiveVersion => f.write_str("no active version"),
            Self::NotPrepared { version, install } => {
                write!(f, "{version} not prepared ({})", install.display())
            }
        }
    }
}

/// Terminal result of one application's lifecycle sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Live { version: String },
    Skipped(SkipReason),
    Failed { stage: Stage, error: TransitionError },
}

impl Outcome {
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        match self {
            Self::Live { .. } => LifecycleState::Live,
            Self::Skipped(_) => LifecycleState::Skipped,
            Self::Failed { .. } => LifecycleState::Failed,
        }
    }

    /// Stage at which the sequence failed, if it did.
    #[must_use]
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Failed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

/// Tally of outcomes over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub live: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome.state() {
            LifecycleState::Live => self.live += 1,
            LifecycleState::Skipped => self.skipped += 1,
            _ => self.failed += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.live + self.skipped + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} live, {} skipped, {} failed",
            self.live, self.skipped, self.failed
        )
    }
}
