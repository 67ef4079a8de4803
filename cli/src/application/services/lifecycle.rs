//! Application service — per-application lifecycle transition.
//!
//! Drives one application from whatever is running to its active version:
//! stop → configure → relink → start. The first failing step ends the
//! sequence for that application and nothing is rolled back.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;
use std::process::Output;

use crate::application::ports::{CommandRunner, EventLog, LocalFs};
use crate::domain::config::SetliveConfig;
use crate::domain::descriptor::ServiceDescriptor;
use crate::domain::error::TransitionError;
use crate::domain::intent::IntentApp;
use crate::domain::lifecycle::{LifecycleState, Outcome, SkipReason, Stage};

/// Executes lifecycle transitions against the supervisor, the descriptor
/// generator and the app's basedir.
pub struct Lifecycle<'a, R, F, L> {
    config: &'a SetliveConfig,
    runner: &'a R,
    fs: &'a F,
    log: &'a L,
}

impl<'a, R, F, L> Lifecycle<'a, R, F, L>
where
    R: CommandRunner,
    F: LocalFs,
    L: EventLog,
{
    #[must_use]
    pub fn new(config: &'a SetliveConfig, runner: &'a R, fs: &'a F, log: &'a L) -> Self {
        Self {
            config,
            runner,
            fs,
            log,
        }
    }

    /// Bring `app` to its active version.
    ///
    /// Never returns an error: failures are logged and reported in the
    /// returned [`Outcome`] so the caller can move on to the next app.
    pub async fn set_live(&self, app: &IntentApp) -> Outcome {
        let Some(version) = app.active_version() else {
            // The running service is left alone; nothing decides it should stop.
            self.log.info(&format!("{}: No active version, skipping", app.name));
            return Outcome::Skipped(SkipReason::NoActiveVersion);
        };

        let active: Vec<&str> = app.active_versions().collect();
        if active.len() > 1 {
            self.log.error(&format!(
                "{}: {} versions marked active ({}), using {version}",
                app.name,
                active.len(),
                active.join(", ")
            ));
        }

        let install = app.install_dir(version);
        if !self.fs.exists(&install) {
            self.log.info(&format!("{}: {version} not prepared, skipping", app.name));
            return Outcome::Skipped(SkipReason::NotPrepared {
                version: version.to_string(),
                install,
            });
        }

        match self.transition(app, &install).await {
            Ok(()) => {
                self.log.info(&format!("{}: {} at {version}", app.name, LifecycleState::Live));
                Outcome::Live {
                    version: version.to_string(),
                }
            }
            Err((stage, error)) => {
                self.log.error(&error.to_string());
                Outcome::Failed { stage, error }
            }
        }
    }

    async fn transition(
        &self,
        app: &IntentApp,
        install: &Path,
    ) -> Result<(), (Stage, TransitionError)> {
        // No cross-node lease is held while the service is down.
        self.enter(app, Stage::Stopping);
        self.stop(app).await.map_err(|e| (Stage::Stopping, e))?;

        self.enter(app, Stage::Configuring);
        self.configure(app).await.map_err(|e| (Stage::Configuring, e))?;

        self.enter(app, Stage::Relinking);
        self.relink(app, install).map_err(|e| (Stage::Relinking, e))?;

        self.enter(app, Stage::Starting);
        self.start(app).await.map_err(|e| (Stage::Starting, e))
    }

    fn enter(&self, app: &IntentApp, stage: Stage) {
        let msg = match stage {
            Stage::Stopping => "Stopping",
            Stage::Configuring => "Configuring service builder",
            Stage::Relinking => "Symlinking",
            Stage::Starting => "Starting",
        };
        self.log.info(&format!("{}: {msg}", app.name));
    }

    async fn stop(&self, app: &IntentApp) -> Result<(), TransitionError> {
        self.supervise("stop", app)
            .await
            .map_err(|reason| TransitionError::Stop {
                app: app.name.clone(),
                reason,
            })
    }

    async fn start(&self, app: &IntentApp) -> Result<(), TransitionError> {
        self.supervise("start", app)
            .await
            .map_err(|reason| TransitionError::Start {
                app: app.name.clone(),
                reason,
            })
    }

    async fn supervise(&self, action: &str, app: &IntentApp) -> Result<(), String> {
        let service = self.config.service_path(&app.name);
        let service = service.to_string_lossy();
        self.run_checked(&self.config.supervisor, &[action, &service]).await
    }

    /// Rewrite the app's descriptor and regenerate supervisor definitions.
    async fn configure(&self, app: &IntentApp) -> Result<(), TransitionError> {
        let fail = |reason: String| TransitionError::Configure {
            app: app.name.clone(),
            reason,
        };

        let descriptor = ServiceDescriptor::for_app(app);
        let yaml = descriptor.to_yaml().map_err(|e| fail(format!("{e:#}")))?;
        self.fs
            .write(&descriptor.file_path(&self.config.descriptor_dir), &yaml)
            .map_err(|e| fail(format!("{e:#}")))?;

        let descriptor_dir = self.config.descriptor_dir.to_string_lossy();
        let service_dir = self.config.service_dir.to_string_lossy();
        let staging_dir = self.config.staging_dir.to_string_lossy();
        self.run_checked(
            &self.config.servicebuilder,
            &["-c", &descriptor_dir, "-d", &service_dir, "-s", &staging_dir],
        )
        .await
        .map_err(fail)
    }

    /// Point `<basedir>/current` at `install`: remove, then create.
    fn relink(&self, app: &IntentApp, install: &Path) -> Result<(), TransitionError> {
        let current = app.current_link();
        self.fs
            .remove_file(&current)
            .map_err(|e| TransitionError::RemoveLink {
                app: app.name.clone(),
                reason: format!("{e:#}"),
            })?;
        self.fs
            .symlink(install, &current)
            .map_err(|e| TransitionError::CreateLink {
                app: app.name.clone(),
                reason: format!("{e:#}"),
            })
    }

    async fn run_checked(&self, program: &str, args: &[&str]) -> Result<(), String> {
        let output = self
            .runner
            .run(program, args)
            .await
            .map_err(|e| format!("{e:#}"))?;
        check_status(program, &output)
    }
}

/// Map a finished process to `Ok` on success or a readable failure reason.
fn check_status(program: &str, output: &Output) -> Result<(), String> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        Err(format!("{program} exited with {}", output.status))
    } else {
        Err(format!("{program} exited with {}: {stderr}", output.status))
    }
}
