// ABOUTME: Lifecycle controller for a single named container.
// ABOUTME: Re-queries the engine before every decision and issues the minimal call sequence.

use super::error::LifecycleError;
use super::spec::ContainerSpec;
use super::status::ContainerStatus;
use crate::diagnostics::{Diagnostics, Warning};
use crate::runtime::{
    ContainerError, ExecConfig, ExecResult, FullRuntime, ImageError, LogOptions, LogStreamBox,
    PruneError, PruneSummary, RegistryAuth,
};
use crate::types::{ContainerId, ContainerName, ImageRef};
use serde::Serialize;
use std::time::Duration;

/// What `stop` had to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopOutcome {
    /// No container held the name; nothing was touched.
    Absent,
    /// The container existed but was not running, and was removed.
    Removed,
    /// The container was running, and was stopped then removed.
    StoppedAndRemoved,
}

/// Totals from a garbage-collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PruneReport {
    pub containers_deleted: usize,
    pub images_deleted: usize,
    pub volumes_deleted: usize,
    pub space_reclaimed: u64,
    /// Steps that failed and were reported as warnings.
    pub failed_steps: usize,
}

/// Drives one container engine towards a desired state.
///
/// Holds no state of its own: each operation queries the engine first.
pub struct Controller<'a, R: FullRuntime> {
    runtime: &'a R,
    stop_timeout: Option<Duration>,
}

impl<'a, R: FullRuntime> Controller<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self {
            runtime,
            stop_timeout: None,
        }
    }

    /// Grace period used by [`Controller::stop`]; `None` leaves it to the engine.
    pub fn with_stop_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stop_timeout = timeout;
        self
    }

    /// Replace whatever holds `spec.name` with a fresh container from `spec`.
    pub async fn start(&self, spec: &ContainerSpec) -> Result<ContainerId, LifecycleError> {
        self.stop_with(&spec.name, spec.stop_timeout.or(self.stop_timeout))
            .await?;

        let config = spec.container_config();
        tracing::debug!(name = %spec.name, image = %spec.image, "creating container");

        let id = match self.runtime.create_container(&config).await {
            Ok(id) => id,
            Err(ContainerError::ImageNotFound(_)) => {
                tracing::info!(image = %spec.image, "image not present locally, pulling");
                self.pull_missing(&spec.image, spec.registry_auth.as_ref())
                    .await?;
                self.runtime.create_container(&config).await?
            }
            Err(e) => return Err(e.into()),
        };

        if let Err(e) = self.runtime.start_container(&id).await {
            // Leave the name free rather than holding it with a dead container.
            if let Err(cleanup) = self.runtime.remove_container(&id, true).await {
                tracing::warn!(id = %id.short(), "failed to remove container after start failure: {cleanup}");
            }
            return Err(e.into());
        }

        tracing::info!(name = %spec.name, id = %id.short(), "container started");
        Ok(id)
    }

    /// Make sure no container holds `name`. Succeeds when there was none.
    pub async fn stop(&self, name: &ContainerName) -> Result<StopOutcome, LifecycleError> {
        self.stop_with(name, self.stop_timeout).await
    }

    async fn stop_with(
        &self,
        name: &ContainerName,
        timeout: Option<Duration>,
    ) -> Result<StopOutcome, LifecycleError> {
        let Some(info) = self.runtime.find_container(name).await? else {
            tracing::debug!(name = %name, "no container to stop");
            return Ok(StopOutcome::Absent);
        };

        let outcome = if info.state.is_running() {
            tracing::debug!(name = %name, id = %info.id.short(), "stopping container");
            match self.runtime.stop_container(&info.id, timeout).await {
                Ok(()) | Err(ContainerError::NotRunning(_)) => {}
                Err(ContainerError::NotFound(_)) => return Ok(StopOutcome::Absent),
                Err(e) => return Err(e.into()),
            }
            StopOutcome::StoppedAndRemoved
        } else {
            StopOutcome::Removed
        };

        tracing::debug!(name = %name, id = %info.id.short(), "removing container");
        match self.runtime.remove_container(&info.id, true).await {
            Ok(()) | Err(ContainerError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        tracing::info!(name = %name, ?outcome, "container removed");
        Ok(outcome)
    }

    /// Snapshot of the container holding `name`. Never mutates.
    pub async fn status(&self, name: &ContainerName) -> Result<ContainerStatus, LifecycleError> {
        let status = match self.runtime.find_container(name).await? {
            Some(info) => ContainerStatus::from_info(name, info),
            None => ContainerStatus::absent(name),
        };
        Ok(status)
    }

    /// Stop, then start. Not atomic: a failed start leaves the name absent.
    pub async fn restart(&self, spec: &ContainerSpec) -> Result<ContainerId, LifecycleError> {
        self.stop_with(&spec.name, spec.stop_timeout.or(self.stop_timeout))
            .await?;
        self.start(spec).await
    }

    /// Refresh the local copy of `image` from its registry.
    pub async fn pull_latest(
        &self,
        image: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), LifecycleError> {
        tracing::info!(image = %image, "pulling image");
        self.runtime
            .pull_image(image, auth)
            .await
            .map_err(|source| match source {
                ImageError::Unavailable(msg) => LifecycleError::RuntimeUnavailable(msg),
                source => LifecycleError::ImagePullFailed {
                    image: image.to_string(),
                    source,
                },
            })
    }

    /// Pull the image, then restart on it. A failed pull touches no container.
    pub async fn update(&self, spec: &ContainerSpec) -> Result<ContainerId, LifecycleError> {
        self.pull_latest(&spec.image, spec.registry_auth.as_ref())
            .await?;
        self.restart(spec).await
    }

    /// Garbage-collect unused containers, images and volumes.
    ///
    /// Every step runs even if an earlier one failed. Failures become warnings,
    /// unless all three failed because the engine was unreachable.
    pub async fn prune(&self, diag: &mut Diagnostics) -> Result<PruneReport, LifecycleError> {
        let containers = self.runtime.prune_containers().await;
        let images = self.runtime.prune_images().await;
        let volumes = self.runtime.prune_volumes().await;

        if let (
            Err(PruneError::Unavailable(msg)),
            Err(PruneError::Unavailable(_)),
            Err(PruneError::Unavailable(_)),
        ) = (&containers, &images, &volumes)
        {
            return Err(LifecycleError::RuntimeUnavailable(msg.clone()));
        }

        let mut report = PruneReport::default();
        let mut record = |step: &str, result: Result<PruneSummary, PruneError>| match result {
            Ok(summary) => {
                tracing::debug!(step, deleted = summary.deleted.len(), "prune step done");
                report.space_reclaimed += summary.space_reclaimed;
                summary.deleted.len()
            }
            Err(e) => {
                report.failed_steps += 1;
                diag.warn(Warning::prune(format!("{step} prune failed: {e}")));
                0
            }
        };

        let containers_deleted = record("container", containers);
        let images_deleted = record("image", images);
        let volumes_deleted = record("volume", volumes);
        report.containers_deleted = containers_deleted;
        report.images_deleted = images_deleted;
        report.volumes_deleted = volumes_deleted;

        tracing::info!(
            containers = report.containers_deleted,
            images = report.images_deleted,
            volumes = report.volumes_deleted,
            bytes = report.space_reclaimed,
            "prune finished"
        );
        Ok(report)
    }

    /// Stop and remove the container, then garbage-collect the engine.
    ///
    /// Best-effort: a failed stop becomes a warning and pruning still runs.
    /// The outcome is `None` when the stop failed.
    pub async fn clean(
        &self,
        name: &ContainerName,
        diag: &mut Diagnostics,
    ) -> Result<(Option<StopOutcome>, PruneReport), LifecycleError> {
        let outcome = match self.stop(name).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                diag.warn(Warning::stop(format!("could not remove {name}: {e}")));
                None
            }
        };
        let report = self.prune(diag).await?;
        Ok((outcome, report))
    }

    /// Open an interactive `shell` session; returns its exit code.
    pub async fn exec_shell(&self, name: &ContainerName, shell: &str) -> Result<i64, LifecycleError> {
        self.require_running(name).await?;
        tracing::debug!(name = %name, shell, "opening interactive session");
        let code = self
            .runtime
            .exec_interactive(name, &[shell.to_string()])
            .await?;
        Ok(code)
    }

    /// Run `cmd` to completion inside the running container.
    pub async fn exec(
        &self,
        name: &ContainerName,
        cmd: &[String],
    ) -> Result<ExecResult, LifecycleError> {
        self.require_running(name).await?;
        tracing::debug!(name = %name, ?cmd, "running command");
        let result = self.runtime.exec(name, &ExecConfig::command(cmd)).await?;
        Ok(result)
    }

    /// Stream the engine's logs for `name`.
    pub async fn logs(
        &self,
        name: &ContainerName,
        opts: &LogOptions,
    ) -> Result<LogStreamBox, LifecycleError> {
        if self.runtime.find_container(name).await?.is_none() {
            return Err(LifecycleError::NotFound(name.to_string()));
        }
        let stream = self.runtime.container_logs(name, opts).await?;
        Ok(stream)
    }

    async fn require_running(&self, name: &ContainerName) -> Result<(), LifecycleError> {
        let status = self.status(name).await?;
        if !status.is_running() {
            return Err(LifecycleError::NotRunning(name.to_string()));
        }
        Ok(())
    }

    /// Pull an image that create reported missing. Any failure means the
    /// container cannot be started.
    async fn pull_missing(
        &self,
        image: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), LifecycleError> {
        match self.runtime.pull_image(image, auth).await {
            Ok(()) => Ok(()),
            Err(ImageError::Unavailable(msg)) => Err(LifecycleError::RuntimeUnavailable(msg)),
            Err(e) => Err(LifecycleError::ImagePullRequired {
                image: image.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
