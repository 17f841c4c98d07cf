// ABOUTME: The fully resolved description of the container to run.
// ABOUTME: Built fresh per invocation from configuration plus live secret lookups.

use super::error::LifecycleError;
use crate::config::{Config, resolve_env_map};
use crate::runtime::{
    ContainerConfig, ExtraHost, PortMapping, RegistryAuth, RestartPolicyConfig, VolumeMount,
};
use crate::secrets::SecretSource;
use crate::types::{ContainerName, ImageRef};
use std::collections::HashMap;
use std::time::Duration;

/// Label marking containers this tool created.
pub const MANAGED_LABEL: &str = "dockhand.managed";
/// Label carrying the managed name.
pub const NAME_LABEL: &str = "dockhand.name";

#[derive(Debug, Clone)]
pub struct ContainerSpec {
    pub name: ContainerName,
    pub image: ImageRef,
    pub ports: Vec<PortMapping>,
    pub env: HashMap<String, String>,
    pub mounts: Vec<VolumeMount>,
    pub restart_policy: RestartPolicyConfig,
    pub extra_hosts: Vec<ExtraHost>,
    pub labels: HashMap<String, String>,
    pub command: Option<Vec<String>>,
    pub stop_timeout: Option<Duration>,
    pub registry_auth: Option<RegistryAuth>,
}

impl ContainerSpec {
    /// A spec with nothing but a name and image; everything else at defaults.
    pub fn new(name: ContainerName, image: ImageRef) -> Self {
        Self {
            name,
            image,
            ports: Vec::new(),
            env: HashMap::new(),
            mounts: Vec::new(),
            restart_policy: RestartPolicyConfig::default(),
            extra_hosts: Vec::new(),
            labels: HashMap::new(),
            command: None,
            stop_timeout: None,
            registry_auth: None,
        }
    }

    /// Resolve every environment value and credential in `config`.
    ///
    /// Any secret lookup failure aborts the whole resolution, so a partially
    /// configured container is never started.
    pub async fn resolve(
        config: &Config,
        secrets: &dyn SecretSource,
    ) -> Result<Self, LifecycleError> {
        let env = resolve_env_map(&config.env, secrets).await?;
        let registry_auth = Self::resolve_registry_auth(config, secrets).await?;

        tracing::debug!(
            name = %config.name,
            vars = env.len(),
            secrets = config.env.values().filter(|v| v.is_secret()).count(),
            "resolved container spec"
        );

        let mounts = config
            .volume_mounts()
            .map_err(|e| LifecycleError::InvalidSpec(e.to_string()))?;

        Ok(Self {
            name: config.name.clone(),
            image: config.image.clone(),
            ports: config.ports.clone(),
            env,
            mounts,
            restart_policy: (&config.restart).into(),
            extra_hosts: config.extra_hosts.clone(),
            labels: config.labels.clone(),
            command: config.command.clone(),
            stop_timeout: config.stop.timeout,
            registry_auth,
        })
    }

    /// Resolve only the registry credentials, leaving container env untouched.
    pub async fn resolve_registry_auth(
        config: &Config,
        secrets: &dyn SecretSource,
    ) -> Result<Option<RegistryAuth>, LifecycleError> {
        let Some(auth) = &config.registry_auth else {
            return Ok(None);
        };
        Ok(Some(RegistryAuth {
            username: auth.username.clone(),
            password: auth
                .password
                .resolve("registry_auth.password", secrets)
                .await?,
            server: auth.server.clone(),
        }))
    }

    /// The engine-level configuration, including the management labels.
    pub fn container_config(&self) -> ContainerConfig {
        let mut labels = self.labels.clone();
        labels.insert(MANAGED_LABEL.to_string(), "true".to_string());
        labels.insert(NAME_LABEL.to_string(), self.name.to_string());

        ContainerConfig {
            name: self.name.clone(),
            image: self.image.clone(),
            env: self.env.clone(),
            labels,
            ports: self.ports.clone(),
            volumes: self.mounts.clone(),
            extra_hosts: self.extra_hosts.clone(),
            command: self.command.clone(),
            restart_policy: self.restart_policy.clone(),
            stop_timeout: self.stop_timeout,
        }
    }
}
