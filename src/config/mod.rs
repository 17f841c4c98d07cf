// ABOUTME: Configuration types and parsing for dockhand.yml.
// ABOUTME: Handles YAML parsing, file discovery, and command-line overrides.

mod deserialize;
mod env_value;
mod init;
mod mapping;
mod restart_policy;
mod stop;

pub use env_value::{EnvError, EnvValue, resolve_env_map};
pub use init::init_config;
pub use mapping::{MappingError, parse_extra_host, parse_port_mapping, parse_volume_mount};
pub use restart_policy::RestartPolicy;
pub use stop::StopConfig;

use crate::error::{Error, Result};
use crate::runtime::{ExtraHost, PortMapping, RuntimeConfig, VolumeMount};
use crate::secrets::SecretsConfig;
use crate::types::{ContainerName, ImageRef};
use deserialize::{deserialize_extra_hosts, deserialize_ports};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "dockhand.yml";
pub const CONFIG_FILENAME_ALT: &str = "dockhand.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".dockhand/config.yml";

pub const DEFAULT_SHELL: &str = "/bin/sh";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub name: ContainerName,

    pub image: ImageRef,

    #[serde(default, deserialize_with = "deserialize_ports")]
    pub ports: Vec<PortMapping>,

    #[serde(default)]
    pub volumes: Vec<String>,

    #[serde(default)]
    pub env: HashMap<String, EnvValue>,

    #[serde(default)]
    pub labels: HashMap<String, String>,

    #[serde(default, deserialize_with = "deserialize_extra_hosts")]
    pub extra_hosts: Vec<ExtraHost>,

    #[serde(default)]
    pub command: Option<Vec<String>>,

    #[serde(default)]
    pub restart: RestartPolicy,

    #[serde(default)]
    pub stop: StopConfig,

    #[serde(default)]
    pub secrets: SecretsConfig,

    #[serde(default)]
    pub runtime: Option<RuntimeConfig>,

    #[serde(default)]
    pub shell: Option<String>,

    #[serde(default)]
    pub registry_auth: Option<RegistryAuthConfig>,

    /// Directory relative volume sources resolve against.
    #[serde(skip)]
    base_dir: PathBuf,
}

/// Credentials for pulling from a private registry.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryAuthConfig {
    pub username: String,
    pub password: EnvValue,
    #[serde(default)]
    pub server: Option<String>,
}

/// Values given on the command line that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub name: Option<String>,
    pub image: Option<String>,
    pub port: Option<u16>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(yaml)?;
        config.base_dir = PathBuf::from("/");
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        let absolute = std::path::absolute(path)?;
        config.base_dir = absolute
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/"));
        // `.dockhand/config.yml` describes the directory above it.
        if config.base_dir.ends_with(".dockhand") {
            if let Some(project) = config.base_dir.parent() {
                config.base_dir = project.to_path_buf();
            }
        }

        config.validate()?;
        tracing::debug!(path = %path.display(), name = %config.name, "loaded configuration");
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        self.volume_mounts()?;
        if let Some(shell) = &self.shell {
            if shell.trim().is_empty() {
                return Err(Error::InvalidConfig("shell cannot be empty".to_string()));
            }
        }
        if matches!(&self.command, Some(cmd) if cmd.is_empty()) {
            return Err(Error::InvalidConfig(
                "command cannot be an empty list".to_string(),
            ));
        }
        if let Some(timeout) = self.stop.timeout {
            if i32::try_from(timeout.as_secs()).is_err() {
                return Err(Error::InvalidConfig(format!(
                    "stop.timeout must be at most {} seconds",
                    i32::MAX
                )));
            }
        }
        Ok(())
    }

    /// Bind mounts with host paths made absolute.
    pub fn volume_mounts(&self) -> std::result::Result<Vec<VolumeMount>, MappingError> {
        self.volumes
            .iter()
            .map(|v| parse_volume_mount(v, &self.base_dir))
            .collect()
    }

    /// Shell used for interactive sessions.
    pub fn shell(&self) -> &str {
        self.shell.as_deref().unwrap_or(DEFAULT_SHELL)
    }

    pub fn apply_overrides(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(name) = &overrides.name {
            self.name =
                ContainerName::new(name).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        }

        if let Some(image) = &overrides.image {
            self.image = ImageRef::parse(image).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        }

        if let Some(port) = overrides.port {
            if port == 0 {
                return Err(Error::InvalidConfig("port must be 1-65535".to_string()));
            }
            match self.ports.first_mut() {
                Some(first) => first.host_port = Some(port),
                None => self.ports.push(PortMapping {
                    host_port: Some(port),
                    container_port: port,
                    protocol: Default::default(),
                    host_ip: None,
                }),
            }
        }

        Ok(())
    }

    pub fn template() -> Result<Self> {
        let invalid = |e: &dyn std::fmt::Display| Error::InvalidConfig(e.to_string());
        Ok(Config {
            name: ContainerName::new("pipelines").map_err(|e| invalid(&e))?,
            image: ImageRef::parse("ghcr.io/open-webui/pipelines:main").map_err(|e| invalid(&e))?,
            ports: vec![PortMapping {
                host_port: Some(9099),
                container_port: 9099,
                protocol: Default::default(),
                host_ip: None,
            }],
            volumes: vec![],
            env: HashMap::new(),
            labels: HashMap::new(),
            extra_hosts: vec![ExtraHost {
                hostname: "host.docker.internal".to_string(),
                address: "host-gateway".to_string(),
            }],
            command: None,
            restart: RestartPolicy::Always,
            stop: StopConfig::default(),
            secrets: SecretsConfig::default(),
            runtime: None,
            shell: None,
            registry_auth: None,
            base_dir: PathBuf::from("/"),
        })
    }
}
