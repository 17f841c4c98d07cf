// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates dockhand.yml template files.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{ContainerName, ImageRef};

use super::{CONFIG_FILENAME, Config};

/// Write a starter `dockhand.yml` into `dir`, returning its path.
pub fn init_config(
    dir: &Path,
    name: Option<&str>,
    image: Option<&str>,
    force: bool,
) -> Result<PathBuf> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template()?;

    if let Some(n) = name {
        config.name = ContainerName::new(n).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    if let Some(i) = image {
        config.image = ImageRef::parse(i).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(config_path)
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"name: {}
image: {}
ports:
  - "9099:9099"
# volumes:
#   - ./data:/app/data
env:
  LOG_LEVEL: info
  # From the invoking shell, with a fallback:
  # HOME_DIR: {{ env: HOME, default: /root }}
  # From the system secret store (keychain on macOS, secret-tool elsewhere):
  # API_KEY: {{ secret: {{ service: my-service, account: api-key }} }}
extra_hosts:
  - host.docker.internal:host-gateway
restart: {}
# stop:
#   timeout: 10s
# shell: /bin/bash
"#,
        config.name, config.image, config.restart,
    )
}
