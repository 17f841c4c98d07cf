// ABOUTME: Command module aggregator for the dockhand CLI.
// ABOUTME: Re-exports lifecycle, status, logs, clean, and shell command handlers.

mod clean;
mod lifecycle;
mod logs;
mod runtime_connection;
mod shell;
mod status;

pub use clean::clean;
pub use lifecycle::{pull, restart, start, stop, update};
pub use logs::logs;
pub use shell::shell;
pub use status::status;

use dockhand::config::Config;
use dockhand::error::Result;
use dockhand::lifecycle::ContainerSpec;
use dockhand::output::Output;
use dockhand::runtime::RegistryAuth;
use dockhand::secrets::CommandSecretSource;

/// Resolve env values and credentials. Runs before any engine call.
async fn resolve_spec(config: &Config, output: &Output) -> Result<ContainerSpec> {
    if config.env.values().any(|v| v.is_secret()) {
        output.progress(&format!(
            "  → Reading secrets from {}...",
            config.secrets.provider
        ));
    }
    let secrets = CommandSecretSource::new(config.secrets.provider);
    Ok(ContainerSpec::resolve(config, &secrets).await?)
}

/// Resolve registry credentials only; a pull never needs container env.
async fn resolve_registry_auth(config: &Config, output: &Output) -> Result<Option<RegistryAuth>> {
    if config
        .registry_auth
        .as_ref()
        .is_some_and(|auth| auth.password.is_secret())
    {
        output.progress(&format!(
            "  → Reading registry credentials from {}...",
            config.secrets.provider
        ));
    }
    let secrets = CommandSecretSource::new(config.secrets.provider);
    Ok(ContainerSpec::resolve_registry_auth(config, &secrets).await?)
}
