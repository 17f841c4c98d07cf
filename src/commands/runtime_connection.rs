// ABOUTME: Shared helper for connecting to the local container runtime.
// ABOUTME: Detects the engine socket, connects, and checks the engine answers.

use dockhand::config::Config;
use dockhand::error::Result;
use dockhand::output::Output;
use dockhand::runtime::{BollardRuntime, PingOps, RuntimeError, detect_local};

/// Connect to the container runtime on this machine.
///
/// This handles the common pattern of:
/// 1. Detecting the runtime type and socket path
/// 2. Outputting progress messages
/// 3. Establishing the connection and pinging the engine
pub async fn connect_to_runtime(config: &Config, output: &Output) -> Result<BollardRuntime> {
    let runtime_info = detect_local(config.runtime.as_ref()).map_err(RuntimeError::from)?;

    output.progress(&format!(
        "  → Using {} at {}",
        runtime_info.runtime_type, runtime_info.socket_path
    ));

    let insecure_registries = config
        .runtime
        .as_ref()
        .is_some_and(|r| r.insecure_registries);
    let runtime = BollardRuntime::connect(&runtime_info)
        .map_err(RuntimeError::from)?
        .with_insecure_registries(insecure_registries);
    runtime.ping().await.map_err(RuntimeError::from)?;

    Ok(runtime)
}
