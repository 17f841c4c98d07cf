// ABOUTME: Start, stop, restart, pull, and update command implementations.
// ABOUTME: Resolve the container spec, connect to the engine, and run one controller operation.

use super::{resolve_registry_auth, resolve_spec};
use super::runtime_connection::connect_to_runtime;
use dockhand::config::Config;
use dockhand::error::Result;
use dockhand::lifecycle::{Controller, StopOutcome};
use dockhand::output::Output;
use serde::Serialize;

#[derive(Serialize)]
struct Started<'a> {
    event: &'a str,
    name: String,
    id: String,
    image: String,
}

/// Replace any existing container with a fresh one.
pub async fn start(config: Config, mut output: Output) -> Result<()> {
    output.start_timer();
    let spec = resolve_spec(&config, &output).await?;
    let runtime = connect_to_runtime(&config, &output).await?;
    let controller = Controller::new(&runtime).with_stop_timeout(config.stop.timeout);

    output.progress(&format!("  → Starting {} ({})...", spec.name, spec.image));
    let id = controller.start(&spec).await?;

    output.report(
        &format!("✓ Started {} ({})", spec.name, id.short()),
        &Started {
            event: "started",
            name: spec.name.to_string(),
            id: id.to_string(),
            image: spec.image.to_string(),
        },
    );
    Ok(())
}

/// Stop and remove the container, if there is one.
pub async fn stop(config: Config, output: Output) -> Result<()> {
    let runtime = connect_to_runtime(&config, &output).await?;
    let controller = Controller::new(&runtime).with_stop_timeout(config.stop.timeout);

    output.progress(&format!("  → Stopping {}...", config.name));
    let outcome = controller.stop(&config.name).await?;

    let message = match outcome {
        StopOutcome::Absent => format!("✓ {} is not running", config.name),
        StopOutcome::Removed => format!("✓ Removed {}", config.name),
        StopOutcome::StoppedAndRemoved => format!("✓ Stopped {}", config.name),
    };
    output.report(
        &message,
        &serde_json::json!({ "event": "stopped", "name": config.name, "outcome": outcome }),
    );
    Ok(())
}

/// Stop, then start.
pub async fn restart(config: Config, mut output: Output) -> Result<()> {
    output.start_timer();
    let spec = resolve_spec(&config, &output).await?;
    let runtime = connect_to_runtime(&config, &output).await?;
    let controller = Controller::new(&runtime).with_stop_timeout(config.stop.timeout);

    output.progress(&format!("  → Restarting {}...", spec.name));
    let id = controller.restart(&spec).await?;

    output.report(
        &format!("✓ Restarted {} ({})", spec.name, id.short()),
        &Started {
            event: "restarted",
            name: spec.name.to_string(),
            id: id.to_string(),
            image: spec.image.to_string(),
        },
    );
    Ok(())
}

/// Refresh the image from its registry.
pub async fn pull(config: Config, mut output: Output) -> Result<()> {
    output.start_timer();
    let auth = resolve_registry_auth(&config, &output).await?;
    let runtime = connect_to_runtime(&config, &output).await?;
    let controller = Controller::new(&runtime);

    output.progress(&format!("  → Pulling {}...", config.image));
    controller.pull_latest(&config.image, auth.as_ref()).await?;

    output.success(&format!("✓ Pulled {}", config.image));
    Ok(())
}

/// Pull the latest image, then restart on it.
pub async fn update(config: Config, mut output: Output) -> Result<()> {
    output.start_timer();
    let spec = resolve_spec(&config, &output).await?;
    let runtime = connect_to_runtime(&config, &output).await?;
    let controller = Controller::new(&runtime).with_stop_timeout(config.stop.timeout);

    output.progress(&format!("  → Updating {} to latest {}...", spec.name, spec.image));
    let id = controller.update(&spec).await?;

    output.report(
        &format!("✓ Updated {} ({})", spec.name, id.short()),
        &Started {
            event: "updated",
            name: spec.name.to_string(),
            id: id.to_string(),
            image: spec.image.to_string(),
        },
    );
    Ok(())
}
