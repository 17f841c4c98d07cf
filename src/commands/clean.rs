// ABOUTME: Clean command implementation.
// ABOUTME: Removes the container and prunes unused engine objects, both best-effort.

use super::runtime_connection::connect_to_runtime;
use dockhand::config::Config;
use dockhand::diagnostics::Diagnostics;
use dockhand::error::Result;
use dockhand::lifecycle::Controller;
use dockhand::output::Output;

/// Remove the container and garbage-collect the engine.
pub async fn clean(config: Config, mut output: Output) -> Result<()> {
    output.start_timer();
    let runtime = connect_to_runtime(&config, &output).await?;
    let controller = Controller::new(&runtime).with_stop_timeout(config.stop.timeout);
    let mut diag = Diagnostics::default();

    output.progress(&format!("  → Removing {}...", config.name));
    output.progress("  → Pruning unused containers, images, and volumes...");
    let (outcome, report) = controller.clean(&config.name, &mut diag).await?;

    // Emit collected warnings
    for warning in diag.warnings() {
        output.warning(&warning.message);
    }

    output.report(
        &format!(
            "✓ Cleaned up: {} container(s), {} image(s), {} volume(s), {} reclaimed",
            report.containers_deleted,
            report.images_deleted,
            report.volumes_deleted,
            human_bytes(report.space_reclaimed)
        ),
        &serde_json::json!({ "event": "cleaned", "stop": outcome, "prune": report }),
    );
    Ok(())
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
