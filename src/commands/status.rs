// ABOUTME: Status command implementation.
// ABOUTME: Prints a live snapshot of the managed container.

use super::runtime_connection::connect_to_runtime;
use dockhand::config::Config;
use dockhand::error::Result;
use dockhand::lifecycle::Controller;
use dockhand::output::Output;

/// Show the container's current state. Succeeds whatever the state is.
pub async fn status(config: Config, output: Output) -> Result<()> {
    let runtime = connect_to_runtime(&config, &output).await?;
    let controller = Controller::new(&runtime);

    let status = controller.status(&config.name).await?;
    output.report(&status.to_string(), &status);
    Ok(())
}
