// ABOUTME: Logs command implementation.
// ABOUTME: Streams the engine's stdout and stderr for the managed container.

use super::runtime_connection::connect_to_runtime;
use dockhand::config::Config;
use dockhand::error::Result;
use dockhand::lifecycle::Controller;
use dockhand::output::Output;
use dockhand::runtime::{LogOptions, LogStream};
use futures::StreamExt;
use std::io::Write;

/// Print logs until the stream ends (or forever, when following).
pub async fn logs(config: Config, opts: LogOptions, output: Output) -> Result<()> {
    let runtime = connect_to_runtime(&config, &output).await?;
    let controller = Controller::new(&runtime);

    let mut stream = controller.logs(&config.name, &opts).await?;

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    while let Some(line) = stream.next().await {
        let line = line.map_err(dockhand::lifecycle::LifecycleError::from)?;
        match line.stream {
            LogStream::Stdout => {
                stdout.write_all(line.content.as_bytes())?;
                stdout.flush()?;
            }
            LogStream::Stderr => stderr.write_all(line.content.as_bytes())?,
        }
    }

    Ok(())
}
