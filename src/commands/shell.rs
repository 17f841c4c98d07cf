// ABOUTME: Shell command implementation.
// ABOUTME: Opens an interactive session, or runs one command, in the running container.

use super::runtime_connection::connect_to_runtime;
use dockhand::config::Config;
use dockhand::error::{Error, Result};
use dockhand::lifecycle::Controller;
use dockhand::output::Output;

/// Run `command` in the container, or an interactive shell when it is empty.
///
/// Returns the exit code of the interactive session.
pub async fn shell(
    config: Config,
    shell: Option<String>,
    command: Vec<String>,
    output: Output,
) -> Result<i32> {
    let runtime = connect_to_runtime(&config, &output).await?;
    let controller = Controller::new(&runtime);

    if command.is_empty() {
        let shell = shell.as_deref().unwrap_or(config.shell());
        let code = controller.exec_shell(&config.name, shell).await?;
        return Ok(i32::try_from(code).unwrap_or(1));
    }

    output.progress(&format!("  → Executing in {}...", config.name));
    let result = controller.exec(&config.name, &command).await?;

    if !result.stdout.is_empty() {
        print!("{}", String::from_utf8_lossy(&result.stdout));
    }
    if !result.stderr.is_empty() {
        eprint!("{}", String::from_utf8_lossy(&result.stderr));
    }

    if result.exit_code != 0 {
        return Err(Error::CommandFailed(result.exit_code));
    }
    Ok(0)
}
