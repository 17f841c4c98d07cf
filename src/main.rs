// ABOUTME: Entry point for the dockhand CLI application.
// ABOUTME: Parses arguments, sets up logging, and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use dockhand::config::{self, Config, Overrides};
use dockhand::error::Result;
use dockhand::output::{Output, OutputMode};
use dockhand::runtime::LogOptions;
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // --log-level wins over --verbose; both fall back to warnings only
    let filter = match cli.log_level.as_deref() {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|e| {
            eprintln!("Warning: invalid --log-level '{level}': {e}");
            EnvFilter::new("warn")
        }),
        None if cli.verbose => EnvFilter::new("debug"),
        None => EnvFilter::new("warn"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };

    match run(cli, Output::new(mode)).await {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            Output::new(mode).error(&e.to_string());
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli, output: Output) -> Result<i32> {
    let overrides = Overrides {
        name: cli.name,
        image: cli.image,
        port: cli.port,
    };
    let load = || load_config(cli.config.as_deref(), &overrides);

    match cli.command {
        Commands::Init { force } => {
            let cwd = env::current_dir()?;
            let path = config::init_config(
                &cwd,
                overrides.name.as_deref(),
                overrides.image.as_deref(),
                force,
            )?;
            output.success(&format!("✓ Wrote {}", path.display()));
        }
        Commands::Run => commands::start(load()?, output).await?,
        Commands::Stop => commands::stop(load()?, output).await?,
        Commands::Restart => commands::restart(load()?, output).await?,
        Commands::Status => commands::status(load()?, output).await?,
        Commands::Logs {
            tail,
            follow,
            timestamps,
        } => {
            let opts = LogOptions {
                tail,
                follow,
                timestamps,
                ..LogOptions::default()
            };
            commands::logs(load()?, opts, output).await?
        }
        Commands::Clean => commands::clean(load()?, output).await?,
        Commands::Pull => commands::pull(load()?, output).await?,
        Commands::Update => commands::update(load()?, output).await?,
        Commands::Shell { shell, command } => {
            return commands::shell(load()?, shell, command, output).await;
        }
    }

    Ok(0)
}

/// Load the config file and apply command-line overrides.
fn load_config(path: Option<&Path>, overrides: &Overrides) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::discover(&env::current_dir()?)?,
    };
    config.apply_overrides(overrides)?;
    Ok(config)
}
