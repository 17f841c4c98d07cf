// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands, their arguments, and the global flags.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dockhand")]
#[command(about = "Lifecycle manager for a single named container on Docker or Podman")]
#[command(version)]
pub struct Cli {
    /// Path to the config file (default: discover dockhand.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the container name
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Override the image
    #[arg(long, global = true)]
    pub image: Option<String>,

    /// Override the host port of the first port mapping
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log filter, e.g. "info" or "dockhand=debug" (overrides --verbose)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Only print final results
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a dockhand.yml template (uses --name and --image when given)
    Init {
        /// Overwrite an existing dockhand.yml
        #[arg(long)]
        force: bool,
    },

    /// Replace any existing container with a fresh one
    #[command(alias = "start")]
    Run,

    /// Stop and remove the container (succeeds if there is none)
    Stop,

    /// Stop, then start
    Restart,

    /// Show the container's current state
    Status,

    /// Print the container's logs
    Logs {
        /// Number of lines to show from the end
        #[arg(short = 'n', long)]
        tail: Option<u64>,

        /// Keep streaming new output
        #[arg(short, long)]
        follow: bool,

        /// Show engine timestamps
        #[arg(short, long)]
        timestamps: bool,
    },

    /// Remove the container and prune unused containers, images, and volumes
    Clean,

    /// Pull the latest version of the image
    Pull,

    /// Pull the latest image, then restart on it
    Update,

    /// Open a shell in the running container, or run a command with `-- CMD`
    Shell {
        /// Shell to start (default: from config, else /bin/sh)
        #[arg(long)]
        shell: Option<String>,

        /// Command to run instead of an interactive shell
        #[arg(last = true)]
        command: Vec<String>,
    },
}
