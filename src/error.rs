// ABOUTME: Application-wide error types for dockhand.
// ABOUTME: Uses thiserror for ergonomic error handling and maps errors to exit codes.

use crate::config::MappingError;
use crate::lifecycle::LifecycleError;
use crate::runtime::RuntimeError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0} (use --force to overwrite)")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid configuration: {0}")]
    Mapping(#[from] MappingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// A command run inside the container exited non-zero.
    #[error("command exited with code {0}")]
    CommandFailed(i64),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::AlreadyExists(_)
            | Error::ConfigNotFound(_)
            | Error::InvalidConfig(_)
            | Error::Mapping(_)
            | Error::Yaml(_) => 2,
            Error::Io(_) => 1,
            // Detection and connection failures both mean no usable engine.
            Error::Runtime(_) => 3,
            Error::Lifecycle(e) => e.exit_code(),
            Error::CommandFailed(code) => i32::try_from(*code)
                .ok()
                .filter(|c| (1..=255).contains(c))
                .unwrap_or(1),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
