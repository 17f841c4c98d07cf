// ABOUTME: Log operations trait for container runtimes.
// ABOUTME: Stream container logs with tail, follow, and timestamp options.

use super::sealed::Sealed;
use crate::types::ContainerName;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of log lines.
pub type LogStreamBox = Pin<Box<dyn Stream<Item = Result<LogLine, LogError>> + Send>>;

/// Log streaming operations.
#[async_trait]
pub trait LogOps: Sealed + Send + Sync {
    /// Stream logs from a container.
    async fn container_logs(
        &self,
        container: &ContainerName,
        opts: &LogOptions,
    ) -> Result<LogStreamBox, LogError>;
}

/// Options for log streaming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Include stdout.
    pub stdout: bool,
    /// Include stderr.
    pub stderr: bool,
    /// Follow log output (like `tail -f`).
    pub follow: bool,
    /// Prefix each line with the engine's timestamp.
    pub timestamps: bool,
    /// Number of lines to show from the end (`None` = all).
    pub tail: Option<u64>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            stdout: true,
            stderr: true,
            follow: false,
            timestamps: false,
            tail: None,
        }
    }
}

impl LogOptions {
    /// Create options for following all logs.
    pub fn follow_all() -> Self {
        Self {
            follow: true,
            timestamps: true,
            ..Self::default()
        }
    }

    /// Create options for tailing the last N lines.
    pub fn tail(n: u64) -> Self {
        Self {
            tail: Some(n),
            ..Self::default()
        }
    }
}

/// A single chunk of log output from a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// The log content, including its trailing newline if the engine sent one.
    pub content: String,
    /// Whether this is from stdout or stderr.
    pub stream: LogStream,
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

/// Errors from log operations.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("container not found: {0}")]
    ContainerNotFound(String),

    #[error("stream error: {0}")]
    StreamError(String),

    #[error("runtime unreachable: {0}")]
    Unavailable(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
