// ABOUTME: Reachability check for a container engine.
// ABOUTME: A cheap round trip used before any lifecycle operation.

use super::sealed::Sealed;
use async_trait::async_trait;

/// Engine reachability.
#[async_trait]
pub trait PingOps: Sealed + Send + Sync {
    /// Round-trip to the engine. Fails when the socket does not answer.
    async fn ping(&self) -> Result<(), RuntimeInfoError>;
}

/// The engine could not be reached, or answered with an error.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeInfoError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
