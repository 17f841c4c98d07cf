// ABOUTME: Garbage collection trait for container runtimes.
// ABOUTME: Prunes stopped containers, dangling images, and unused volumes.

use super::sealed::Sealed;
use async_trait::async_trait;

/// Engine-side garbage collection.
#[async_trait]
pub trait PruneOps: Sealed + Send + Sync {
    /// Remove all stopped containers.
    async fn prune_containers(&self) -> Result<PruneSummary, PruneError>;

    /// Remove dangling images.
    async fn prune_images(&self) -> Result<PruneSummary, PruneError>;

    /// Remove volumes not referenced by any container.
    async fn prune_volumes(&self) -> Result<PruneSummary, PruneError>;
}

/// What a single prune call removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneSummary {
    /// Identifiers (or names, for volumes) of removed objects.
    pub deleted: Vec<String>,
    /// Disk space reclaimed in bytes.
    pub space_reclaimed: u64,
}

/// Errors from prune operations.
#[derive(Debug, thiserror::Error)]
pub enum PruneError {
    #[error("a prune operation is already running")]
    AlreadyRunning,

    #[error("runtime unreachable: {0}")]
    Unavailable(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
