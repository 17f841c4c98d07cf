// ABOUTME: Composable capability traits for container runtimes.
// ABOUTME: Defines ContainerOps, ImageOps, ExecOps, LogOps, PruneOps, PingOps.

mod container;
mod exec;
mod image;
mod logs;
mod ping;
mod prune;
pub(crate) mod sealed;
mod shared_types;

pub use container::{ContainerError, ContainerOps};
pub use exec::{ExecError, ExecOps};
pub use image::{ImageError, ImageOps};
pub use logs::{LogError, LogLine, LogOps, LogOptions, LogStream, LogStreamBox};
pub use ping::{PingOps, RuntimeInfoError};
pub use prune::{PruneError, PruneOps, PruneSummary};
pub use shared_types::*;

/// Every capability the lifecycle controller needs from an engine.
///
/// Blanket-implemented, so any type implementing all capability traits
/// qualifies automatically.
pub trait FullRuntime: ContainerOps + ImageOps + ExecOps + LogOps + PruneOps + PingOps {}

impl<T> FullRuntime for T where
    T: ContainerOps + ImageOps + ExecOps + LogOps + PruneOps + PingOps
{
}
