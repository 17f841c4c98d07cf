// ABOUTME: Lifecycle management for a single named container.
// ABOUTME: Start, stop, restart, update, status, prune, exec, and logs over any engine.

mod controller;
mod error;
mod spec;
mod status;

pub use controller::{Controller, PruneReport, StopOutcome};
pub use error::{LifecycleError, LifecycleErrorKind};
pub use spec::{ContainerSpec, MANAGED_LABEL, NAME_LABEL};
pub use status::{ContainerStatus, Health, Presence};
