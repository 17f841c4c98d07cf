// ABOUTME: Container engine access: capability traits and their implementations.
// ABOUTME: Local Docker/Podman detection, a bollard client, and a test-only in-memory fake.

mod bollard;
mod detection;
mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod fake;
pub mod traits;
mod types;

pub use self::bollard::BollardRuntime;
pub use detection::{DetectionError, detect_local};
pub use error::{RuntimeError, RuntimeErrorKind};
pub use traits::{
    ContainerConfig, ContainerError, ContainerInfo, ContainerOps, ContainerState, ExecConfig,
    ExecError, ExecOps, ExecResult, ExtraHost, FullRuntime, HealthState, ImageError, ImageOps,
    LogError, LogLine, LogOps, LogOptions, LogStream, LogStreamBox, PingOps, PortMapping,
    Protocol, PruneError, PruneOps, PruneSummary, RegistryAuth, RestartPolicyConfig,
    RuntimeInfoError, VolumeMount,
};
pub use types::{RuntimeConfig, RuntimeInfo, RuntimeType};
