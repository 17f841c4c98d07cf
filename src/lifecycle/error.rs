// ABOUTME: Error taxonomy for lifecycle operations.
// ABOUTME: Maps engine and secret failures onto the kinds the CLI reports and exits with.

use crate::config::EnvError;
use crate::runtime::{ContainerError, ExecError, ImageError, LogError, RuntimeInfoError};
use crate::secrets::{SecretError, SecretRef};

/// Errors that can occur while bringing a container to a desired state.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// The engine socket could not be reached.
    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    /// A credential lookup failed; raised before any engine call.
    #[error("secret for {variable} ({secret}) unavailable: {source}")]
    SecretUnavailable {
        variable: String,
        secret: SecretRef,
        #[source]
        source: SecretError,
    },

    /// The image is not present locally and pulling it failed.
    #[error("image {image} is not available locally and could not be pulled: {reason}")]
    ImagePullRequired { image: String, reason: String },

    /// An explicit pull failed.
    #[error("failed to pull image {image}: {source}")]
    ImagePullFailed {
        image: String,
        #[source]
        source: ImageError,
    },

    /// The operation needs a running container.
    #[error("container {0} is not running")]
    NotRunning(String),

    /// No container holds the name.
    #[error("no container named {0}")]
    NotFound(String),

    /// The configuration could not be turned into a container spec.
    #[error("invalid container spec: {0}")]
    InvalidSpec(String),

    /// Any other engine error, reported verbatim.
    #[error("{0}")]
    Engine(String),
}

/// Coarse classification of a [`LifecycleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleErrorKind {
    RuntimeUnavailable,
    SecretUnavailable,
    ImagePullRequired,
    ImagePullFailed,
    NotRunning,
    NotFound,
    InvalidSpec,
    Engine,
}

impl LifecycleError {
    pub fn kind(&self) -> LifecycleErrorKind {
        match self {
            LifecycleError::RuntimeUnavailable(_) => LifecycleErrorKind::RuntimeUnavailable,
            LifecycleError::SecretUnavailable { .. } => LifecycleErrorKind::SecretUnavailable,
            LifecycleError::ImagePullRequired { .. } => LifecycleErrorKind::ImagePullRequired,
            LifecycleError::ImagePullFailed { .. } => LifecycleErrorKind::ImagePullFailed,
            LifecycleError::NotRunning(_) => LifecycleErrorKind::NotRunning,
            LifecycleError::NotFound(_) => LifecycleErrorKind::NotFound,
            LifecycleError::InvalidSpec(_) => LifecycleErrorKind::InvalidSpec,
            LifecycleError::Engine(_) => LifecycleErrorKind::Engine,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self.kind() {
            LifecycleErrorKind::Engine => 1,
            LifecycleErrorKind::InvalidSpec => 2,
            LifecycleErrorKind::RuntimeUnavailable => 3,
            LifecycleErrorKind::SecretUnavailable => 4,
            LifecycleErrorKind::ImagePullRequired | LifecycleErrorKind::ImagePullFailed => 5,
            LifecycleErrorKind::NotRunning | LifecycleErrorKind::NotFound => 6,
        }
    }
}

impl From<ContainerError> for LifecycleError {
    fn from(err: ContainerError) -> Self {
        match err {
            ContainerError::Unavailable(msg) => LifecycleError::RuntimeUnavailable(msg),
            other => LifecycleError::Engine(other.to_string()),
        }
    }
}

impl From<ExecError> for LifecycleError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Unavailable(msg) => LifecycleError::RuntimeUnavailable(msg),
            ExecError::ContainerNotRunning(name) => LifecycleError::NotRunning(name),
            other => LifecycleError::Engine(other.to_string()),
        }
    }
}

impl From<LogError> for LifecycleError {
    fn from(err: LogError) -> Self {
        match err {
            LogError::Unavailable(msg) => LifecycleError::RuntimeUnavailable(msg),
            LogError::ContainerNotFound(name) => LifecycleError::NotFound(name),
            other => LifecycleError::Engine(other.to_string()),
        }
    }
}

impl From<RuntimeInfoError> for LifecycleError {
    fn from(err: RuntimeInfoError) -> Self {
        match err {
            RuntimeInfoError::ConnectionFailed(msg) => LifecycleError::RuntimeUnavailable(msg),
            RuntimeInfoError::Runtime(msg) => LifecycleError::Engine(msg),
        }
    }
}

impl From<EnvError> for LifecycleError {
    fn from(err: EnvError) -> Self {
        match err {
            EnvError::MissingVar(var) => {
                LifecycleError::InvalidSpec(format!("missing required environment variable: {var}"))
            }
            EnvError::Secret {
                variable,
                secret,
                source,
            } => LifecycleError::SecretUnavailable {
                variable,
                secret,
                source,
            },
        }
    }
}
