// ABOUTME: Runtime detection logic for the local system.
// ABOUTME: Honors explicit config and DOCKER_HOST, then checks Podman sockets before Docker.

use super::types::{RuntimeConfig, RuntimeInfo, RuntimeType};
use std::path::{Path, PathBuf};

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked Podman and Docker sockets)")]
    NoRuntimeFound,

    #[error("unsupported DOCKER_HOST '{0}': only unix:// sockets are supported")]
    UnsupportedHost(String),
}

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Facts about the invoking environment that detection depends on.
#[derive(Debug, Clone, Default)]
struct HostEnv {
    uid: Option<String>,
    home: Option<PathBuf>,
    docker_host: Option<String>,
}

impl HostEnv {
    fn current() -> Self {
        Self {
            uid: get_uid(),
            home: std::env::var_os("HOME").map(PathBuf::from),
            docker_host: std::env::var("DOCKER_HOST").ok().filter(|s| !s.is_empty()),
        }
    }
}

/// Detect the container runtime on the local system.
///
/// Detection order:
/// 1. Explicit `runtime`/`socket` from config
/// 2. `DOCKER_HOST` (unix sockets only)
/// 3. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 4. Rootful Podman socket (`/run/podman/podman.sock`)
/// 5. Docker socket (`/var/run/docker.sock`)
/// 6. Docker Desktop user socket (`$HOME/.docker/run/docker.sock`)
pub fn detect_local(config: Option<&RuntimeConfig>) -> Result<RuntimeInfo, DetectionError> {
    detect_in(&HostEnv::current(), config, |p| p.exists())
}

fn detect_in(
    env: &HostEnv,
    config: Option<&RuntimeConfig>,
    exists: impl Fn(&Path) -> bool,
) -> Result<RuntimeInfo, DetectionError> {
    if let Some(cfg) = config {
        match (cfg.runtime, &cfg.socket) {
            (Some(runtime_type), socket) => {
                let socket_path = socket
                    .clone()
                    .unwrap_or_else(|| default_socket_path(runtime_type).to_string());
                return Ok(RuntimeInfo {
                    runtime_type,
                    socket_path,
                });
            }
            (None, Some(socket)) => {
                return Ok(RuntimeInfo {
                    runtime_type: RuntimeType::from_socket_path(socket),
                    socket_path: socket.clone(),
                });
            }
            (None, None) => {}
        }
    }

    if let Some(ref host) = env.docker_host {
        let socket_path = host
            .strip_prefix("unix://")
            .ok_or_else(|| DetectionError::UnsupportedHost(host.clone()))?;
        return Ok(RuntimeInfo {
            runtime_type: RuntimeType::from_socket_path(socket_path),
            socket_path: socket_path.to_string(),
        });
    }

    let mut candidates: Vec<(RuntimeType, String)> = Vec::new();
    if let Some(ref uid) = env.uid {
        candidates.push((
            RuntimeType::Podman,
            format!("/run/user/{}/podman/podman.sock", uid),
        ));
    }
    candidates.push((RuntimeType::Podman, ROOTFUL_PODMAN.to_string()));
    candidates.push((RuntimeType::Docker, DOCKER_SOCKET.to_string()));
    if let Some(ref home) = env.home {
        candidates.push((
            RuntimeType::Docker,
            home.join(".docker/run/docker.sock")
                .to_string_lossy()
                .into_owned(),
        ));
    }

    candidates
        .into_iter()
        .find(|(_, path)| exists(Path::new(path)))
        .map(|(runtime_type, socket_path)| RuntimeInfo {
            runtime_type,
            socket_path,
        })
        .ok_or(DetectionError::NoRuntimeFound)
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        // Fall back to reading /proc/self/status
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}

fn default_socket_path(runtime: RuntimeType) -> &'static str {
    match runtime {
        RuntimeType::Docker => DOCKER_SOCKET,
        RuntimeType::Podman => ROOTFUL_PODMAN,
    }
}
