// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Supports both Docker and Podman via Docker-compatible API.

use crate::runtime::traits::sealed::Sealed;
use crate::runtime::traits::{
    ContainerConfig, ContainerError, ContainerInfo, ContainerOps, ContainerState, ExecConfig,
    ExecError, ExecOps, ExecResult, HealthState, ImageError, ImageOps, LogError, LogLine, LogOps,
    LogOptions, LogStream, LogStreamBox, PingOps, PortMapping, Protocol, PruneError, PruneOps,
    PruneSummary, RegistryAuth, RestartPolicyConfig, RuntimeInfoError,
};
use crate::runtime::types::RuntimeType;
use crate::types::{ContainerId, ContainerName, ImageRef};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::exec::{StartExecOptions, StartExecResults};
use bollard::models::{
    ContainerCreateBody, ContainerInspectResponse, HostConfig, Mount, MountTypeEnum, PortBinding,
    PortMap, RestartPolicy, RestartPolicyNameEnum,
};
use bollard::query_parameters::{
    CreateContainerOptions, CreateImageOptions, InspectContainerOptions, LogsOptions,
    PruneContainersOptions, PruneImagesOptions, PruneVolumesOptions, RemoveContainerOptions,
    StopContainerOptions,
};
use futures::StreamExt;
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::io::IsTerminal;
use std::process::Stdio;
use std::time::Duration;
use tokio::net::UnixStream;
use tokio::time::MissedTickBehavior;

/// Seconds bollard waits on any single API request.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// How often a captured exec checks whether its process has exited.
const EXEC_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long output may keep arriving after the exec process has exited.
const EXEC_DRAIN_GRACE: Duration = Duration::from_millis(200);

/// libpod API version used for the native pull endpoint.
const LIBPOD_API_VERSION: &str = "v4.0.0";

// =============================================================================
// Error Mapping Helpers
// =============================================================================

/// Errors that mean the engine socket could not be reached at all.
fn is_unreachable(e: &bollard::errors::Error) -> bool {
    matches!(
        e,
        bollard::errors::Error::IOError { .. }
            | bollard::errors::Error::HyperResponseError { .. }
            | bollard::errors::Error::HyperLegacyError { .. }
            | bollard::errors::Error::RequestTimeoutError
            | bollard::errors::Error::SocketNotFoundError(_)
    )
}

fn map_image_pull_error(e: bollard::errors::Error, image_name: &str) -> ImageError {
    match &e {
        _ if is_unreachable(&e) => ImageError::Unavailable(e.to_string()),
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 401 || *status_code == 403 =>
        {
            ImageError::AuthenticationFailed(format!("{}: {}", image_name, e))
        }
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 404 =>
        {
            ImageError::NotFound(image_name.to_string())
        }
        _ => ImageError::PullFailed(format!("{}: {}", image_name, e)),
    }
}

fn map_container_create_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        _ if is_unreachable(&e) => ContainerError::Unavailable(e.to_string()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::ImageNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ContainerError::AlreadyExists(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_start_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        _ if is_unreachable(&e) => ContainerError::Unavailable(e.to_string()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::AlreadyRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_stop_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        _ if is_unreachable(&e) => ContainerError::Unavailable(e.to_string()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 304 => ContainerError::NotRunning(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_container_not_found_error(e: bollard::errors::Error) -> ContainerError {
    match &e {
        _ if is_unreachable(&e) => ContainerError::Unavailable(e.to_string()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ContainerError::NotFound(message.clone()),
        _ => ContainerError::Runtime(e.to_string()),
    }
}

fn map_exec_create_error(e: bollard::errors::Error) -> ExecError {
    match &e {
        _ if is_unreachable(&e) => ExecError::Unavailable(e.to_string()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ExecError::ContainerNotFound(message.clone()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 409 => ExecError::ContainerNotRunning(message.clone()),
        _ => ExecError::Runtime(e.to_string()),
    }
}

fn map_exec_not_found_error(e: bollard::errors::Error) -> ExecError {
    match &e {
        _ if is_unreachable(&e) => ExecError::Unavailable(e.to_string()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => ExecError::ExecNotFound(message.clone()),
        _ => ExecError::Runtime(e.to_string()),
    }
}

fn map_log_error(e: bollard::errors::Error) -> LogError {
    match &e {
        _ if is_unreachable(&e) => LogError::Unavailable(e.to_string()),
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message,
        } if *status_code == 404 => LogError::ContainerNotFound(message.clone()),
        _ => LogError::StreamError(e.to_string()),
    }
}

fn map_prune_error(e: bollard::errors::Error) -> PruneError {
    match &e {
        _ if is_unreachable(&e) => PruneError::Unavailable(e.to_string()),
        bollard::errors::Error::DockerResponseServerError { status_code, .. }
            if *status_code == 409 =>
        {
            PruneError::AlreadyRunning
        }
        _ => PruneError::Runtime(e.to_string()),
    }
}

// =============================================================================
// Conversion Helpers
// =============================================================================

fn restart_policy(config: &RestartPolicyConfig) -> RestartPolicy {
    let (name, maximum_retry_count) = match config {
        RestartPolicyConfig::No => (RestartPolicyNameEnum::NO, None),
        RestartPolicyConfig::Always => (RestartPolicyNameEnum::ALWAYS, None),
        RestartPolicyConfig::UnlessStopped => (RestartPolicyNameEnum::UNLESS_STOPPED, None),
        RestartPolicyConfig::OnFailure { max_retries } => (
            RestartPolicyNameEnum::ON_FAILURE,
            max_retries.map(i64::from),
        ),
    };
    RestartPolicy {
        name: Some(name),
        maximum_retry_count,
    }
}

/// Parse engine port bindings (`"9099/tcp" -> [{HostIp, HostPort}]`) back into mappings.
fn ports_from_bindings(bindings: PortMap) -> Vec<PortMapping> {
    let mut ports: Vec<PortMapping> = Vec::new();
    for (key, binds) in bindings {
        let (port, proto) = key.split_once('/').unwrap_or((key.as_str(), "tcp"));
        let Ok(container_port) = port.parse::<u16>() else {
            continue;
        };
        let protocol = if proto == "udp" {
            Protocol::Udp
        } else {
            Protocol::Tcp
        };

        let binds = binds.unwrap_or_default();
        if binds.is_empty() {
            ports.push(PortMapping {
                host_port: None,
                container_port,
                protocol,
                host_ip: None,
            });
        }
        for bind in binds {
            ports.push(PortMapping {
                host_port: bind.host_port.and_then(|p| p.parse().ok()),
                container_port,
                protocol,
                host_ip: bind.host_ip.filter(|ip| !ip.is_empty()),
            });
        }
    }
    ports.sort_by_key(|p| (p.container_port, p.host_port));
    ports
}

fn container_info_from(details: ContainerInspectResponse) -> ContainerInfo {
    let state = details
        .state
        .as_ref()
        .and_then(|s| s.status)
        .map(|s| match s {
            bollard::models::ContainerStateStatusEnum::CREATED => ContainerState::Created,
            bollard::models::ContainerStateStatusEnum::RUNNING => ContainerState::Running,
            bollard::models::ContainerStateStatusEnum::PAUSED => ContainerState::Paused,
            bollard::models::ContainerStateStatusEnum::RESTARTING => ContainerState::Restarting,
            bollard::models::ContainerStateStatusEnum::REMOVING => ContainerState::Removing,
            bollard::models::ContainerStateStatusEnum::EXITED => ContainerState::Exited,
            bollard::models::ContainerStateStatusEnum::DEAD => ContainerState::Dead,
            _ => ContainerState::Exited,
        })
        .unwrap_or(ContainerState::Exited);

    let health = details
        .state
        .as_ref()
        .and_then(|s| s.health.as_ref())
        .and_then(|h| h.status)
        .map(|s| match s {
            bollard::models::HealthStatusEnum::STARTING => HealthState::Starting,
            bollard::models::HealthStatusEnum::HEALTHY => HealthState::Healthy,
            bollard::models::HealthStatusEnum::UNHEALTHY => HealthState::Unhealthy,
            _ => HealthState::None,
        });

    let created = details
        .created
        .and_then(|dt| chrono::DateTime::from_timestamp(dt.unix_timestamp(), dt.nanosecond()));

    let ports = details
        .host_config
        .and_then(|h| h.port_bindings)
        .map(ports_from_bindings)
        .unwrap_or_default();

    ContainerInfo {
        id: ContainerId::new(details.id.unwrap_or_default()),
        name: details
            .name
            .unwrap_or_default()
            .trim_start_matches('/')
            .to_string(),
        image: details
            .config
            .as_ref()
            .and_then(|c| c.image.clone())
            .unwrap_or_default(),
        state,
        health,
        created,
        labels: details.config.and_then(|c| c.labels).unwrap_or_default(),
        ports,
    }
}

fn prune_summary(deleted: Option<Vec<String>>, space_reclaimed: Option<i64>) -> PruneSummary {
    PruneSummary {
        deleted: deleted.unwrap_or_default(),
        space_reclaimed: space_reclaimed.and_then(|n| u64::try_from(n).ok()).unwrap_or(0),
    }
}

/// Inspect answers for full ids and unique id prefixes as well as names.
/// Only a container whose own name is `name` holds it.
fn info_if_named(
    details: ContainerInspectResponse,
    name: &ContainerName,
) -> Option<ContainerInfo> {
    let info = container_info_from(details);
    if info.name == name.as_str() {
        Some(info)
    } else {
        tracing::debug!(
            requested = %name,
            found = %info.name,
            id = %info.id.short(),
            "inspect matched a different container"
        );
        None
    }
}

/// Stop grace period in whole seconds, saturating at what the API accepts.
fn timeout_secs_i32(timeout: Duration) -> i32 {
    i32::try_from(timeout.as_secs()).unwrap_or(i32::MAX)
}

fn timeout_secs_i64(timeout: Duration) -> i64 {
    i64::try_from(timeout.as_secs()).unwrap_or(i64::MAX)
}

/// Environment variable pointing the engine CLI at our socket.
fn cli_host_env(runtime_type: RuntimeType, socket_path: &str) -> (&'static str, String) {
    let var = match runtime_type {
        RuntimeType::Docker => "DOCKER_HOST",
        RuntimeType::Podman => "CONTAINER_HOST",
    };
    (var, format!("unix://{socket_path}"))
}

/// Whether a pull goes through libpod's endpoint instead of the Docker-compatible one.
/// libpod cannot carry credentials, so authenticated pulls never qualify.
fn uses_libpod_pull(
    runtime_type: RuntimeType,
    insecure_registries: bool,
    auth: Option<&RegistryAuth>,
) -> bool {
    runtime_type == RuntimeType::Podman && insecure_registries && auth.is_none()
}

fn libpod_pull_uri(image_name: &str) -> String {
    format!(
        "/{}/libpod/images/pull?reference={}&tlsVerify=false",
        LIBPOD_API_VERSION,
        urlencoding::encode(image_name)
    )
}

/// Output collected from an attached exec stream.
#[derive(Default)]
struct CapturedOutput {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

impl CapturedOutput {
    fn push(&mut self, item: Result<LogOutput, bollard::errors::Error>) -> Result<(), ExecError> {
        match item {
            Ok(LogOutput::StdOut { message }) | Ok(LogOutput::Console { message }) => {
                self.stdout.extend(message)
            }
            Ok(LogOutput::StdErr { message }) => self.stderr.extend(message),
            Ok(LogOutput::StdIn { .. }) => {}
            Err(e) => return Err(ExecError::Failed(e.to_string())),
        }
        Ok(())
    }
}

// =============================================================================
// BollardRuntime
// =============================================================================

/// Container runtime implementation using bollard.
///
/// Supports both Docker and Podman via Docker-compatible API.
/// Podman can opt in to libpod's native pull for plain-HTTP registries.
pub struct BollardRuntime {
    client: Docker,
    runtime_type: RuntimeType,
    socket_path: Option<String>,
    insecure_registries: bool,
}

/// Exec instance state, as reported by exec inspect.
struct ExecStatus {
    running: bool,
    exit_code: Option<i64>,
}

impl BollardRuntime {
    /// Create a new BollardRuntime with socket path for libpod API access.
    pub fn new_with_socket(client: Docker, runtime_type: RuntimeType, socket_path: String) -> Self {
        Self {
            client,
            runtime_type,
            socket_path: Some(socket_path),
            insecure_registries: false,
        }
    }

    /// Pull anonymously through libpod with TLS verification off (Podman only).
    pub fn with_insecure_registries(mut self, enabled: bool) -> Self {
        self.insecure_registries = enabled;
        self
    }

    /// Connect to a container runtime using detected runtime info.
    ///
    /// Connecting is lazy; use [`PingOps::ping`] to check the engine answers.
    pub fn connect(info: &super::types::RuntimeInfo) -> Result<Self, RuntimeInfoError> {
        let client = Docker::connect_with_unix(
            &info.socket_path,
            REQUEST_TIMEOUT_SECS,
            bollard::API_DEFAULT_VERSION,
        )
        .map_err(|e| RuntimeInfoError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new_with_socket(
            client,
            info.runtime_type,
            info.socket_path.clone(),
        ))
    }

    /// Pull through Podman's libpod endpoint with `tlsVerify=false`, for plain-HTTP registries.
    async fn pull_image_libpod(&self, image_name: &str) -> Result<(), ImageError> {
        let socket_path = self.socket_path.as_ref().ok_or_else(|| {
            ImageError::PullFailed("socket path not available for libpod API".to_string())
        })?;

        let stream = UnixStream::connect(socket_path)
            .await
            .map_err(|e| ImageError::Unavailable(format!("{}: {}", socket_path, e)))?;

        let io = TokioIo::new(stream);

        let (mut sender, conn) = hyper::client::conn::http1::handshake(io)
            .await
            .map_err(|e| ImageError::PullFailed(format!("HTTP handshake failed: {}", e)))?;

        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::warn!("libpod connection error: {}", e);
            }
        });

        let uri = libpod_pull_uri(image_name);

        let req = hyper::Request::builder()
            .method("POST")
            .uri(&uri)
            .header("Host", "localhost")
            .body(http_body_util::Empty::<bytes::Bytes>::new())
            .map_err(|e| ImageError::PullFailed(format!("failed to build request: {}", e)))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(|e| ImageError::PullFailed(format!("request failed: {}", e)))?;

        use http_body_util::BodyExt;

        let status = resp.status();
        let body = resp
            .into_body()
            .collect()
            .await
            .map_err(|e| ImageError::PullFailed(format!("failed to read response: {}", e)))?;
        let body_bytes = body.to_bytes();
        let body_text = String::from_utf8_lossy(&body_bytes);

        if status == hyper::StatusCode::UNAUTHORIZED || status == hyper::StatusCode::FORBIDDEN {
            return Err(ImageError::AuthenticationFailed(format!(
                "{}: {}",
                image_name, body_text
            )));
        }

        if !status.is_success() {
            return Err(ImageError::PullFailed(format!(
                "{}: libpod API error: {}",
                image_name, body_text
            )));
        }

        // The body is a stream of progress JSON; a failed pull still answers 200.
        if body_text.contains("\"error\"") && !body_text.contains("\"error\":null") {
            return Err(ImageError::PullFailed(format!(
                "{}: {}",
                image_name, body_text
            )));
        }

        Ok(())
    }

    async fn exec_status(&self, exec_id: &str) -> Result<ExecStatus, ExecError> {
        let details = self
            .client
            .inspect_exec(exec_id)
            .await
            .map_err(map_exec_not_found_error)?;

        Ok(ExecStatus {
            running: details.running.unwrap_or(false),
            exit_code: details.exit_code,
        })
    }

    /// Read an attached exec stream until the process exits.
    ///
    /// Podman may keep the stream open after the process is gone, so the exec
    /// is polled alongside the stream and whatever is still buffered is drained.
    async fn collect_exec_output<S>(
        &self,
        exec_id: &str,
        mut output: S,
    ) -> Result<CapturedOutput, ExecError>
    where
        S: futures::Stream<Item = Result<LogOutput, bollard::errors::Error>> + Unpin,
    {
        let mut captured = CapturedOutput::default();
        let mut poll = tokio::time::interval_at(
            tokio::time::Instant::now() + EXEC_POLL_INTERVAL,
            EXEC_POLL_INTERVAL,
        );
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                item = output.next() => match item {
                    Some(item) => captured.push(item)?,
                    None => return Ok(captured),
                },
                _ = poll.tick() => {
                    let status = self.exec_status(exec_id).await?;
                    if !status.running && status.exit_code.is_some() {
                        while let Ok(Some(item)) =
                            tokio::time::timeout(EXEC_DRAIN_GRACE, output.next()).await
                        {
                            captured.push(item)?;
                        }
                        return Ok(captured);
                    }
                }
            }
        }
    }
}

impl Sealed for BollardRuntime {}

#[async_trait]
impl PingOps for BollardRuntime {
    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        self.client.ping().await.map_err(|e| {
            if is_unreachable(&e) {
                RuntimeInfoError::ConnectionFailed(e.to_string())
            } else {
                RuntimeInfoError::Runtime(e.to_string())
            }
        })?;
        Ok(())
    }
}

#[async_trait]
impl ImageOps for BollardRuntime {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        let image_name = reference.to_string();
        tracing::debug!(image = %image_name, runtime = %self.runtime_type, "pulling image");

        if uses_libpod_pull(self.runtime_type, self.insecure_registries, auth) {
            tracing::debug!(image = %image_name, "pulling through libpod without TLS verification");
            return self.pull_image_libpod(&image_name).await;
        }

        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        let credentials = auth.map(|a| bollard::auth::DockerCredentials {
            username: Some(a.username.clone()),
            password: Some(a.password.clone()),
            serveraddress: a.server.clone(),
            ..Default::default()
        });

        // Pull returns a stream of progress updates - consume it
        let mut stream = self.client.create_image(Some(opts), None, credentials);
        while let Some(result) = stream.next().await {
            result.map_err(|e| map_image_pull_error(e, &image_name))?;
        }

        Ok(())
    }
}

#[async_trait]
impl ContainerOps for BollardRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let image_name = config.image.to_string();

        let env: Vec<String> = config
            .env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();

        let mut host_config = HostConfig {
            restart_policy: Some(restart_policy(&config.restart_policy)),
            ..Default::default()
        };

        let mounts: Vec<Mount> = config
            .volumes
            .iter()
            .map(|m| Mount {
                source: Some(m.source.clone()),
                target: Some(m.target.clone()),
                typ: Some(MountTypeEnum::BIND),
                read_only: Some(m.read_only),
                ..Default::default()
            })
            .collect();
        if !mounts.is_empty() {
            host_config.mounts = Some(mounts);
        }

        let mut port_bindings: PortMap = HashMap::new();
        let mut exposed_ports: Vec<String> = Vec::new();
        for port in &config.ports {
            let port_key = port.port_key();

            if !exposed_ports.contains(&port_key) {
                exposed_ports.push(port_key.clone());
            }

            if let Some(host_port) = port.host_port {
                port_bindings
                    .entry(port_key)
                    .or_insert_with(|| Some(Vec::new()))
                    .get_or_insert_with(Vec::new)
                    .push(PortBinding {
                        host_ip: port.host_ip.clone(),
                        host_port: Some(host_port.to_string()),
                    });
            }
        }
        if !port_bindings.is_empty() {
            host_config.port_bindings = Some(port_bindings);
        }

        if !config.extra_hosts.is_empty() {
            host_config.extra_hosts =
                Some(config.extra_hosts.iter().map(|h| h.to_string()).collect());
        }

        let container_config = ContainerCreateBody {
            image: Some(image_name),
            env: if env.is_empty() { None } else { Some(env) },
            labels: if config.labels.is_empty() {
                None
            } else {
                Some(config.labels.clone())
            },
            cmd: config.command.clone(),
            host_config: Some(host_config),
            exposed_ports: if exposed_ports.is_empty() {
                None
            } else {
                Some(exposed_ports)
            },
            stop_timeout: config.stop_timeout.map(timeout_secs_i64),
            ..Default::default()
        };

        let opts = CreateContainerOptions {
            name: Some(config.name.to_string()),
            ..Default::default()
        };

        let response = self
            .client
            .create_container(Some(opts), container_config)
            .await
            .map_err(map_container_create_error)?;

        for warning in &response.warnings {
            tracing::warn!(container = %config.name, "engine warning: {}", warning);
        }

        Ok(ContainerId::new(response.id))
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        self.client
            .start_container(
                id.as_str(),
                None::<bollard::query_parameters::StartContainerOptions>,
            )
            .await
            .map_err(map_container_start_error)
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        timeout: Option<Duration>,
    ) -> Result<(), ContainerError> {
        let opts = StopContainerOptions {
            t: timeout.map(timeout_secs_i32),
            signal: None,
        };

        self.client
            .stop_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_stop_error)
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_container(id.as_str(), Some(opts))
            .await
            .map_err(map_container_not_found_error)?;

        Ok(())
    }

    async fn find_container(
        &self,
        name: &ContainerName,
    ) -> Result<Option<ContainerInfo>, ContainerError> {
        match self
            .client
            .inspect_container(name.as_str(), None::<InspectContainerOptions>)
            .await
        {
            Ok(details) => Ok(info_if_named(details, name)),
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 404, ..
            }) => Ok(None),
            Err(e) => Err(map_container_not_found_error(e)),
        }
    }
}

#[async_trait]
impl ExecOps for BollardRuntime {
    async fn exec(
        &self,
        container: &ContainerName,
        config: &ExecConfig,
    ) -> Result<ExecResult, ExecError> {
        let opts = bollard::models::ExecConfig {
            cmd: Some(config.cmd.clone()),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let exec_id = self
            .client
            .create_exec(container.as_str(), opts)
            .await
            .map_err(map_exec_create_error)?
            .id;

        let opts = StartExecOptions {
            detach: false,
            ..Default::default()
        };

        let captured = match self
            .client
            .start_exec(&exec_id, Some(opts))
            .await
            .map_err(map_exec_not_found_error)?
        {
            StartExecResults::Attached { output, .. } => {
                self.collect_exec_output(&exec_id, output).await?
            }
            StartExecResults::Detached => CapturedOutput::default(),
        };

        let status = self.exec_status(&exec_id).await?;

        Ok(ExecResult {
            exit_code: status.exit_code.unwrap_or(0),
            stdout: captured.stdout,
            stderr: captured.stderr,
        })
    }

    async fn exec_interactive(
        &self,
        container: &ContainerName,
        cmd: &[String],
    ) -> Result<i64, ExecError> {
        // Raw terminal handling lives in the engine's own client; hand the TTY to it.
        let binary = self.runtime_type.cli_binary();
        let tty_flag = if std::io::stdin().is_terminal() {
            "-it"
        } else {
            "-i"
        };

        let mut command = tokio::process::Command::new(binary);
        if let Some(socket) = &self.socket_path {
            let (var, value) = cli_host_env(self.runtime_type, socket);
            command.env(var, value);
        }
        command
            .arg("exec")
            .arg(tty_flag)
            .arg(container.as_str())
            .args(cmd)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        tracing::debug!(container = %container, binary, ?cmd, "starting interactive exec");

        let status = command.status().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ExecError::Failed(format!("'{}' client not found on PATH", binary))
            } else {
                ExecError::Failed(format!("failed to run {}: {}", binary, e))
            }
        })?;

        Ok(status.code().map(i64::from).unwrap_or(-1))
    }
}

#[async_trait]
impl LogOps for BollardRuntime {
    async fn container_logs(
        &self,
        container: &ContainerName,
        opts: &LogOptions,
    ) -> Result<LogStreamBox, LogError> {
        let log_opts = LogsOptions {
            stdout: opts.stdout,
            stderr: opts.stderr,
            follow: opts.follow,
            timestamps: opts.timestamps,
            tail: opts
                .tail
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };

        let stream = self.client.logs(container.as_str(), Some(log_opts));

        let mapped_stream = stream.map(|result| {
            result
                .map(|output| {
                    let (stream, data) = match output {
                        LogOutput::StdErr { message } => (LogStream::Stderr, message),
                        LogOutput::StdOut { message }
                        | LogOutput::StdIn { message }
                        | LogOutput::Console { message } => {
                            (LogStream::Stdout, message)
                        }
                    };

                    LogLine {
                        content: String::from_utf8_lossy(&data).to_string(),
                        stream,
                    }
                })
                .map_err(map_log_error)
        });

        Ok(Box::pin(mapped_stream))
    }
}

#[async_trait]
impl PruneOps for BollardRuntime {
    async fn prune_containers(&self) -> Result<PruneSummary, PruneError> {
        let response = self
            .client
            .prune_containers(None::<PruneContainersOptions>)
            .await
            .map_err(map_prune_error)?;

        Ok(prune_summary(
            response.containers_deleted,
            response.space_reclaimed,
        ))
    }

    async fn prune_images(&self) -> Result<PruneSummary, PruneError> {
        let response = self
            .client
            .prune_images(None::<PruneImagesOptions>)
            .await
            .map_err(map_prune_error)?;

        let deleted = response.images_deleted.map(|items| {
            items
                .into_iter()
                .filter_map(|item| item.deleted.or(item.untagged))
                .collect()
        });

        Ok(prune_summary(deleted, response.space_reclaimed))
    }

    async fn prune_volumes(&self) -> Result<PruneSummary, PruneError> {
        let response = self
            .client
            .prune_volumes(None::<PruneVolumesOptions>)
            .await
            .map_err(map_prune_error)?;

        Ok(prune_summary(
            response.volumes_deleted,
            response.space_reclaimed,
        ))
    }
}
