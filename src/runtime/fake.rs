// ABOUTME: In-memory container engine implementing every capability trait.
// ABOUTME: Records each call so tests can assert which engine operations ran.

use crate::runtime::traits::sealed::Sealed;
use crate::runtime::traits::{
    ContainerConfig, ContainerError, ContainerInfo, ContainerOps, ContainerState, ExecConfig,
    ExecError, ExecOps, ExecResult, HealthState, ImageError, ImageOps, LogError, LogLine, LogOps,
    LogOptions, LogStream, LogStreamBox, PingOps, PruneError, PruneOps, PruneSummary,
    RegistryAuth, RuntimeInfoError,
};
use crate::types::{ContainerId, ContainerName, ImageRef};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// One engine call, as seen by the fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Ping,
    Pull(String),
    Create(String),
    Start(String),
    Stop(String),
    Remove(String),
    Find(String),
    Exec(String),
    ExecInteractive(String),
    Logs(String),
    Prune(PruneTarget),
}

impl Call {
    /// Whether this call changes containers on the engine.
    pub fn is_container_mutation(&self) -> bool {
        matches!(
            self,
            Call::Create(_) | Call::Start(_) | Call::Stop(_) | Call::Remove(_)
        )
    }
}

/// Which prune endpoint a call hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PruneTarget {
    Containers,
    Images,
    Volumes,
}

#[derive(Debug, Clone)]
struct FakeContainer {
    id: ContainerId,
    config: ContainerConfig,
    state: ContainerState,
    health: Option<HealthState>,
}

#[derive(Default)]
struct FakeState {
    containers: HashMap<String, FakeContainer>,
    local_images: HashSet<String>,
    registry: HashSet<String>,
    calls: Vec<Call>,
    unavailable: bool,
    fail_start: bool,
    fail_stop: bool,
    failing_prunes: HashSet<PruneTarget>,
    logs: Vec<LogLine>,
    exec_exit_code: i64,
    next_id: u64,
}

/// An engine that lives entirely in memory.
#[derive(Default)]
pub struct FakeRuntime {
    state: Mutex<FakeState>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make an image present locally.
    pub fn with_local_image(self, image: &str) -> Self {
        self.state.lock().local_images.insert(image.to_string());
        self
    }

    /// Make an image pullable from the registry.
    pub fn with_registry_image(self, image: &str) -> Self {
        self.state.lock().registry.insert(image.to_string());
        self
    }

    /// Every call fails as if the engine socket were gone.
    pub fn unavailable(self) -> Self {
        self.state.lock().unavailable = true;
        self
    }

    /// `start_container` fails after a successful create.
    pub fn failing_start(self) -> Self {
        self.state.lock().fail_start = true;
        self
    }

    /// `stop_container` fails as an engine refusal.
    pub fn failing_stop(self) -> Self {
        self.state.lock().fail_stop = true;
        self
    }

    pub fn failing_prune(self, target: PruneTarget) -> Self {
        self.state.lock().failing_prunes.insert(target);
        self
    }

    pub fn with_logs(self, lines: &[&str]) -> Self {
        self.state.lock().logs = lines
            .iter()
            .map(|l| LogLine {
                content: format!("{l}\n"),
                stream: LogStream::Stdout,
            })
            .collect();
        self
    }

    pub fn with_exec_exit_code(self, code: i64) -> Self {
        self.state.lock().exec_exit_code = code;
        self
    }

    /// Seed a container that already exists under `name`.
    pub fn with_container(
        self,
        name: ContainerName,
        image: ImageRef,
        state: ContainerState,
    ) -> Self {
        {
            let mut inner = self.state.lock();
            let id = inner.allocate_id();
            inner.local_images.insert(image.to_string());
            let config = ContainerConfig {
                name: name.clone(),
                image,
                env: HashMap::new(),
                labels: HashMap::new(),
                ports: Vec::new(),
                volumes: Vec::new(),
                extra_hosts: Vec::new(),
                command: None,
                restart_policy: Default::default(),
                stop_timeout: None,
            };
            inner.containers.insert(
                name.to_string(),
                FakeContainer {
                    id,
                    config,
                    state,
                    health: None,
                },
            );
        }
        self
    }

    /// Change the state of an existing container, e.g. to simulate a crash.
    pub fn set_state(&self, name: &str, state: ContainerState) {
        if let Some(c) = self.state.lock().containers.get_mut(name) {
            c.state = state;
        }
    }

    pub fn set_health(&self, name: &str, health: HealthState) {
        if let Some(c) = self.state.lock().containers.get_mut(name) {
            c.health = Some(health);
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn container_mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(Call::is_container_mutation)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// The configuration a container was created with.
    pub fn container_config(&self, name: &str) -> Option<ContainerConfig> {
        self.state
            .lock()
            .containers
            .get(name)
            .map(|c| c.config.clone())
    }

    pub fn container_state(&self, name: &str) -> Option<ContainerState> {
        self.state.lock().containers.get(name).map(|c| c.state)
    }

    pub fn container_count(&self) -> usize {
        self.state.lock().containers.len()
    }

    pub fn has_local_image(&self, image: &str) -> bool {
        self.state.lock().local_images.contains(image)
    }
}

impl FakeState {
    fn allocate_id(&mut self) -> ContainerId {
        self.next_id += 1;
        ContainerId::new(format!("{:064x}", self.next_id))
    }

    fn record(&mut self, call: Call) -> bool {
        self.calls.push(call);
        !self.unavailable
    }

    fn name_for(&self, id: &ContainerId) -> Option<String> {
        self.containers
            .iter()
            .find(|(_, c)| &c.id == id)
            .map(|(name, _)| name.clone())
    }

    fn info(&self, name: &str) -> Option<ContainerInfo> {
        self.containers.get(name).map(|c| ContainerInfo {
            id: c.id.clone(),
            name: name.to_string(),
            image: c.config.image.to_string(),
            state: c.state,
            health: c.health,
            created: Some(Utc::now()),
            labels: c.config.labels.clone(),
            ports: c.config.ports.clone(),
        })
    }
}

const UNREACHABLE: &str = "connect: no such file or directory";

impl Sealed for FakeRuntime {}

#[async_trait]
impl PingOps for FakeRuntime {
    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        if !self.state.lock().record(Call::Ping) {
            return Err(RuntimeInfoError::ConnectionFailed(UNREACHABLE.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn pull_image(
        &self,
        reference: &ImageRef,
        _auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        let image = reference.to_string();
        let mut state = self.state.lock();
        if !state.record(Call::Pull(image.clone())) {
            return Err(ImageError::Unavailable(UNREACHABLE.to_string()));
        }
        if !state.registry.contains(&image) {
            return Err(ImageError::PullFailed(format!(
                "{image}: manifest unknown"
            )));
        }
        state.local_images.insert(image);
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let name = config.name.to_string();
        let mut state = self.state.lock();
        if !state.record(Call::Create(name.clone())) {
            return Err(ContainerError::Unavailable(UNREACHABLE.to_string()));
        }
        if state.containers.contains_key(&name) {
            return Err(ContainerError::AlreadyExists(name));
        }
        if !state.local_images.contains(&config.image.to_string()) {
            return Err(ContainerError::ImageNotFound(format!(
                "No such image: {}",
                config.image
            )));
        }
        for port in config.ports.iter().filter_map(|p| p.host_port) {
            let taken = state.containers.values().any(|c| {
                c.state.is_running() && c.config.ports.iter().any(|p| p.host_port == Some(port))
            });
            if taken {
                return Err(ContainerError::Runtime(format!(
                    "port is already allocated: {port}"
                )));
            }
        }

        let id = state.allocate_id();
        state.containers.insert(
            name,
            FakeContainer {
                id: id.clone(),
                config: config.clone(),
                state: ContainerState::Created,
                health: None,
            },
        );
        Ok(id)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        if !state.record(Call::Start(id.to_string())) {
            return Err(ContainerError::Unavailable(UNREACHABLE.to_string()));
        }
        if state.fail_start {
            return Err(ContainerError::Runtime(
                "OCI runtime create failed".to_string(),
            ));
        }
        let name = state
            .name_for(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        let container = state
            .containers
            .get_mut(&name)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        if container.state.is_running() {
            return Err(ContainerError::AlreadyRunning(name));
        }
        container.state = ContainerState::Running;
        Ok(())
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        _timeout: Option<Duration>,
    ) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        if !state.record(Call::Stop(id.to_string())) {
            return Err(ContainerError::Unavailable(UNREACHABLE.to_string()));
        }
        if state.fail_stop {
            return Err(ContainerError::Runtime(
                "container did not stop: device or resource busy".to_string(),
            ));
        }
        let name = state
            .name_for(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        let container = state
            .containers
            .get_mut(&name)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        if !container.state.is_running() {
            return Err(ContainerError::NotRunning(name));
        }
        container.state = ContainerState::Exited;
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> Result<(), ContainerError> {
        let mut state = self.state.lock();
        if !state.record(Call::Remove(id.to_string())) {
            return Err(ContainerError::Unavailable(UNREACHABLE.to_string()));
        }
        let name = state
            .name_for(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        let running = state
            .containers
            .get(&name)
            .is_some_and(|c| c.state.is_running());
        if running && !force {
            return Err(ContainerError::Runtime(format!(
                "cannot remove running container {name}"
            )));
        }
        state.containers.remove(&name);
        Ok(())
    }

    async fn find_container(
        &self,
        name: &ContainerName,
    ) -> Result<Option<ContainerInfo>, ContainerError> {
        let mut state = self.state.lock();
        if !state.record(Call::Find(name.to_string())) {
            return Err(ContainerError::Unavailable(UNREACHABLE.to_string()));
        }
        Ok(state.info(name.as_str()))
    }
}

#[async_trait]
impl ExecOps for FakeRuntime {
    async fn exec(
        &self,
        container: &ContainerName,
        config: &ExecConfig,
    ) -> Result<ExecResult, ExecError> {
        let mut state = self.state.lock();
        if !state.record(Call::Exec(container.to_string())) {
            return Err(ExecError::Unavailable(UNREACHABLE.to_string()));
        }
        match state.containers.get(container.as_str()) {
            None => Err(ExecError::ContainerNotFound(container.to_string())),
            Some(c) if c.state != ContainerState::Running => {
                Err(ExecError::ContainerNotRunning(container.to_string()))
            }
            Some(_) => Ok(ExecResult {
                exit_code: state.exec_exit_code,
                stdout: format!("{}\n", config.cmd.join(" ")).into_bytes(),
                stderr: Vec::new(),
            }),
        }
    }

    async fn exec_interactive(
        &self,
        container: &ContainerName,
        _cmd: &[String],
    ) -> Result<i64, ExecError> {
        let mut state = self.state.lock();
        if !state.record(Call::ExecInteractive(container.to_string())) {
            return Err(ExecError::Unavailable(UNREACHABLE.to_string()));
        }
        match state.containers.get(container.as_str()) {
            None => Err(ExecError::ContainerNotFound(container.to_string())),
            Some(c) if c.state != ContainerState::Running => {
                Err(ExecError::ContainerNotRunning(container.to_string()))
            }
            Some(_) => Ok(state.exec_exit_code),
        }
    }
}

#[async_trait]
impl LogOps for FakeRuntime {
    async fn container_logs(
        &self,
        container: &ContainerName,
        opts: &LogOptions,
    ) -> Result<LogStreamBox, LogError> {
        let mut state = self.state.lock();
        if !state.record(Call::Logs(container.to_string())) {
            return Err(LogError::Unavailable(UNREACHABLE.to_string()));
        }
        if !state.containers.contains_key(container.as_str()) {
            return Err(LogError::ContainerNotFound(container.to_string()));
        }

        let mut lines = state.logs.clone();
        if let Some(tail) = opts.tail {
            let skip = lines.len().saturating_sub(tail as usize);
            lines.drain(..skip);
        }
        Ok(Box::pin(futures::stream::iter(lines.into_iter().map(Ok))))
    }
}

impl FakeRuntime {
    fn prune(&self, target: PruneTarget) -> Result<PruneSummary, PruneError> {
        let mut state = self.state.lock();
        if !state.record(Call::Prune(target)) {
            return Err(PruneError::Unavailable(UNREACHABLE.to_string()));
        }
        if state.failing_prunes.contains(&target) {
            return Err(PruneError::Runtime(format!("{target:?} prune failed")));
        }

        let deleted = match target {
            PruneTarget::Containers => {
                let stopped: Vec<String> = state
                    .containers
                    .iter()
                    .filter(|(_, c)| !c.state.is_running())
                    .map(|(name, _)| name.clone())
                    .collect();
                for name in &stopped {
                    state.containers.remove(name);
                }
                stopped
            }
            PruneTarget::Images | PruneTarget::Volumes => Vec::new(),
        };

        Ok(PruneSummary {
            space_reclaimed: deleted.len() as u64 * 1024,
            deleted,
        })
    }
}

#[async_trait]
impl PruneOps for FakeRuntime {
    async fn prune_containers(&self) -> Result<PruneSummary, PruneError> {
        self.prune(PruneTarget::Containers)
    }

    async fn prune_images(&self) -> Result<PruneSummary, PruneError> {
        self.prune(PruneTarget::Images)
    }

    async fn prune_volumes(&self) -> Result<PruneSummary, PruneError> {
        self.prune(PruneTarget::Volumes)
    }
}
