// ABOUTME: Live state snapshot of a managed container.
// ABOUTME: Collapses engine states into absent, stopped, or running plus health.

use crate::runtime::{ContainerInfo, ContainerState, HealthState, PortMapping};
use crate::types::ContainerName;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Whether a container exists and whether its processes are alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Absent,
    Stopped,
    Running,
}

impl From<ContainerState> for Presence {
    fn from(state: ContainerState) -> Self {
        if state.is_running() {
            Presence::Running
        } else {
            Presence::Stopped
        }
    }
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Presence::Absent => write!(f, "absent"),
            Presence::Stopped => write!(f, "stopped"),
            Presence::Running => write!(f, "running"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Health {
    #[default]
    None,
    Starting,
    Healthy,
    Unhealthy,
}

impl From<Option<HealthState>> for Health {
    fn from(state: Option<HealthState>) -> Self {
        match state {
            Some(HealthState::Starting) => Health::Starting,
            Some(HealthState::Healthy) => Health::Healthy,
            Some(HealthState::Unhealthy) => Health::Unhealthy,
            Some(HealthState::None) | None => Health::None,
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Health::None => write!(f, "none"),
            Health::Starting => write!(f, "starting"),
            Health::Healthy => write!(f, "healthy"),
            Health::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// A point-in-time view of the container holding a name. Never cached.
#[derive(Debug, Clone, Serialize)]
pub struct ContainerStatus {
    pub name: String,
    pub state: Presence,
    pub health: Health,
    pub id: Option<String>,
    pub image: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub ports: Vec<PortMapping>,
}

impl ContainerStatus {
    pub fn absent(name: &ContainerName) -> Self {
        Self {
            name: name.to_string(),
            state: Presence::Absent,
            health: Health::None,
            id: None,
            image: None,
            created: None,
            ports: Vec::new(),
        }
    }

    pub fn from_info(name: &ContainerName, info: ContainerInfo) -> Self {
        Self {
            name: name.to_string(),
            state: info.state.into(),
            health: info.health.into(),
            id: Some(info.id.short().to_string()),
            image: Some(info.image),
            created: info.created,
            ports: info.ports,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == Presence::Running
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.state)?;
        if self.health != Health::None {
            write!(f, " ({})", self.health)?;
        }
        if let Some(image) = &self.image {
            write!(f, "\n  image:   {image}")?;
        }
        if let Some(id) = &self.id {
            write!(f, "\n  id:      {id}")?;
        }
        if let Some(created) = &self.created {
            write!(f, "\n  created: {}", created.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
        if !self.ports.is_empty() {
            let ports: Vec<String> = self.ports.iter().map(ToString::to_string).collect();
            write!(f, "\n  ports:   {}", ports.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_states_collapse() {
        assert_eq!(Presence::from(ContainerState::Running), Presence::Running);
        assert_eq!(Presence::from(ContainerState::Restarting), Presence::Running);
        assert_eq!(Presence::from(ContainerState::Paused), Presence::Running);
        assert_eq!(Presence::from(ContainerState::Created), Presence::Stopped);
        assert_eq!(Presence::from(ContainerState::Exited), Presence::Stopped);
        assert_eq!(Presence::from(ContainerState::Dead), Presence::Stopped);
        assert_eq!(Presence::from(ContainerState::Removing), Presence::Stopped);
    }

    #[test]
    fn absent_status_prints_only_the_state() {
        let name = ContainerName::new("pipelines").unwrap();
        assert_eq!(ContainerStatus::absent(&name).to_string(), "pipelines: absent");
    }

    #[test]
    fn status_serializes_lowercase() {
        let name = ContainerName::new("pipelines").unwrap();
        let json = serde_json::to_value(ContainerStatus::absent(&name)).unwrap();
        assert_eq!(json["state"], "absent");
        assert_eq!(json["health"], "none");
    }
}
