// ABOUTME: Container graceful shutdown configuration.
// ABOUTME: An optional grace period before the engine kills the container.

use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopConfig {
    /// `None` leaves the grace period to the engine (10s for Docker and Podman).
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}
