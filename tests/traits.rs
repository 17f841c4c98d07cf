// ABOUTME: Tests for runtime trait definitions.
// ABOUTME: Verifies traits compose with expected bounds and FullRuntime auto-implements.

use dockhand::runtime::fake::FakeRuntime;
use dockhand::runtime::traits::*;
use dockhand::types::{ContainerId, ContainerName, ImageRef};

/// Verify that function signatures work with trait bounds.
mod trait_bounds {
    use super::*;

    /// Function requiring only ImageOps.
    async fn refresh_image(runtime: &impl ImageOps, image: &ImageRef) -> Result<(), ImageError> {
        runtime.pull_image(image, None).await
    }

    /// Function requiring only ContainerOps.
    async fn is_running(
        runtime: &impl ContainerOps,
        name: &ContainerName,
    ) -> Result<bool, ContainerError> {
        let info = runtime.find_container(name).await?;
        Ok(info.is_some_and(|i| i.state == ContainerState::Running))
    }

    /// Function requiring FullRuntime (all capabilities).
    async fn run(runtime: &impl FullRuntime, image: &ImageRef) -> Result<ContainerId, String> {
        refresh_image(runtime, image)
            .await
            .map_err(|e| e.to_string())?;

        let config = ContainerConfig {
            name: ContainerName::new("test").map_err(|e| e.to_string())?,
            image: image.clone(),
            env: Default::default(),
            labels: Default::default(),
            ports: vec![],
            volumes: vec![],
            extra_hosts: vec![],
            command: None,
            restart_policy: RestartPolicyConfig::default(),
            stop_timeout: None,
        };

        let id = runtime
            .create_container(&config)
            .await
            .map_err(|e| e.to_string())?;
        runtime
            .start_container(&id)
            .await
            .map_err(|e| e.to_string())?;
        Ok(id)
    }

    #[tokio::test]
    async fn fake_runtime_satisfies_full_runtime() {
        let image = ImageRef::parse("nginx:1.27").unwrap();
        let runtime = FakeRuntime::new().with_registry_image("nginx:1.27");

        run(&runtime, &image).await.unwrap();

        let name = ContainerName::new("test").unwrap();
        assert!(is_running(&runtime, &name).await.unwrap());
        assert!(!is_running(&runtime, &ContainerName::new("other").unwrap()).await.unwrap());
    }
}

/// Verify trait hierarchy and error types work correctly.
mod trait_types {
    use super::*;

    #[test]
    fn container_state_equality() {
        assert_eq!(ContainerState::Running, ContainerState::Running);
        assert_ne!(ContainerState::Running, ContainerState::Exited);
    }

    #[test]
    fn health_state_equality() {
        assert_eq!(HealthState::Healthy, HealthState::Healthy);
        assert_ne!(HealthState::Healthy, HealthState::Unhealthy);
    }

    #[test]
    fn log_options_helpers() {
        let follow = LogOptions::follow_all();
        assert!(follow.follow);
        assert!(follow.stdout);
        assert!(follow.stderr);
        assert!(follow.timestamps);

        let tail = LogOptions::tail(100);
        assert!(!tail.follow);
        assert_eq!(tail.tail, Some(100));
    }

    #[test]
    fn exec_config_command() {
        let config = ExecConfig::command(&["ls".to_string(), "-la".to_string()]);
        assert_eq!(config.cmd, ["ls", "-la"]);
    }

    #[test]
    fn restart_policy_default() {
        let policy = RestartPolicyConfig::default();
        assert!(matches!(policy, RestartPolicyConfig::UnlessStopped));
    }

    #[test]
    fn protocol_default() {
        let proto = Protocol::default();
        assert!(matches!(proto, Protocol::Tcp));
    }

    #[test]
    fn error_types_display() {
        let err = ImageError::NotFound("nginx:latest".to_string());
        assert!(err.to_string().contains("nginx:latest"));

        let err = ContainerError::AlreadyExists("mycontainer".to_string());
        assert!(err.to_string().contains("mycontainer"));

        let err = ExecError::ContainerNotRunning("container1".to_string());
        assert!(err.to_string().contains("container1"));

        let err = LogError::ContainerNotFound("missing".to_string());
        assert!(err.to_string().contains("missing"));

        let err = PruneError::Unavailable("socket gone".to_string());
        assert!(err.to_string().contains("socket gone"));

        let err = RuntimeInfoError::ConnectionFailed("timeout".to_string());
        assert!(err.to_string().contains("timeout"));
    }
}

/// Verify sealed trait pattern prevents external implementation.
/// This is a compile-time check - if this module compiles, the sealed pattern works.
mod sealed_trait_pattern {
    // The following would fail to compile if uncommented, proving traits are sealed:
    //
    // struct ExternalRuntime;
    // impl dockhand::runtime::traits::sealed::Sealed for ExternalRuntime {}
    //
    // Error: module `sealed` is private

    #[test]
    fn sealed_pattern_enforced() {
        // The enforcement is at compile time: implementing a capability trait
        // outside this crate requires the private `Sealed` supertrait.
    }
}
