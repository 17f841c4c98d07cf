// ABOUTME: Integration tests for configuration parsing and validation.
// ABOUTME: Tests YAML parsing, env and secret resolution, discovery, and overrides.

use dockhand::config::*;
use dockhand::runtime::{Protocol, RuntimeType};
use dockhand::secrets::{SecretProvider, StaticSecretSource};
use futures::executor::block_on;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

mod parsing {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let yaml = r#"
name: pipelines
image: ghcr.io/open-webui/pipelines:main
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.name.as_str(), "pipelines");
        assert_eq!(config.image.registry(), Some("ghcr.io"));
        assert!(config.ports.is_empty());
        assert_eq!(config.restart, RestartPolicy::UnlessStopped);
        assert_eq!(config.shell(), DEFAULT_SHELL);
    }

    #[test]
    fn parse_full_config() {
        let yaml = r#"
name: pipelines
image: ghcr.io/open-webui/pipelines:main

ports:
  - 9099
  - "127.0.0.1:8080:80/udp"

volumes:
  - "/srv/pipelines:/app/pipelines"
  - "/etc/localtime:/etc/localtime:ro"

env:
  LOG_LEVEL: info
  GROK_API_KEY:
    secret:
      service: grok
      account: api-key

labels:
  com.example.team: ml

extra_hosts:
  - "host.docker.internal:host-gateway"

command: ["python", "main.py"]

restart: always

stop:
  timeout: 30s

secrets:
  provider: secret-tool

runtime:
  runtime: podman
  socket: /run/user/1000/podman/podman.sock

shell: /bin/bash
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.ports.len(), 2);
        assert_eq!(config.ports[0].host_port, Some(9099));
        assert_eq!(config.ports[1].host_ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(config.ports[1].protocol, Protocol::Udp);
        assert_eq!(config.volumes.len(), 2);
        assert_eq!(
            config.env.get("LOG_LEVEL"),
            Some(&EnvValue::Literal("info".to_string()))
        );
        assert!(config.env["GROK_API_KEY"].is_secret());
        assert_eq!(config.labels["com.example.team"], "ml");
        assert_eq!(config.extra_hosts[0].hostname, "host.docker.internal");
        assert_eq!(config.command.as_deref().map(<[String]>::len), Some(2));
        assert_eq!(config.restart, RestartPolicy::Always);
        assert_eq!(config.stop.timeout, Some(Duration::from_secs(30)));
        assert_eq!(config.secrets.provider, SecretProvider::SecretTool);
        let runtime = config.runtime.as_ref().unwrap();
        assert_eq!(runtime.runtime, Some(RuntimeType::Podman));
        assert!(!runtime.insecure_registries);
        assert_eq!(config.shell(), "/bin/bash");
    }

    #[test]
    fn insecure_registries_must_be_asked_for() {
        let yaml = "name: app\nimage: registry.local:5000/app\nruntime:\n  runtime: podman\n  insecure_registries: true\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert!(config.runtime.unwrap().insecure_registries);
    }

    #[test]
    fn missing_name_returns_error() {
        let err = Config::from_yaml("image: nginx:latest\n").unwrap_err();
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn missing_image_returns_error() {
        let err = Config::from_yaml("name: pipelines\n").unwrap_err();
        assert!(err.to_string().contains("image"));
    }

    #[test]
    fn invalid_image_returns_error() {
        let yaml = r#"
name: pipelines
image: "invalid image!"
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("image"));
    }

    #[test]
    fn invalid_port_returns_error() {
        for port in ["0", "\"70000:80\"", "\"abc\"", "\"80:80/sctp\""] {
            let yaml = format!("name: pipelines\nimage: nginx\nports:\n  - {port}\n");
            let err = Config::from_yaml(&yaml).unwrap_err();
            assert!(
                err.to_string().contains("port"),
                "expected port error for {port}, got: {err}"
            );
        }
    }

    #[test]
    fn relative_volume_target_is_rejected() {
        let yaml = r#"
name: pipelines
image: nginx
volumes:
  - "/srv/data:data"
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn empty_command_is_rejected() {
        let yaml = r#"
name: pipelines
image: nginx
command: []
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }

    #[test]
    fn stop_timeout_beyond_engine_range_is_rejected() {
        let yaml = r#"
name: pipelines
image: nginx
stop:
  timeout: 100years
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("stop.timeout"), "got: {err}");
    }

    #[test]
    fn bad_extra_host_is_rejected() {
        let yaml = r#"
name: pipelines
image: nginx
extra_hosts:
  - "host.docker.internal:not-an-ip"
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }
}

mod env_vars {
    use super::*;

    #[test]
    fn env_reference_with_default() {
        let yaml = r#"
name: pipelines
image: nginx
env:
  OPTIONAL:
    env: OPTIONAL_VAR
    default: "fallback"
"#;
        let config = Config::from_yaml(yaml).unwrap();
        match config.env.get("OPTIONAL") {
            Some(EnvValue::FromEnv {
                var,
                default: Some(def),
            }) => {
                assert_eq!(var, "OPTIONAL_VAR");
                assert_eq!(def, "fallback");
            }
            _ => panic!("Expected FromEnv with default"),
        }
    }

    #[test]
    fn secret_reference() {
        let yaml = r#"
name: pipelines
image: nginx
env:
  GROK_API_KEY: { secret: { service: grok, account: api-key } }
"#;
        let config = Config::from_yaml(yaml).unwrap();
        match config.env.get("GROK_API_KEY") {
            Some(EnvValue::FromSecret { secret }) => {
                assert_eq!(secret.service, "grok");
                assert_eq!(secret.account, "api-key");
            }
            _ => panic!("Expected FromSecret variant"),
        }
    }

    #[test]
    fn resolve_env_values() {
        let mut env_map = HashMap::new();
        env_map.insert("KEY".to_string(), EnvValue::Literal("literal".to_string()));
        env_map.insert(
            "FROM_ENV".to_string(),
            EnvValue::FromEnv {
                var: "DOCKHAND_TEST_VAR".to_string(),
                default: None,
            },
        );
        env_map.insert(
            "WITH_DEFAULT".to_string(),
            EnvValue::FromEnv {
                var: "DOCKHAND_MISSING_VAR".to_string(),
                default: Some("default_value".to_string()),
            },
        );
        let secrets = StaticSecretSource::new();

        temp_env::with_vars(
            [
                ("DOCKHAND_TEST_VAR", Some("from_environment")),
                ("DOCKHAND_MISSING_VAR", None),
            ],
            || {
                let resolved = block_on(resolve_env_map(&env_map, &secrets)).unwrap();

                assert_eq!(resolved.get("KEY"), Some(&"literal".to_string()));
                assert_eq!(
                    resolved.get("FROM_ENV"),
                    Some(&"from_environment".to_string())
                );
                assert_eq!(
                    resolved.get("WITH_DEFAULT"),
                    Some(&"default_value".to_string())
                );
            },
        );
    }

    #[test]
    fn missing_env_var_without_default_fails() {
        let mut env_map = HashMap::new();
        env_map.insert(
            "TOKEN".to_string(),
            EnvValue::FromEnv {
                var: "DOCKHAND_UNSET_VAR".to_string(),
                default: None,
            },
        );

        temp_env::with_var_unset("DOCKHAND_UNSET_VAR", || {
            let err = block_on(resolve_env_map(&env_map, &StaticSecretSource::new())).unwrap_err();
            assert!(matches!(err, EnvError::MissingVar(ref v) if v == "DOCKHAND_UNSET_VAR"));
        });
    }

    #[test]
    fn secrets_resolve_through_the_source() {
        let mut env_map = HashMap::new();
        env_map.insert(
            "GROK_API_KEY".to_string(),
            EnvValue::FromSecret {
                secret: dockhand::secrets::SecretRef {
                    service: "grok".to_string(),
                    account: "api-key".to_string(),
                },
            },
        );
        let secrets = StaticSecretSource::new().with("grok", "api-key", "xai-123");

        let resolved = block_on(resolve_env_map(&env_map, &secrets)).unwrap();

        assert_eq!(resolved["GROK_API_KEY"], "xai-123");
    }

    #[test]
    fn first_failing_variable_in_name_order_is_reported() {
        let secret = |service: &str| EnvValue::FromSecret {
            secret: dockhand::secrets::SecretRef {
                service: service.to_string(),
                account: "key".to_string(),
            },
        };
        let mut env_map = HashMap::new();
        env_map.insert("Z_KEY".to_string(), secret("z"));
        env_map.insert("B_KEY".to_string(), secret("b"));
        env_map.insert("A_KEY".to_string(), secret("a"));
        let secrets = StaticSecretSource::new().with("a", "key", "value");

        let err = block_on(resolve_env_map(&env_map, &secrets)).unwrap_err();

        match err {
            EnvError::Secret { variable, .. } => assert_eq!(variable, "B_KEY"),
            other => panic!("expected secret error, got {other}"),
        }
    }
}

mod discovery {
    use super::*;

    const MINIMAL: &str = "name: pipelines\nimage: nginx\n";

    #[test]
    fn finds_primary_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILENAME), MINIMAL).unwrap();

        let config = Config::discover(dir.path()).unwrap();

        assert_eq!(config.name.as_str(), "pipelines");
    }

    #[test]
    fn finds_alternate_and_directory_files() {
        let alt = tempfile::tempdir().unwrap();
        std::fs::write(alt.path().join(CONFIG_FILENAME_ALT), MINIMAL).unwrap();
        assert!(Config::discover(alt.path()).is_ok());

        let nested = tempfile::tempdir().unwrap();
        std::fs::create_dir(nested.path().join(".dockhand")).unwrap();
        std::fs::write(nested.path().join(CONFIG_FILENAME_DIR), MINIMAL).unwrap();
        assert!(Config::discover(nested.path()).is_ok());
    }

    #[test]
    fn missing_file_is_config_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let err = Config::discover(dir.path()).unwrap_err();

        assert!(matches!(err, dockhand::error::Error::ConfigNotFound(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn relative_volumes_resolve_against_the_project_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".dockhand")).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILENAME_DIR),
            "name: pipelines\nimage: nginx\nvolumes:\n  - \"./pipelines:/app/pipelines\"\n",
        )
        .unwrap();

        let config = Config::discover(dir.path()).unwrap();
        let mounts = config.volume_mounts().unwrap();

        assert_eq!(Path::new(&mounts[0].source), dir.path().join("pipelines"));
        assert_eq!(mounts[0].target, "/app/pipelines");
    }
}

mod overrides {
    use super::*;

    fn config(yaml: &str) -> Config {
        Config::from_yaml(yaml).unwrap()
    }

    #[test]
    fn port_replaces_first_host_port_only() {
        let mut config = config(
            "name: pipelines\nimage: nginx\nports:\n  - \"9099:9099\"\n  - \"8080:80\"\n",
        );

        config
            .apply_overrides(&Overrides {
                port: Some(9100),
                ..Overrides::default()
            })
            .unwrap();

        assert_eq!(config.ports[0].host_port, Some(9100));
        assert_eq!(config.ports[0].container_port, 9099);
        assert_eq!(config.ports[1].host_port, Some(8080));
    }

    #[test]
    fn port_without_mappings_adds_one() {
        let mut config = config("name: pipelines\nimage: nginx\n");

        config
            .apply_overrides(&Overrides {
                port: Some(9099),
                ..Overrides::default()
            })
            .unwrap();

        assert_eq!(config.ports.len(), 1);
        assert_eq!(config.ports[0].host_port, Some(9099));
        assert_eq!(config.ports[0].container_port, 9099);
    }

    #[test]
    fn name_and_image_override_the_file() {
        let mut config = config("name: pipelines\nimage: nginx\n");

        config
            .apply_overrides(&Overrides {
                name: Some("staging".to_string()),
                image: Some("ghcr.io/open-webui/pipelines:dev".to_string()),
                port: None,
            })
            .unwrap();

        assert_eq!(config.name.as_str(), "staging");
        assert_eq!(config.image.tag(), Some("dev"));
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let mut config = config("name: pipelines\nimage: nginx\n");

        let bad_name = Overrides {
            name: Some("-bad".to_string()),
            ..Overrides::default()
        };
        assert!(config.apply_overrides(&bad_name).is_err());

        let zero_port = Overrides {
            port: Some(0),
            ..Overrides::default()
        };
        assert!(config.apply_overrides(&zero_port).is_err());
    }
}

mod restart_policy {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parse_no_and_never() {
        assert_eq!(RestartPolicy::from_str("no").unwrap(), RestartPolicy::No);
        assert_eq!(RestartPolicy::from_str("never").unwrap(), RestartPolicy::No);
    }

    #[test]
    fn parse_always() {
        assert_eq!(
            RestartPolicy::from_str("always").unwrap(),
            RestartPolicy::Always
        );
    }

    #[test]
    fn parse_on_failure_with_retries() {
        assert_eq!(
            RestartPolicy::from_str("on-failure:3").unwrap(),
            RestartPolicy::OnFailure {
                max_retries: Some(3)
            }
        );
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(RestartPolicy::from_str("sometimes").is_err());
    }

    #[test]
    fn default_is_unless_stopped() {
        assert_eq!(RestartPolicy::default(), RestartPolicy::UnlessStopped);
    }
}

mod init {
    use super::*;

    #[test]
    fn init_writes_a_loadable_template() {
        let dir = tempfile::tempdir().unwrap();

        let path = init_config(dir.path(), None, None, false).unwrap();
        let config = Config::load(&path).unwrap();

        assert_eq!(config.name.as_str(), "pipelines");
        assert_eq!(config.ports[0].host_port, Some(9099));
        assert_eq!(config.restart, RestartPolicy::Always);
    }

    #[test]
    fn init_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        init_config(dir.path(), None, None, false).unwrap();

        let err = init_config(dir.path(), None, None, false).unwrap_err();
        assert!(matches!(err, dockhand::error::Error::AlreadyExists(_)));

        assert!(init_config(dir.path(), None, None, true).is_ok());
    }
}
