// ABOUTME: Integration tests for type-safe identifiers and validated types.
// ABOUTME: Tests parsing, validation, and type safety properties.

use dockhand::types::*;

mod image_ref_tests {
    use super::*;

    #[test]
    fn parse_simple_name() {
        let img = ImageRef::parse("nginx").unwrap();
        assert_eq!(img.name(), "nginx");
        assert_eq!(img.tag(), Some("latest"));
        assert!(img.registry().is_none());
        assert!(img.digest().is_none());
    }

    #[test]
    fn parse_name_with_tag() {
        let img = ImageRef::parse("nginx:1.25").unwrap();
        assert_eq!(img.name(), "nginx");
        assert_eq!(img.tag(), Some("1.25"));
    }

    #[test]
    fn parse_with_registry() {
        let img = ImageRef::parse("registry.example.com/myapp:v1.2.3").unwrap();
        assert_eq!(img.registry(), Some("registry.example.com"));
        assert_eq!(img.name(), "myapp");
        assert_eq!(img.tag(), Some("v1.2.3"));
    }

    #[test]
    fn parse_with_org() {
        let img = ImageRef::parse("ghcr.io/org/repo:latest").unwrap();
        assert_eq!(img.registry(), Some("ghcr.io"));
        assert_eq!(img.name(), "org/repo");
        assert_eq!(img.tag(), Some("latest"));
    }

    #[test]
    fn parse_with_digest() {
        let digest = "sha256:abc123def456";
        let img = ImageRef::parse(&format!("nginx@{}", digest)).unwrap();
        assert_eq!(img.name(), "nginx");
        assert_eq!(img.digest(), Some(digest));
        assert!(img.tag().is_none());
    }

    #[test]
    fn parse_full_reference() {
        let img = ImageRef::parse("ghcr.io/org/repo:v1@sha256:abc123").unwrap();
        assert_eq!(img.registry(), Some("ghcr.io"));
        assert_eq!(img.name(), "org/repo");
        assert_eq!(img.tag(), Some("v1"));
        assert_eq!(img.digest(), Some("sha256:abc123"));
    }

    #[test]
    fn parse_empty_returns_error() {
        assert!(ImageRef::parse("").is_err());
    }

    #[test]
    fn parse_invalid_chars_returns_error() {
        assert!(ImageRef::parse("invalid image!").is_err());
    }

    #[test]
    fn display_formats_correctly() {
        let img = ImageRef::parse("ghcr.io/org/repo:v1").unwrap();
        assert_eq!(img.to_string(), "ghcr.io/org/repo:v1");
    }
}

mod container_name_tests {
    use super::*;

    #[test]
    fn valid_name() {
        let name = ContainerName::new("pipelines").unwrap();
        assert_eq!(name.as_str(), "pipelines");
        assert_eq!(name.to_string(), "pipelines");
    }

    #[test]
    fn empty_returns_error() {
        assert!(ContainerName::new("").is_err());
    }

    #[test]
    fn whitespace_returns_error() {
        assert!(ContainerName::new("   ").is_err());
        assert!(ContainerName::new("my service").is_err());
    }

    #[test]
    fn invalid_chars_returns_error() {
        assert!(ContainerName::new("my:service").is_err());
        assert!(ContainerName::new("my/service").is_err());
    }

    #[test]
    fn starts_with_separator_returns_error() {
        assert!(ContainerName::new("-service").is_err());
        assert!(ContainerName::new(".service").is_err());
        assert!(ContainerName::new("_service").is_err());
    }

    #[test]
    fn mixed_case_dots_and_underscores_are_valid() {
        assert!(ContainerName::new("Open_WebUI.pipelines-2").is_ok());
    }

    #[test]
    fn engine_reported_name_loses_its_slash() {
        assert_eq!(ContainerName::new("/pipelines").unwrap().as_str(), "pipelines");
    }

    #[test]
    fn deserializes_with_validation() {
        let name: ContainerName = serde_yaml::from_str("pipelines").unwrap();
        assert_eq!(name.as_str(), "pipelines");
        assert!(serde_yaml::from_str::<ContainerName>("\"-bad\"").is_err());
    }
}

mod id_tests {
    use super::*;

    #[test]
    fn container_id_stores_value() {
        let id = ContainerId::new("abc123".to_string());
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn image_id_stores_value() {
        let id = ImageId::new("sha256:abc".to_string());
        assert_eq!(id.as_str(), "sha256:abc");
    }

    #[test]
    fn short_id_drops_digest_prefix() {
        let id = ImageId::new("sha256:0123456789abcdef".to_string());
        assert_eq!(id.short(), "0123456789ab");
        let id = ContainerId::new("abc".to_string());
        assert_eq!(id.short(), "abc");
    }
}
