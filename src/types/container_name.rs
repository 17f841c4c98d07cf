// ABOUTME: Validated container name, the unique handle a container is managed by.
// ABOUTME: Enforces the engine's naming rules: [a-zA-Z0-9][a-zA-Z0-9_.-]*.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

const MAX_LEN: usize = 128;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerNameError {
    #[error("container name cannot be empty")]
    Empty,

    #[error("container name exceeds maximum length of {MAX_LEN} characters")]
    TooLong,

    #[error("container name must start with a letter or digit")]
    InvalidStart,

    #[error("invalid character in container name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContainerName(String);

impl ContainerName {
    pub fn new(value: &str) -> Result<Self, ContainerNameError> {
        // The engine reports names with a leading slash; accept that form too.
        let value = value.strip_prefix('/').unwrap_or(value);

        let mut chars = value.chars();
        let first = chars.next().ok_or(ContainerNameError::Empty)?;

        if value.len() > MAX_LEN {
            return Err(ContainerNameError::TooLong);
        }

        if !first.is_ascii_alphanumeric() {
            return Err(ContainerNameError::InvalidStart);
        }

        if let Some(c) = chars.find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '_' | '.' | '-'))
        {
            return Err(ContainerNameError::InvalidChar(c));
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ContainerName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContainerName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_engine_style_names() {
        for name in ["pipelines", "open-webui", "app_1.v2", "A1"] {
            assert!(ContainerName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn strips_leading_slash() {
        let name = ContainerName::new("/pipelines").unwrap();
        assert_eq!(name.as_str(), "pipelines");
    }

    #[test]
    fn rejects_invalid_names() {
        assert_eq!(ContainerName::new(""), Err(ContainerNameError::Empty));
        assert_eq!(
            ContainerName::new("-app"),
            Err(ContainerNameError::InvalidStart)
        );
        assert_eq!(
            ContainerName::new("my app"),
            Err(ContainerNameError::InvalidChar(' '))
        );
        assert_eq!(
            ContainerName::new(&"a".repeat(MAX_LEN + 1)),
            Err(ContainerNameError::TooLong)
        );
    }
}
