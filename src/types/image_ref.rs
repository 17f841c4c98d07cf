// ABOUTME: Parsed container image reference: [registry/]repository[:tag][@digest].
// ABOUTME: Untagged, undigested references resolve to the `latest` tag.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Tag assumed when a reference names neither a tag nor a digest.
pub const DEFAULT_TAG: &str = "latest";

#[derive(Debug, Error)]
pub enum ParseImageRefError {
    #[error("image reference cannot be empty")]
    Empty,

    #[error("invalid character in image reference: {0}")]
    InvalidChar(char),

    #[error("invalid image reference format: {0}")]
    InvalidFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    registry: Option<String>,
    repository: String,
    tag: Option<String>,
    digest: Option<String>,
}

fn is_reference_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | ':' | '.' | '-' | '_' | '@')
}

/// `repo@algo:hex` -> (`repo`, `algo:hex`).
fn split_digest(input: &str) -> Result<(&str, Option<&str>), ParseImageRefError> {
    let Some((locator, digest)) = input.split_once('@') else {
        return Ok((input, None));
    };
    match digest.split_once(':') {
        Some((algo, hex)) if !algo.is_empty() && !hex.is_empty() && !hex.contains('@') => {
            Ok((locator, Some(digest)))
        }
        _ => Err(ParseImageRefError::InvalidFormat(input.to_string())),
    }
}

/// Only a colon after the last `/` starts a tag; earlier ones belong to a registry port.
fn split_tag(locator: &str) -> (&str, Option<&str>) {
    let last_segment = locator.rfind('/').map_or(0, |i| i + 1);
    match locator[last_segment..].find(':') {
        Some(i) => {
            let colon = last_segment + i;
            (&locator[..colon], Some(&locator[colon + 1..]))
        }
        None => (locator, None),
    }
}

/// The first path component is a registry host when it looks like one.
fn split_registry(path: &str) -> (Option<&str>, &str) {
    match path.split_once('/') {
        Some((host, rest)) if host.contains(['.', ':']) || host == "localhost" => {
            (Some(host), rest)
        }
        _ => (None, path),
    }
}

impl ImageRef {
    pub fn parse(input: &str) -> Result<Self, ParseImageRefError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ParseImageRefError::Empty);
        }
        if let Some(c) = input.chars().find(|c| !is_reference_char(*c)) {
            return Err(ParseImageRefError::InvalidChar(c));
        }

        let invalid = || ParseImageRefError::InvalidFormat(input.to_string());

        let (locator, digest) = split_digest(input)?;
        let (path, tag) = split_tag(locator);
        if tag.is_some_and(|t| t.is_empty() || t.contains(':')) {
            return Err(invalid());
        }
        let (registry, repository) = split_registry(path);
        if repository.split('/').any(str::is_empty) {
            return Err(invalid());
        }

        let tag = match (tag, digest) {
            (None, None) => Some(DEFAULT_TAG),
            (tag, _) => tag,
        };

        Ok(Self {
            registry: registry.map(str::to_string),
            repository: repository.to_string(),
            tag: tag.map(str::to_string),
            digest: digest.map(str::to_string),
        })
    }

    pub fn registry(&self) -> Option<&str> {
        self.registry.as_deref()
    }

    /// Repository path without the registry, e.g. `open-webui/pipelines`.
    pub fn name(&self) -> &str {
        &self.repository
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }
}

impl FromStr for ImageRef {
    type Err = ParseImageRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.registry {
            Some(registry) => write!(f, "{registry}/{}", self.repository)?,
            None => f.write_str(&self.repository)?,
        }
        if let Some(tag) = &self.tag {
            write!(f, ":{tag}")?;
        }
        if let Some(digest) = &self.digest {
            write!(f, "@{digest}")?;
        }
        Ok(())
    }
}

impl Serialize for ImageRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ImageRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
