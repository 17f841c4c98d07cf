// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Turns port and extra-host strings into validated mappings at load time.

use serde::Deserialize;

use super::mapping::{parse_extra_host, parse_port_mapping};
use crate::runtime::{ExtraHost, PortMapping};

pub fn deserialize_ports<'de, D>(deserializer: D) -> Result<Vec<PortMapping>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<PortEntry> = Vec::deserialize(deserializer)?;
    values
        .into_iter()
        .map(|entry| parse_port_mapping(&entry.into_string()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}

pub fn deserialize_extra_hosts<'de, D>(deserializer: D) -> Result<Vec<ExtraHost>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<String> = Vec::deserialize(deserializer)?;
    values
        .iter()
        .map(|s| parse_extra_host(s))
        .collect::<Result<Vec<_>, _>>()
        .map_err(serde::de::Error::custom)
}

/// YAML reads an unquoted `9099` as a number; accept both forms.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PortEntry {
    Number(u16),
    Text(String),
}

impl PortEntry {
    fn into_string(self) -> String {
        match self {
            PortEntry::Number(n) => n.to_string(),
            PortEntry::Text(s) => s,
        }
    }
}
