// ABOUTME: Environment variable value types with interpolation support.
// ABOUTME: Literal values, references to the invoking environment, and stored secrets.

use crate::secrets::{SecretError, SecretRef, SecretSource};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
    FromSecret {
        secret: SecretRef,
    },
}

#[derive(Debug, Error)]
pub enum EnvError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("secret for {variable} ({secret}) unavailable: {source}")]
    Secret {
        variable: String,
        secret: SecretRef,
        #[source]
        source: SecretError,
    },
}

impl EnvValue {
    /// Resolve to a concrete value. `name` is the container variable being set.
    pub async fn resolve(
        &self,
        name: &str,
        secrets: &dyn SecretSource,
    ) -> Result<String, EnvError> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) => Ok(val),
                Err(_) => default
                    .clone()
                    .ok_or_else(|| EnvError::MissingVar(var.clone())),
            },
            EnvValue::FromSecret { secret } => secrets
                .get(&secret.service, &secret.account)
                .await
                .map_err(|source| EnvError::Secret {
                    variable: name.to_string(),
                    secret: secret.clone(),
                    source,
                }),
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, EnvValue::FromSecret { .. })
    }
}

/// Resolve every value, stopping at the first failure.
///
/// Variables are resolved in name order so failures are reported deterministically.
pub async fn resolve_env_map(
    map: &HashMap<String, EnvValue>,
    secrets: &dyn SecretSource,
) -> Result<HashMap<String, String>, EnvError> {
    let ordered: BTreeMap<&String, &EnvValue> = map.iter().collect();
    let mut resolved = HashMap::with_capacity(map.len());
    for (name, value) in ordered {
        resolved.insert(name.clone(), value.resolve(name, secrets).await?);
    }
    Ok(resolved)
}
