// ABOUTME: Secret sources keyed by (service, account).
// ABOUTME: Command-backed lookups via Keychain or libsecret, plus a static map for tests.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tokio::process::Command;

/// Where a secret lives in the external store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct SecretRef {
    pub service: String,
    pub account: String,
}

impl fmt::Display for SecretRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.account)
    }
}

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("no secret stored for service '{service}', account '{account}'")]
    NotFound { service: String, account: String },

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with status {status}: {stderr}")]
    Command {
        program: String,
        status: i32,
        stderr: String,
    },

    #[error("secret for service '{service}' is not valid UTF-8")]
    InvalidUtf8 { service: String },
}

/// A provider of credentials. Values are fetched on every call, never cached.
#[async_trait]
pub trait SecretSource: Send + Sync {
    async fn get(&self, service: &str, account: &str) -> Result<String, SecretError>;
}

/// Which command-line secret store to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecretProvider {
    /// macOS Keychain via `security find-generic-password`.
    Keychain,
    /// freedesktop Secret Service via `secret-tool lookup`.
    SecretTool,
}

impl Default for SecretProvider {
    fn default() -> Self {
        if cfg!(target_os = "macos") {
            SecretProvider::Keychain
        } else {
            SecretProvider::SecretTool
        }
    }
}

impl fmt::Display for SecretProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretProvider::Keychain => write!(f, "keychain"),
            SecretProvider::SecretTool => write!(f, "secret-tool"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretsConfig {
    #[serde(default)]
    pub provider: SecretProvider,
}

/// Looks secrets up by running the provider's command-line tool.
#[derive(Debug, Clone)]
pub struct CommandSecretSource {
    provider: SecretProvider,
}

impl CommandSecretSource {
    pub fn new(provider: SecretProvider) -> Self {
        Self { provider }
    }

    fn command(&self, service: &str, account: &str) -> (&'static str, Vec<String>) {
        match self.provider {
            SecretProvider::Keychain => (
                "security",
                vec![
                    "find-generic-password".to_string(),
                    "-s".to_string(),
                    service.to_string(),
                    "-a".to_string(),
                    account.to_string(),
                    "-w".to_string(),
                ],
            ),
            SecretProvider::SecretTool => (
                "secret-tool",
                vec![
                    "lookup".to_string(),
                    "service".to_string(),
                    service.to_string(),
                    "account".to_string(),
                    account.to_string(),
                ],
            ),
        }
    }
}

#[async_trait]
impl SecretSource for CommandSecretSource {
    async fn get(&self, service: &str, account: &str) -> Result<String, SecretError> {
        let (program, args) = self.command(service, account);
        tracing::debug!(program, service, account, "looking up secret");

        let output = Command::new(program)
            .args(&args)
            .output()
            .await
            .map_err(|source| SecretError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            // Both tools exit non-zero with nothing useful on stdout when the item is missing.
            return match output.status.code() {
                Some(1) | Some(44) => Err(SecretError::NotFound {
                    service: service.to_string(),
                    account: account.to_string(),
                }),
                code => Err(SecretError::Command {
                    program: program.to_string(),
                    status: code.unwrap_or(-1),
                    stderr,
                }),
            };
        }

        let value = String::from_utf8(output.stdout).map_err(|_| SecretError::InvalidUtf8 {
            service: service.to_string(),
        })?;
        let value = value.trim_end_matches(['\r', '\n']).to_string();

        // secret-tool exits 0 with empty output on some versions when nothing matches.
        if value.is_empty() {
            return Err(SecretError::NotFound {
                service: service.to_string(),
                account: account.to_string(),
            });
        }

        Ok(value)
    }
}

/// Fixed in-memory secrets.
#[derive(Debug, Clone, Default)]
pub struct StaticSecretSource {
    values: HashMap<(String, String), String>,
}

impl StaticSecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, service: &str, account: &str, value: &str) -> Self {
        self.values
            .insert((service.to_string(), account.to_string()), value.to_string());
        self
    }
}

#[async_trait]
impl SecretSource for StaticSecretSource {
    async fn get(&self, service: &str, account: &str) -> Result<String, SecretError> {
        self.values
            .get(&(service.to_string(), account.to_string()))
            .cloned()
            .ok_or_else(|| SecretError::NotFound {
                service: service.to_string(),
                account: account.to_string(),
            })
    }
}
