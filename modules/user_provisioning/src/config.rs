use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::resolver::DEFAULT_MAX_SUFFIX_ATTEMPTS;

/// Configuration for the user_provisioning module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserProvisioningConfig {
    /// Organization domain appended to every login (`<local>@<domain>`).
    pub domain: String,
    /// Password set on new accounts; users must change it on first sign-in.
    pub initial_password: String,
    #[serde(default = "default_max_suffix_attempts")]
    pub max_suffix_attempts: u32,
    #[serde(default)]
    pub directory: DirectoryConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DirectoryKind {
    #[default]
    Graph,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DirectoryConfig {
    #[serde(default)]
    pub kind: DirectoryKind,
    /// Falls back to `AZURE_TENANT_ID`.
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Falls back to `AZURE_CLIENT_ID`.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Falls back to `AZURE_CLIENT_SECRET`.
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_authority_url")]
    pub authority_url: String,
    #[serde(default = "default_graph_base_url")]
    pub graph_base_url: String,
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: u64,
    /// Logins pre-registered in the in-memory directory.
    #[serde(default)]
    pub taken_logins: Vec<String>,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            kind: DirectoryKind::default(),
            tenant_id: None,
            client_id: None,
            client_secret: None,
            authority_url: default_authority_url(),
            graph_base_url: default_graph_base_url(),
            timeout_sec: default_timeout_sec(),
            taken_logins: Vec::new(),
        }
    }
}

fn default_max_suffix_attempts() -> u32 {
    DEFAULT_MAX_SUFFIX_ATTEMPTS
}

fn default_authority_url() -> String {
    "https://login.microsoftonline.com".to_string()
}

fn default_graph_base_url() -> String {
    "https://graph.microsoft.com".to_string()
}

fn default_timeout_sec() -> u64 {
    30
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("user_provisioning.{field}: {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
}

fn invalid(field: &'static str, message: &'static str) -> ConfigError {
    ConfigError::Invalid { field, message }
}

/// Client-credentials settings for the Graph directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
    pub authority_url: String,
    pub graph_base_url: String,
    pub timeout_sec: u64,
}

impl UserProvisioningConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let domain = self.domain.trim();
        if domain.is_empty() {
            return Err(invalid("domain", "is required"));
        }
        if domain.contains('@') || domain.chars().any(char::is_whitespace) {
            return Err(invalid("domain", "must be a bare domain name"));
        }
        if self.initial_password.is_empty() {
            return Err(invalid("initial_password", "is required"));
        }
        if self.max_suffix_attempts == 0 {
            return Err(invalid("max_suffix_attempts", "must be at least 1"));
        }
        Ok(())
    }

    /// Graph settings with `AZURE_*` environment fallbacks applied.
    pub fn graph_settings(&self) -> Result<GraphSettings, ConfigError> {
        self.graph_settings_with(|key| std::env::var(key).ok())
    }

    pub(crate) fn graph_settings_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<GraphSettings, ConfigError> {
        let dir = &self.directory;
        let pick = |configured: &Option<String>, var: &str, field: &'static str| {
            configured
                .clone()
                .or_else(|| env(var))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| invalid(field, "is required for the graph directory"))
        };

        Ok(GraphSettings {
            tenant_id: pick(&dir.tenant_id, "AZURE_TENANT_ID", "directory.tenant_id")?,
            client_id: pick(&dir.client_id, "AZURE_CLIENT_ID", "directory.client_id")?,
            client_secret: pick(
                &dir.client_secret,
                "AZURE_CLIENT_SECRET",
                "directory.client_secret",
            )?,
            authority_url: dir.authority_url.trim_end_matches('/').to_string(),
            graph_base_url: dir.graph_base_url.trim_end_matches('/').to_string(),
            timeout_sec: dir.timeout_sec,
        })
    }
}
