//! Connection parameters and host-profile types.
//!
//! All path fields use `PathBuf`. Registry types are serializable via
//! serde + serde_yaml.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SSH_PORT: u16 = 22;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed name for a saved host profile.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileName(pub String);

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProfileName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProfileName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Connection parameters
// ---------------------------------------------------------------------------

/// Everything needed to reach one remote host.
///
/// Built once per invocation (see [`crate::resolve`]) and passed by reference
/// to every task; nothing in the core mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub key_file: Option<PathBuf>,
    /// Skip host-key verification (fresh VMs, rebuilt hosts).
    pub insecure: bool,
    pub connect_timeout: Duration,
}

impl ConnectionConfig {
    /// Config for `host` with the local user name and default port/timeout.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_SSH_PORT,
            user: local_user(),
            key_file: None,
            insecure: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_key_file(mut self, key_file: impl Into<PathBuf>) -> Self {
        self.key_file = Some(key_file.into());
        self
    }

    pub fn with_insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// `user@host`, after validating both parts.
    ///
    /// The result is placed directly into an argv, so the only things to
    /// reject are values `ssh` would read as options or that carry
    /// whitespace/control characters.
    pub fn destination(&self) -> Result<String, ConfigError> {
        validate_token("host", &self.host)?;
        validate_token("user", &self.user)?;
        Ok(format!("{}@{}", self.user, self.host))
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.user, self.host, self.port)
    }
}

/// Reject values that are empty, look like options, or carry whitespace or
/// control characters. `user` values additionally may not contain `@`.
pub fn validate_token(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let invalid = |reason| ConfigError::Invalid {
        field,
        value: value.to_owned(),
        reason,
    };
    if value.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value.starts_with('-') {
        return Err(invalid("must not start with '-'"));
    }
    if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid("must not contain whitespace or control characters"));
    }
    if field == "user" && value.contains('@') {
        return Err(invalid("must not contain '@'"));
    }
    Ok(())
}

/// Local login name, used when no user is configured.
pub fn local_user() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "root".to_string())
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// A named, saved set of connection parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostProfile {
    pub name: ProfileName,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
    #[serde(default)]
    pub insecure: bool,
    pub added_at: DateTime<Utc>,
}

impl HostProfile {
    pub fn to_config(&self) -> ConnectionConfig {
        let mut config = ConnectionConfig::new(self.host.clone())
            .with_port(self.port)
            .with_insecure(self.insecure);
        if let Some(user) = &self.user {
            config = config.with_user(user.clone());
        }
        if let Some(key) = &self.key_file {
            config = config.with_key_file(key.clone());
        }
        config
    }
}

fn default_port() -> u16 {
    DEFAULT_SSH_PORT
}

/// Root of `~/.hostops/hosts.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRegistry {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<ProfileName>,
    #[serde(default)]
    pub profiles: Vec<HostProfile>,
}

impl Default for HostRegistry {
    fn default() -> Self {
        Self {
            version: 1,
            default: None,
            profiles: Vec::new(),
        }
    }
}

impl HostRegistry {
    pub fn get(&self, name: &ProfileName) -> Option<&HostProfile> {
        self.profiles.iter().find(|p| &p.name == name)
    }

    pub fn default_profile(&self) -> Option<&HostProfile> {
        self.default.as_ref().and_then(|name| self.get(name))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
