//! Pick the host a task works on.
//!
//! Every task calls [`resolve`] first. Precedence: an explicit host, then a
//! named profile, then the registry's default profile. Per-field overrides
//! (port, user, key, insecure) are layered over whichever was chosen.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::types::{ConnectionConfig, HostRegistry, ProfileName};

/// Connection fields given on the command line or in the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetOverrides {
    pub profile: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub key_file: Option<PathBuf>,
    /// Only ever turns insecure mode on; a profile marked insecure stays so.
    pub insecure: bool,
}

pub fn resolve(
    overrides: &TargetOverrides,
    registry: &HostRegistry,
) -> Result<ConnectionConfig, ConfigError> {
    let base = if let Some(host) = &overrides.host {
        ConnectionConfig::new(host.clone())
    } else if let Some(name) = &overrides.profile {
        registry
            .get(&ProfileName::from(name.as_str()))
            .ok_or_else(|| ConfigError::UnknownProfile(name.clone()))?
            .to_config()
    } else {
        let profile = registry.default_profile().ok_or(ConfigError::NoTarget)?;
        tracing::debug!(profile = %profile.name, "falling back to default profile");
        profile.to_config()
    };

    let mut config = base;
    if let Some(port) = overrides.port {
        config.port = port;
    }
    if let Some(user) = &overrides.user {
        config.user = user.clone();
    }
    if let Some(key) = &overrides.key_file {
        config.key_file = Some(key.clone());
    }
    config.insecure |= overrides.insecure;

    config.destination()?;
    Ok(config)
}
