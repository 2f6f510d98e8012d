//! Saved host profiles.
//!
//! # Storage layout
//!
//! ```text
//! ~/.hostops/
//!   hosts.yaml      (mode 0600, directory mode 0700)
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home, used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must never call the no-arg wrappers.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::{io_err, ConfigError};
use crate::types::{HostProfile, HostRegistry, ProfileName};

// ---------------------------------------------------------------------------
// 1. Paths
// ---------------------------------------------------------------------------

/// `<home>/.hostops/hosts.yaml`. Pure, no I/O.
pub fn registry_path_at(home: &Path) -> PathBuf {
    home.join(".hostops").join("hosts.yaml")
}

fn ensure_dir(home: &Path) -> Result<PathBuf, ConfigError> {
    let dir = home.join(".hostops");
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

// ---------------------------------------------------------------------------
// 2. Load / save
// ---------------------------------------------------------------------------

/// Load the registry; a missing file is an empty registry.
pub fn load_at(home: &Path) -> Result<HostRegistry, ConfigError> {
    let path = registry_path_at(home);
    if !path.exists() {
        return Ok(HostRegistry::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<HostRegistry, ConfigError> {
    load_at(&home()?)
}

/// Atomically save the registry: serialize → `hosts.yaml.tmp` → `chmod 0600` → `rename`.
pub fn save_at(home: &Path, registry: &HostRegistry) -> Result<(), ConfigError> {
    ensure_dir(home)?;
    let path = registry_path_at(home);
    let tmp = path.with_file_name("hosts.yaml.tmp");

    let yaml = serde_yaml::to_string(registry)?;
    std::fs::write(&tmp, yaml).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(&path, e));
    }
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(registry: &HostRegistry) -> Result<(), ConfigError> {
    save_at(&home()?, registry)
}

// ---------------------------------------------------------------------------
// 3. Mutations
// ---------------------------------------------------------------------------

/// Fields for a new profile; `added_at` is stamped on insert.
#[derive(Debug, Clone, Default)]
pub struct NewProfile {
    pub host: String,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub key_file: Option<PathBuf>,
    pub insecure: bool,
}

/// Add a profile, replacing any existing profile with the same name.
///
/// The first profile ever added becomes the default.
pub fn add_profile_at(
    home: &Path,
    name: ProfileName,
    new: NewProfile,
) -> Result<HostProfile, ConfigError> {
    let mut registry = load_at(home)?;
    let profile = HostProfile {
        name: name.clone(),
        host: new.host,
        port: new.port.unwrap_or(crate::types::DEFAULT_SSH_PORT),
        user: new.user,
        key_file: new.key_file,
        insecure: new.insecure,
        added_at: Utc::now(),
    };
    profile.to_config().destination()?;

    registry.profiles.retain(|p| p.name != name);
    registry.profiles.push(profile.clone());
    registry.profiles.sort_by(|a, b| a.name.0.cmp(&b.name.0));
    if registry.default.is_none() {
        registry.default = Some(name);
    }
    save_at(home, &registry)?;
    Ok(profile)
}

/// `add_profile_at` convenience wrapper.
pub fn add_profile(name: ProfileName, new: NewProfile) -> Result<HostProfile, ConfigError> {
    add_profile_at(&home()?, name, new)
}

/// Remove a profile. Clears the default if it pointed at it.
pub fn remove_profile_at(home: &Path, name: &ProfileName) -> Result<HostProfile, ConfigError> {
    let mut registry = load_at(home)?;
    let idx = registry
        .profiles
        .iter()
        .position(|p| &p.name == name)
        .ok_or_else(|| ConfigError::UnknownProfile(name.0.clone()))?;
    let removed = registry.profiles.remove(idx);
    if registry.default.as_ref() == Some(name) {
        registry.default = None;
    }
    save_at(home, &registry)?;
    Ok(removed)
}

/// `remove_profile_at` convenience wrapper.
pub fn remove_profile(name: &ProfileName) -> Result<HostProfile, ConfigError> {
    remove_profile_at(&home()?, name)
}

/// Make `name` the fallback profile used when no target is given.
pub fn set_default_at(home: &Path, name: &ProfileName) -> Result<(), ConfigError> {
    let mut registry = load_at(home)?;
    if registry.get(name).is_none() {
        return Err(ConfigError::UnknownProfile(name.0.clone()));
    }
    registry.default = Some(name.clone());
    save_at(home, &registry)
}

/// `set_default_at` convenience wrapper.
pub fn set_default(name: &ProfileName) -> Result<(), ConfigError> {
    set_default_at(&home()?, name)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), ConfigError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), ConfigError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
