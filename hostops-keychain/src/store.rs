//! Credential storage backends.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::CredentialError;

/// Secrets keyed by (system, username).
pub trait CredentialStore {
    /// `Ok(None)` when nothing is stored; that is not an error.
    fn get(&self, system: &str, username: &str) -> Result<Option<String>, CredentialError>;

    fn set(&self, system: &str, username: &str, password: &str) -> Result<(), CredentialError>;

    /// Remove a stored secret. Succeeds if there was none.
    fn delete(&self, system: &str, username: &str) -> Result<(), CredentialError>;
}

/// OS keychain (macOS Keychain, Secret Service, Windows Credential Manager).
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyringStore;

impl KeyringStore {
    fn entry(system: &str, username: &str) -> Result<keyring::Entry, CredentialError> {
        keyring::Entry::new(system, username).map_err(|source| store_err(system, username, source))
    }
}

impl CredentialStore for KeyringStore {
    fn get(&self, system: &str, username: &str) -> Result<Option<String>, CredentialError> {
        match Self::entry(system, username)?.get_password() {
            Ok(password) => Ok(Some(password)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(source) => Err(store_err(system, username, source)),
        }
    }

    fn set(&self, system: &str, username: &str, password: &str) -> Result<(), CredentialError> {
        Self::entry(system, username)?
            .set_password(password)
            .map_err(|source| store_err(system, username, source))
    }

    fn delete(&self, system: &str, username: &str) -> Result<(), CredentialError> {
        match Self::entry(system, username)?.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(source) => Err(store_err(system, username, source)),
        }
    }
}

fn store_err(system: &str, username: &str, source: keyring::Error) -> CredentialError {
    CredentialError::Store {
        system: system.to_string(),
        username: username.to_string(),
        source,
    }
}

/// In-process store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<(String, String), String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, system: &str, username: &str) -> Result<Option<String>, CredentialError> {
        Ok(self
            .entries
            .borrow()
            .get(&(system.to_string(), username.to_string()))
            .cloned())
    }

    fn set(&self, system: &str, username: &str, password: &str) -> Result<(), CredentialError> {
        self.entries
            .borrow_mut()
            .insert((system.to_string(), username.to_string()), password.to_string());
        Ok(())
    }

    fn delete(&self, system: &str, username: &str) -> Result<(), CredentialError> {
        self.entries
            .borrow_mut()
            .remove(&(system.to_string(), username.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip_and_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("s", "u").unwrap(), None);
        store.set("s", "u", "pw").unwrap();
        assert_eq!(store.get("s", "u").unwrap().as_deref(), Some("pw"));
        store.delete("s", "u").unwrap();
        assert_eq!(store.get("s", "u").unwrap(), None);
        store.delete("s", "u").expect("deleting twice is fine");
    }
}
