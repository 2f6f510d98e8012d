//! Error types for hostops-keychain.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The OS keychain refused or failed the operation.
    #[error("credential store error for {system}/{username}: {source}")]
    Store {
        system: String,
        username: String,
        #[source]
        source: keyring::Error,
    },

    /// Reading the password from the terminal failed.
    #[error("failed to read password: {0}")]
    Prompt(#[from] std::io::Error),
}
