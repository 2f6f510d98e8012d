//! # hostops-keychain
//!
//! Passwords kept in the OS keychain, asked for once.
//!
//! [`get_password`] returns the stored password for a (system, username)
//! pair, prompting with masked input and storing the answer the first time.

pub mod error;
pub mod prompt;
pub mod store;

pub use error::CredentialError;
pub use prompt::{Prompter, TerminalPrompter};
pub use store::{CredentialStore, KeyringStore, MemoryStore};

/// Fetch the password for `username` on `system`, prompting if none is stored.
///
/// An empty stored value counts as missing. The prompt defaults to
/// `Password for user '<username>': `. Whatever is entered is stored before
/// being returned.
pub fn get_password<S, P>(
    store: &S,
    prompter: &P,
    system: &str,
    username: &str,
    desc: Option<&str>,
) -> Result<String, CredentialError>
where
    S: CredentialStore + ?Sized,
    P: Prompter + ?Sized,
{
    if let Some(password) = store.get(system, username)? {
        if !password.is_empty() {
            tracing::debug!(system, username, "password found in credential store");
            return Ok(password);
        }
    }

    let default_desc = format!("Password for user '{username}': ");
    let password = prompter.prompt_masked(desc.unwrap_or(&default_desc))?;
    store.set(system, username, &password)?;
    tracing::debug!(system, username, "password stored in credential store");
    Ok(password)
}
