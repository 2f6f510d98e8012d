//! Masked password input.

use crate::error::CredentialError;

/// Asks the user for a secret without echoing it.
pub trait Prompter {
    fn prompt_masked(&self, prompt: &str) -> Result<String, CredentialError>;
}

/// Reads from the controlling terminal via `rpassword`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn prompt_masked(&self, prompt: &str) -> Result<String, CredentialError> {
        Ok(rpassword::prompt_password(prompt)?)
    }
}
