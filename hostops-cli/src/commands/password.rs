//! `hostops password get|forget <SYSTEM> <USERNAME>`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use hostops_keychain::{get_password, CredentialStore, KeyringStore, TerminalPrompter};

#[derive(Subcommand, Debug)]
pub enum PasswordCommand {
    /// Print the stored password, asking for it first if none is stored.
    Get(GetArgs),

    /// Remove a stored password.
    Forget(ForgetArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// System the password belongs to (e.g. "nas", "mysql-prod").
    pub system: String,

    pub username: String,

    /// Prompt text shown when asking.
    #[arg(long)]
    pub prompt: Option<String>,
}

#[derive(Args, Debug)]
pub struct ForgetArgs {
    pub system: String,
    pub username: String,
}

pub fn run(cmd: PasswordCommand) -> Result<()> {
    match cmd {
        PasswordCommand::Get(args) => {
            let password = get_password(
                &KeyringStore,
                &TerminalPrompter,
                &args.system,
                &args.username,
                args.prompt.as_deref(),
            )
            .with_context(|| format!("failed to get password for {}/{}", args.system, args.username))?;
            println!("{password}");
            Ok(())
        }
        PasswordCommand::Forget(args) => {
            KeyringStore
                .delete(&args.system, &args.username)
                .with_context(|| {
                    format!("failed to forget password for {}/{}", args.system, args.username)
                })?;
            println!("✓ Forgot password for {}/{}", args.system, args.username);
            Ok(())
        }
    }
}
