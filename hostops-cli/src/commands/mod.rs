pub mod hosts;
pub mod password;
pub mod remote;
pub mod sync;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use hostops_core::{registry, resolve, ConnectionConfig, Session, SshRunner, TargetOverrides};

/// Which host to talk to. Accepted before or after the subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Saved host profile to use (see `hostops hosts`).
    #[arg(long, short = 'P', global = true, env = "HOSTOPS_PROFILE")]
    pub profile: Option<String>,

    /// Host name or address; takes precedence over any profile.
    #[arg(long, short = 'H', global = true, env = "HOSTOPS_HOST")]
    pub host: Option<String>,

    /// ssh port.
    #[arg(long, short = 'p', global = true, env = "HOSTOPS_PORT")]
    pub port: Option<u16>,

    /// Remote login name. Defaults to the local user.
    #[arg(long, short = 'u', global = true, env = "HOSTOPS_USER")]
    pub user: Option<String>,

    /// Private key passed to ssh with `-i`.
    #[arg(long = "key-file", short = 'i', global = true, env = "HOSTOPS_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    /// Skip host-key verification (for throwaway machines that get rebuilt).
    #[arg(long, global = true, env = "HOSTOPS_INSECURE")]
    pub insecure: bool,
}

impl From<&TargetArgs> for TargetOverrides {
    fn from(args: &TargetArgs) -> Self {
        TargetOverrides {
            profile: args.profile.clone(),
            host: args.host.clone(),
            port: args.port,
            user: args.user.clone(),
            key_file: args.key_file.clone(),
            insecure: args.insecure,
        }
    }
}

/// Resolve the target against the saved profiles.
pub fn resolve_target(target: &TargetArgs) -> Result<ConnectionConfig> {
    let registry = registry::load().context("failed to load host profiles")?;
    let config = resolve(&TargetOverrides::from(target), &registry)?;
    tracing::debug!(destination = %config, insecure = config.insecure, "resolved target");
    Ok(config)
}

/// Resolved config plus a session echoing to stdout.
pub fn connect(target: &TargetArgs) -> Result<(ConnectionConfig, Session<SshRunner>)> {
    let config = resolve_target(target)?;
    let session = Session::new(SshRunner::new(config.clone()));
    Ok((config, session))
}
