//! hostops: small remote-execution helpers over ssh.
//!
//! # Usage
//!
//! ```text
//! hostops [TARGET] uptime
//! hostops [TARGET] ssh
//! hostops [TARGET] ssh-forward <LPORT> <RPORT>
//! hostops [TARGET] exists <PATH> [--sudo] [--verbose]
//! hostops [TARGET] wait [--deadline SECS]
//! hostops [TARGET] sync <LOCAL> <REMOTE> [--delete] [--exclude P]... [--download] [--for-user U]
//! hostops password get|forget <SYSTEM> <USERNAME>
//! hostops hosts list|add|remove|default
//! ```
//!
//! TARGET is `--profile`, or `--host` with optional `--port`, `--user`,
//! `--key-file` and `--insecure`.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    hosts::HostsCommand,
    password::PasswordCommand,
    remote::{ExistsArgs, ForwardArgs, WaitArgs},
    sync::SyncArgs,
    TargetArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "hostops",
    version,
    about = "Run small maintenance tasks on remote hosts over ssh",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run `uptime` on the target host.
    Uptime,

    /// Open an interactive ssh session with agent forwarding.
    Ssh,

    /// Open an interactive ssh session tunnelling a local port to the host.
    SshForward(ForwardArgs),

    /// Check whether a remote file exists and is not empty (exit 0 yes, 1 no, 2 error).
    Exists(ExistsArgs),

    /// Block until the host accepts ssh and runs commands.
    Wait(WaitArgs),

    /// Sync a directory with the host via rsync.
    Sync(SyncArgs),

    /// Fetch or forget passwords kept in the OS keychain.
    Password {
        #[command(subcommand)]
        command: PasswordCommand,
    },

    /// Manage saved host profiles.
    Hosts {
        #[command(subcommand)]
        command: HostsCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    let target = &cli.target;
    match cli.command {
        Commands::Uptime => commands::remote::uptime(target).map(|()| ExitCode::SUCCESS),
        Commands::Ssh => commands::remote::ssh(target, None).map(|()| ExitCode::SUCCESS),
        Commands::SshForward(args) => args.run(target).map(|()| ExitCode::SUCCESS),
        Commands::Exists(args) => args.run(target),
        Commands::Wait(args) => args.run(target).map(|()| ExitCode::SUCCESS),
        Commands::Sync(args) => args.run(target).map(|()| ExitCode::SUCCESS),
        Commands::Password { command } => {
            commands::password::run(command).map(|()| ExitCode::SUCCESS)
        }
        Commands::Hosts { command } => {
            commands::hosts::run(command, target).map(|()| ExitCode::SUCCESS)
        }
    }
}

/// Diagnostics go to stderr so they never mix with command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
