//! `uptime`, `ssh`, `ssh-forward`, `exists` and `wait`.

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use hostops_core::ssh::open_interactive;
use hostops_core::{exists, wait_for_shell_with, WaitOptions};

use super::{connect, resolve_target, TargetArgs};

pub fn uptime(target: &TargetArgs) -> Result<()> {
    let (config, session) = connect(target)?;
    session
        .run("uptime")
        .with_context(|| format!("uptime failed on {}", config.host))?;
    Ok(())
}

/// Interactive session; `forward` is `(local_port, remote_port)`.
pub fn ssh(target: &TargetArgs, forward: Option<(u16, u16)>) -> Result<()> {
    let config = resolve_target(target)?;
    let status = open_interactive(&config, forward)?;
    if !status.success() {
        match status.code() {
            Some(code) => bail!("ssh to {} exited with status {code}", config.host),
            None => bail!("ssh to {} was terminated by a signal", config.host),
        }
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct ForwardArgs {
    /// Local port to listen on.
    pub local_port: u16,

    /// Port on the remote host's loopback interface.
    pub remote_port: u16,
}

impl ForwardArgs {
    pub fn run(&self, target: &TargetArgs) -> Result<()> {
        ssh(target, Some((self.local_port, self.remote_port)))
    }
}

#[derive(Args, Debug)]
pub struct ExistsArgs {
    /// Remote path to check.
    pub path: String,

    /// Run the check with sudo.
    #[arg(long)]
    pub sudo: bool,

    /// Echo the command and its output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// `exists` exit status when the check itself could not be made.
const EXISTS_CHECK_FAILED: u8 = 2;

impl ExistsArgs {
    /// Prints `true` or `false`. Exit status 0 is `true`, 1 is `false` and 2
    /// means the check failed (unreachable host, refused sudo, bad target).
    pub fn run(&self, target: &TargetArgs) -> Result<ExitCode> {
        match self.check(target) {
            Ok(true) => {
                println!("true");
                Ok(ExitCode::SUCCESS)
            }
            Ok(false) => {
                println!("false");
                Ok(ExitCode::FAILURE)
            }
            Err(err) => {
                eprintln!("Error: {err:?}");
                Ok(ExitCode::from(EXISTS_CHECK_FAILED))
            }
        }
    }

    fn check(&self, target: &TargetArgs) -> Result<bool> {
        let (config, session) = connect(target)?;
        exists(&session, &self.path, self.sudo, self.verbose)
            .with_context(|| format!("checking {} on {} failed", self.path, config.host))
    }
}

#[derive(Args, Debug)]
pub struct WaitArgs {
    /// Give up after this many seconds. Waits forever when omitted.
    #[arg(long, value_name = "SECS")]
    pub deadline: Option<u64>,
}

impl WaitArgs {
    pub fn run(&self, target: &TargetArgs) -> Result<()> {
        let (config, session) = connect(target)?;
        let options = WaitOptions {
            deadline: self.deadline.map(Duration::from_secs),
            ..WaitOptions::default()
        };
        let attempts = wait_for_shell_with(&session, &options, std::thread::sleep)
            .with_context(|| format!("waiting for {} failed", config.host))?;
        if attempts > 1 {
            println!("{} {} is up after {attempts} attempts", "✓".green(), config.host);
        }
        Ok(())
    }
}
