//! rsync invocation.
//!
//! [`RsyncCommand`] turns a [`SyncJob`] into an argv; [`RsyncSyncer`] runs it.
//! The [`Syncer`] trait is the seam tests replace.

use std::path::PathBuf;
use std::process::Command;

use hostops_core::ssh::quote;

use crate::error::SyncError;

/// Flags passed on every run: perms, times, human-readable, recursive,
/// verbose, compressed.
pub const DEFAULT_OPTS: &str = "-pthrvz";

/// A fully resolved transfer: where, what, and how to reach the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncJob {
    /// `user@host`.
    pub destination: String,
    pub port: u16,
    pub key_file: Option<PathBuf>,
    pub local_dir: PathBuf,
    pub remote_dir: String,
    pub exclude: Vec<String>,
    pub delete: bool,
    pub extra_opts: Vec<String>,
    /// Local → remote when `true`, remote → local otherwise.
    pub upload: bool,
    /// Extra options for the `ssh` rsync spawns.
    pub ssh_opts: Vec<String>,
}

/// Output of a finished transfer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub output: String,
}

/// Performs a transfer described by a [`SyncJob`].
pub trait Syncer {
    fn sync(&self, job: &SyncJob) -> Result<SyncReport, SyncError>;
}

impl<S: Syncer + ?Sized> Syncer for &S {
    fn sync(&self, job: &SyncJob) -> Result<SyncReport, SyncError> {
        (**self).sync(job)
    }
}

/// argv builder for `rsync`.
pub struct RsyncCommand<'a> {
    job: &'a SyncJob,
}

impl<'a> RsyncCommand<'a> {
    pub fn new(job: &'a SyncJob) -> Self {
        Self { job }
    }

    /// The `--rsh` value. rsync splits it itself, honouring quotes, so the
    /// key path is quoted.
    pub fn rsh(&self) -> String {
        let mut rsh = format!("ssh -p {}", self.job.port);
        if let Some(key) = &self.job.key_file {
            rsh.push_str(" -i ");
            rsh.push_str(&quote(&key.display().to_string()));
        }
        for opt in &self.job.ssh_opts {
            rsh.push(' ');
            rsh.push_str(opt);
        }
        rsh
    }

    pub fn args(&self) -> Vec<String> {
        let job = self.job;
        let mut args = vec![DEFAULT_OPTS.to_string(), "--protect-args".to_string()];
        if job.delete {
            args.push("--delete".into());
        }
        args.extend(job.exclude.iter().map(|p| format!("--exclude={p}")));
        args.extend(job.extra_opts.iter().cloned());
        args.push(format!("--rsh={}", self.rsh()));

        let local = job.local_dir.display().to_string();
        let remote = format!("{}:{}", job.destination, job.remote_dir);
        if job.upload {
            args.push(local);
            args.push(remote);
        } else {
            args.push(remote);
            args.push(local);
        }
        args
    }
}

/// Production [`Syncer`] that runs the local `rsync` binary.
#[derive(Debug, Clone, Default)]
pub struct RsyncSyncer;

impl Syncer for RsyncSyncer {
    fn sync(&self, job: &SyncJob) -> Result<SyncReport, SyncError> {
        let args = RsyncCommand::new(job).args();
        tracing::debug!(?args, "running rsync");
        let output = Command::new("rsync")
            .args(&args)
            .output()
            .map_err(SyncError::Spawn)?;

        if !output.status.success() {
            return Err(SyncError::Rsync {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(SyncReport {
            output: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
