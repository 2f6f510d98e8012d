//! `hostops sync <LOCAL> <REMOTE>`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use hostops_sync::{smart_sync, RsyncSyncer, SyncRequest};

use super::{connect, TargetArgs};

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Local directory.
    pub local: PathBuf,

    /// Directory on the remote host.
    pub remote: String,

    /// Delete files on the receiving side that the sender does not have.
    #[arg(long)]
    pub delete: bool,

    /// rsync exclude pattern; repeatable.
    #[arg(long, value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Copy from the host to the local directory instead.
    #[arg(long)]
    pub download: bool,

    /// Hand the remote directory to this user after the transfer.
    #[arg(long = "for-user", value_name = "USER")]
    pub for_user: Option<String>,

    /// Extra option passed through to rsync; repeatable.
    #[arg(long = "rsync-opt", value_name = "OPT", allow_hyphen_values = true)]
    pub rsync_opts: Vec<String>,
}

impl SyncArgs {
    pub fn run(self, target: &TargetArgs) -> Result<()> {
        let (config, session) = connect(target)?;
        let request = SyncRequest {
            local_dir: self.local,
            remote_dir: self.remote,
            exclude: self.exclude,
            delete: self.delete,
            extra_opts: self.rsync_opts,
            upload: !self.download,
            for_user: self.for_user,
        };

        let report = smart_sync(&session, &config, &RsyncSyncer, &request).with_context(|| {
            format!(
                "sync of {} with {}:{} failed",
                request.local_dir.display(),
                config.host,
                request.remote_dir
            )
        })?;

        print!("{}", report.output);
        println!("{} Synced {}", "✓".green(), request.remote_dir);
        Ok(())
    }
}
