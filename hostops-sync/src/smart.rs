//! rsync wrapper aware of the insecure flag and of target-directory ownership.

use std::path::PathBuf;

use hostops_core::ssh::{insecure_options, quote};
use hostops_core::types::validate_token;
use hostops_core::{ConnectionConfig, RemoteRunner, Session};

use crate::error::SyncError;
use crate::rsync::{SyncJob, SyncReport, Syncer};

/// What to sync, as asked for by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub local_dir: PathBuf,
    pub remote_dir: String,
    pub exclude: Vec<String>,
    pub delete: bool,
    pub extra_opts: Vec<String>,
    pub upload: bool,
    /// Hand `remote_dir` to this user once the transfer is done.
    pub for_user: Option<String>,
}

impl SyncRequest {
    pub fn upload(local_dir: impl Into<PathBuf>, remote_dir: impl Into<String>) -> Self {
        Self {
            local_dir: local_dir.into(),
            remote_dir: remote_dir.into(),
            exclude: Vec::new(),
            delete: false,
            extra_opts: Vec::new(),
            upload: true,
            for_user: None,
        }
    }

    pub fn for_user(mut self, user: impl Into<String>) -> Self {
        self.for_user = Some(user.into());
        self
    }
}

/// ssh options rsync must pass for this connection.
pub fn ssh_opts_for(config: &ConnectionConfig) -> Vec<String> {
    if config.insecure {
        insecure_options().iter().map(|s| s.to_string()).collect()
    } else {
        Vec::new()
    }
}

/// Sync `request` to the session's host.
///
/// With `for_user` set, the remote directory is first made writable and
/// handed to the connecting user, then synced, then chowned to `for_user`.
/// The sequence is not transactional: if the transfer fails, the final chown
/// is skipped and the directory stays owned by the connecting user. That case
/// is reported as [`SyncError::PartialOwnership`]; rerunning the whole sync
/// repairs it.
pub fn smart_sync<R, S>(
    session: &Session<R>,
    config: &ConnectionConfig,
    syncer: &S,
    request: &SyncRequest,
) -> Result<SyncReport, SyncError>
where
    R: RemoteRunner,
    S: Syncer,
{
    let job = SyncJob {
        destination: config.destination()?,
        port: config.port,
        key_file: config.key_file.clone(),
        local_dir: request.local_dir.clone(),
        remote_dir: request.remote_dir.clone(),
        exclude: request.exclude.clone(),
        delete: request.delete,
        extra_opts: request.extra_opts.clone(),
        upload: request.upload,
        ssh_opts: ssh_opts_for(config),
    };
    let directory = quote(&request.remote_dir);

    if let Some(owner) = &request.for_user {
        validate_token("user", owner)?;
        session.sudo(&format!(
            "find {directory} -type d -print0 | xargs -0 chmod u+rwx"
        ))?;
        session.sudo(&format!("chown -R {} {directory}", quote(&config.user)))?;
    }

    let report = match syncer.sync(&job) {
        Ok(report) => report,
        Err(err) => {
            return Err(match &request.for_user {
                Some(owner) => {
                    tracing::warn!(
                        directory = %request.remote_dir,
                        owner = %config.user,
                        intended = %owner,
                        "sync failed after ownership change; final chown skipped"
                    );
                    SyncError::PartialOwnership {
                        directory: request.remote_dir.clone(),
                        current_owner: config.user.clone(),
                        intended_owner: owner.clone(),
                        source: Box::new(err),
                    }
                }
                None => err,
            });
        }
    };

    if let Some(owner) = &request.for_user {
        session.sudo(&format!("chown -R {} {directory}", quote(owner)))?;
    }

    tracing::info!(
        host = %config.host,
        directory = %request.remote_dir,
        upload = request.upload,
        "sync completed"
    );
    Ok(report)
}
