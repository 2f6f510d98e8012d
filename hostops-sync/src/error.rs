//! Error types for hostops-sync.

use thiserror::Error;

use hostops_core::{ConfigError, ExecError};

/// All errors that can arise from a project sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A remote permission or ownership step failed.
    #[error("remote step failed: {0}")]
    Exec(#[from] ExecError),

    /// Unusable connection parameters or owner name.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// `rsync` could not be started.
    #[error("failed to spawn rsync: {0}")]
    Spawn(#[source] std::io::Error),

    /// `rsync` ran and failed.
    #[error("rsync failed ({status}): {stderr}")]
    Rsync { status: String, stderr: String },

    /// The transfer failed after the directory was handed to the connecting
    /// user; it was not handed back to the intended owner.
    #[error("sync into {directory} failed; it is left owned by '{current_owner}' instead of '{intended_owner}': {source}")]
    PartialOwnership {
        directory: String,
        current_owner: String,
        intended_owner: String,
        #[source]
        source: Box<SyncError>,
    },
}
