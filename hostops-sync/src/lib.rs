//! # hostops-sync
//!
//! Project sync over rsync, with the two extras the plain tool lacks:
//! honouring the connection's insecure flag, and handing the target
//! directory to another owner around the transfer.
//!
//! Call [`smart_sync`] with a [`Session`](hostops_core::Session) for the
//! privileged ownership steps and a [`Syncer`] for the transfer itself.

pub mod error;
pub mod rsync;
pub mod smart;

pub use error::SyncError;
pub use rsync::{RsyncCommand, RsyncSyncer, SyncJob, SyncReport, Syncer};
pub use smart::{smart_sync, ssh_opts_for, SyncRequest};
