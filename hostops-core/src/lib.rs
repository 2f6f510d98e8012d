//! Core library for hostops: connection parameters, host profiles, and the
//! remote-execution helpers built on the `ssh` client.
//!
//! - [`types`] / [`registry`] / [`resolve`]: who to talk to
//! - [`runner`] / [`ssh`] / [`mock`]: how commands reach the host
//! - [`session`]: console echo and scoped execution modes
//! - [`exists`] / [`wait`]: the quiet existence check and the reboot wait

pub mod error;
pub mod exists;
pub mod mock;
pub mod registry;
pub mod resolve;
pub mod runner;
pub mod session;
pub mod ssh;
pub mod types;
pub mod wait;

pub use error::{ConfigError, ExecError, WaitError};
pub use exists::exists;
pub use resolve::{resolve, TargetOverrides};
pub use runner::{CommandOutput, Outcome, RemoteCommand, RemoteRunner};
pub use session::{ExecMode, Hide, ModeGuard, Session};
pub use ssh::SshRunner;
pub use types::{ConnectionConfig, HostProfile, HostRegistry, ProfileName};
pub use wait::{wait_for_shell, wait_for_shell_with, WaitOptions};
