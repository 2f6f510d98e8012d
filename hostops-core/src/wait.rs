//! Block until a host accepts SSH and runs commands again.
//!
//! Used after creating or rebooting a machine. Only connection-level failures
//! are retried; anything else (bad credentials, a failing command) ends the
//! wait immediately.

use std::time::{Duration, Instant};

use crate::error::{ExecError, WaitError};
use crate::runner::RemoteRunner;
use crate::session::Session;

/// Pause between probes.
pub const RETRY_INTERVAL: Duration = Duration::from_secs(1);

const PROBE: &str = "uptime";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitOptions {
    pub interval: Duration,
    /// Give up once this much time has passed. `None` waits forever.
    pub deadline: Option<Duration>,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            interval: RETRY_INTERVAL,
            deadline: None,
        }
    }
}

/// Wait, without limit, until `uptime` succeeds on the host.
pub fn wait_for_shell<R: RemoteRunner>(session: &Session<R>) -> Result<(), WaitError> {
    wait_for_shell_with(session, &WaitOptions::default(), std::thread::sleep).map(|_| ())
}

/// [`wait_for_shell`] with explicit options and sleep function.
///
/// Prints `Waiting for shell`, one `.` per failed probe and ` OK` at the end.
/// The `run:` echo is hidden while probing. Returns the number of probes made.
pub fn wait_for_shell_with<R, S>(
    session: &Session<R>,
    options: &WaitOptions,
    mut sleep: S,
) -> Result<u32, WaitError>
where
    R: RemoteRunner,
    S: FnMut(Duration),
{
    session.print("Waiting for shell\n")?;
    let started = Instant::now();
    let mut attempts = 0u32;

    let current = session.mode();
    let mut hide = current.hide;
    hide.running = true;
    let _guard = session.scoped(current.with_hide(hide));

    loop {
        attempts = attempts.saturating_add(1);
        match session.run(PROBE) {
            Ok(_) => break,
            Err(ExecError::Network { reason, .. }) => {
                tracing::debug!(host = %session.host(), attempts, %reason, "host not reachable yet");
                if let Some(deadline) = options.deadline {
                    let elapsed = started.elapsed();
                    if elapsed >= deadline {
                        session.print("\n")?;
                        return Err(WaitError::DeadlineExceeded {
                            attempts,
                            elapsed_secs: elapsed.as_secs(),
                        });
                    }
                }
                session.print(".")?;
                sleep(options.interval);
            }
            Err(err) => return Err(err.into()),
        }
    }

    session.print(" OK\n")?;
    tracing::info!(host = %session.host(), attempts, "shell is available");
    Ok(attempts)
}
