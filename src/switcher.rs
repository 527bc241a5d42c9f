//! Default sink switching
//!
//! Spawns `wpctl set-default <id>` (or a configured replacement) and returns
//! immediately. Only the spawn itself is observed; the exit status is traced
//! by a detached reaper thread and never acted upon.

use std::process::{Child, Command, Stdio};
use tracing::{debug, error, info, warn};

use crate::device::DeviceId;

/// Default switch program, resolved through `PATH`
pub const DEFAULT_SWITCH_COMMAND: &str = "wpctl";

/// What happened when the switch command was launched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    Spawned { pid: u32 },
    SpawnFailed(String),
}

impl SwitchOutcome {
    #[must_use]
    pub fn is_spawned(&self) -> bool {
        matches!(self, Self::Spawned { .. })
    }
}

/// Launches the switch command for a device
#[derive(Debug, Clone)]
pub struct DeviceSwitcher {
    program: String,
}

impl Default for DeviceSwitcher {
    fn default() -> Self {
        Self::new(DEFAULT_SWITCH_COMMAND)
    }
}

impl DeviceSwitcher {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the switch program for `id`
    #[must_use]
    pub fn args(id: &DeviceId) -> [&str; 2] {
        ["set-default", id.as_str()]
    }

    /// Make `id` the default output without waiting for the command to finish
    ///
    /// Failures are logged and reported through the outcome, never raised.
    /// There are no retries.
    pub fn switch_to(&self, id: &DeviceId, label: &str) -> SwitchOutcome {
        let spawned = Command::new(&self.program)
            .args(Self::args(id))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(child) => {
                let pid = child.id();
                info!(device_id = %id, pid, "Switched to {label} (ID: {id})");
                reap(child, id.clone());
                SwitchOutcome::Spawned { pid }
            }
            Err(e) => {
                error!(
                    device_id = %id,
                    "Failed to switch to {label} (ID: {id}): could not run {}: {e}",
                    self.program
                );
                SwitchOutcome::SpawnFailed(e.to_string())
            }
        }
    }
}

/// Wait for the child on a detached thread so it does not linger as a zombie
fn reap(mut child: Child, id: DeviceId) {
    let spawned = std::thread::Builder::new()
        .name("outsw-reaper".to_string())
        .spawn(move || match child.wait() {
            Ok(status) => debug!("Switch command for ID {id} finished: {status}"),
            Err(e) => debug!("Could not wait on switch command for ID {id}: {e}"),
        });

    if let Err(e) = spawned {
        warn!("Could not start reaper thread: {e}");
    }
}
