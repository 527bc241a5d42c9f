//! Device enumeration
//!
//! Runs the external enumeration command with a bounded wait and turns its
//! line-oriented JSON output into a [`DeviceListResult`]. Each line is parsed
//! on its own, so one corrupt record never discards the rest of the list.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::device::{Device, ParsedLine, parse_line};

/// Default wait ceiling for the enumeration command
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_millis(3000);

// ============================================================================
// Result Type
// ============================================================================

/// Outcome of one enumeration attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceListResult {
    /// Devices in output order, plus the number of lines that failed to parse
    Ok { devices: Vec<Device>, skipped: usize },
    /// The command succeeded but printed nothing but whitespace
    EmptyOutput,
    /// The command path does not point at an executable file
    CommandMissing,
    /// Spawn failure, non-success exit status, or timeout
    CommandFailed(String),
}

impl DeviceListResult {
    /// Short machine-readable status name (used for JSON output)
    #[must_use]
    pub fn status_name(&self) -> &'static str {
        match self {
            Self::Ok { .. } => "ok",
            Self::EmptyOutput => "empty_output",
            Self::CommandMissing => "command_missing",
            Self::CommandFailed(_) => "command_failed",
        }
    }

    #[must_use]
    pub fn devices(&self) -> &[Device] {
        match self {
            Self::Ok { devices, .. } => devices,
            _ => &[],
        }
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        match self {
            Self::Ok { skipped, .. } => *skipped,
            _ => 0,
        }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse captured enumeration output
///
/// Blank lines are ignored. Output with no remaining lines is
/// [`DeviceListResult::EmptyOutput`]; otherwise the result is `Ok`, even when
/// every record was dropped or skipped.
#[must_use]
pub fn parse_device_lines(stdout: &str) -> DeviceListResult {
    let mut lines = stdout.lines().filter(|l| !l.trim().is_empty()).peekable();
    if lines.peek().is_none() {
        return DeviceListResult::EmptyOutput;
    }

    let mut devices = Vec::new();
    let mut skipped = 0;

    for line in lines {
        match parse_line(line) {
            ParsedLine::Device(device) => {
                trace!("Parsed {} (ID: {})", device.label(), device.id);
                devices.push(device);
            }
            ParsedLine::MissingId => {
                debug!("Dropping record without id: {}", line.trim());
            }
            ParsedLine::Malformed(reason) => {
                debug!("JSON parse failed for line: {} - {reason}", line.trim());
                skipped += 1;
            }
        }
    }

    DeviceListResult::Ok { devices, skipped }
}

// ============================================================================
// Command Execution
// ============================================================================

/// Runs the enumeration command
#[derive(Debug, Clone)]
pub struct DeviceLister {
    timeout: Duration,
}

impl Default for DeviceLister {
    fn default() -> Self {
        Self::new(DEFAULT_LIST_TIMEOUT)
    }
}

impl DeviceLister {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the command at `script` and parse its output
    ///
    /// Never fails: every problem is reported through the returned status.
    /// The child is killed if it outlives the timeout.
    pub async fn list_devices(&self, script: &Path) -> DeviceListResult {
        if !is_executable(script) {
            debug!("Enumeration command not executable: {}", script.display());
            return DeviceListResult::CommandMissing;
        }

        let mut command = Command::new(script);
        command.stdin(Stdio::null()).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return DeviceListResult::CommandFailed(format!(
                    "Failed to run {}: {e}",
                    script.display()
                ));
            }
            Err(_) => {
                return DeviceListResult::CommandFailed(format!(
                    "{} timed out after {} ms",
                    script.display(),
                    self.timeout.as_millis()
                ));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                format!("{} exited with {}", script.display(), output.status)
            } else {
                stderr.trim().to_string()
            };
            return DeviceListResult::CommandFailed(message);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!("Enumeration command output: {}", stdout.trim());
        parse_device_lines(&stdout)
    }
}

/// Check that `path` is a regular file with an execute bit set
pub(crate) fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    if !metadata.is_file() {
        return false;
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        metadata.permissions().mode() & 0o111 != 0
    }

    #[cfg(not(unix))]
    {
        true
    }
}
