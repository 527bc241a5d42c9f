//! Desktop notifications
//!
//! Handles sending notifications via notify-rust and icon detection
//! using `FreeDesktop` standard icon names.

use color_eyre::eyre::{Context, Result};
use notify_rust::Notification;
use tracing::warn;

use crate::device::Device;
use crate::switcher::SwitchOutcome;

/// Send a desktop notification
///
/// # Errors
/// Returns an error if the notification cannot be sent (e.g., no notification daemon running).
pub fn send_notification(summary: &str, body: &str, icon: Option<&str>) -> Result<()> {
    let icon = icon.unwrap_or("audio-card");

    Notification::new()
        .summary(summary)
        .body(body)
        .appname("outsw")
        .icon(icon)
        .timeout(3000)
        .show()
        .context("Failed to show notification")?;

    Ok(())
}

/// Pick a `FreeDesktop` icon name from a device label
#[must_use]
pub fn device_icon(label: &str) -> &'static str {
    let label = label.to_lowercase();

    if label.contains("hdmi") || label.contains("tv") || label.contains("display") {
        "video-display"
    } else if label.contains("headphone")
        || label.contains("headset")
        || label.contains("bluetooth")
    {
        "audio-headphones"
    } else {
        "audio-speakers"
    }
}

/// Notify about a menu-triggered switch
///
/// Only successful spawns are announced; notification failures are logged.
/// Returns whether a notification was attempted.
pub fn notify_switch(device: &Device, outcome: &SwitchOutcome) -> bool {
    if !outcome.is_spawned() {
        return false;
    }

    let label = device.label();
    if let Err(e) = send_notification("Audio Output", &label, Some(device_icon(&label))) {
        warn!("Could not send switch notification: {e:#}");
    }
    true
}
