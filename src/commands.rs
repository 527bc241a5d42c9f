//! CLI commands
//!
//! One-shot commands built on the menu coordinator: `list` renders a single
//! refresh to the terminal (or JSON), `switch` invokes the switcher directly.

use color_eyre::eyre::{self, Result};
use crossterm::style::Stylize;
use serde::Serialize;
use std::sync::Arc;

use crate::config::Config;
use crate::device::{Device, DeviceId};
use crate::lister::DeviceListResult;
use crate::menu::{EntryKind, MENU_TITLE, MenuCoordinator, MenuView, RefreshOutcome};
use crate::notification::notify_switch;
use crate::style::OutswStyle;
use crate::switcher::SwitchOutcome;

// ============================================================================
// JSON Output Structures (for list --json)
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ListJson {
    pub status: &'static str,
    pub devices: Vec<DeviceJson>,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeviceJson {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl From<&RefreshOutcome> for ListJson {
    fn from(outcome: &RefreshOutcome) -> Self {
        let (status, message) = match outcome {
            RefreshOutcome::Listed(DeviceListResult::CommandFailed(msg)) => {
                ("command_failed", Some(msg.clone()))
            }
            RefreshOutcome::Listed(result) => (result.status_name(), None),
            RefreshOutcome::Unresolved(msg) => ("unresolved", Some(msg.clone())),
        };

        let skipped = match outcome {
            RefreshOutcome::Listed(result) => result.skipped(),
            RefreshOutcome::Unresolved(_) => 0,
        };

        Self {
            status,
            devices: outcome
                .devices()
                .iter()
                .map(|d| DeviceJson {
                    id: d.id.to_string(),
                    label: d.label(),
                    description: d.description.clone(),
                })
                .collect(),
            skipped,
            message,
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

/// Refresh once and print the resulting menu
///
/// # Errors
/// Returns an error if JSON serialization fails.
pub async fn list(config: &Config, json_output: bool) -> Result<()> {
    let mut coordinator = MenuCoordinator::new(
        MenuView::new(),
        config.lister(),
        config.switcher(),
        config.script_location(),
    );
    let outcome = coordinator.refresh().await;
    let view = coordinator.into_host();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&ListJson::from(&outcome))?);
    } else {
        let skipped = match &outcome {
            RefreshOutcome::Listed(result) => result.skipped(),
            RefreshOutcome::Unresolved(_) => 0,
        };
        print_menu(&view, outcome.devices(), skipped);
    }

    Ok(())
}

fn print_menu(view: &MenuView, devices: &[Device], skipped: usize) {
    let mut devices = devices.iter();
    let mut position = 0;

    for entry in view.entries() {
        match entry.kind {
            EntryKind::Separator => println!("{}", "-".repeat(MENU_TITLE.len())),
            EntryKind::Text { .. } if entry.text == MENU_TITLE => {
                println!("{}", entry.text.as_str().header());
            }
            EntryKind::Text { .. } => println!("  {}", entry.text.as_str().dim()),
            EntryKind::Selectable => {
                position += 1;
                let id = devices
                    .next()
                    .map(|d| format!(" (ID: {})", d.id))
                    .unwrap_or_default();
                println!(
                    "  {}. {}{}",
                    position.to_string().dim(),
                    entry.text.as_str().bold(),
                    id.as_str().technical()
                );
            }
        }
    }

    if let Some(notice) = skipped_notice(skipped) {
        println!("\n{}", notice.warning());
    }

    if position > 0 {
        println!("\n{} outsw switch <ID>", "Switch with:".dim());
    }
}

fn skipped_notice(skipped: usize) -> Option<String> {
    (skipped > 0).then(|| format!("Skipped {skipped} malformed line(s) in enumeration output"))
}

/// Make device `id` the default output
///
/// # Errors
/// Returns an error if `id` is blank or the switch command cannot be spawned.
pub fn switch(config: &Config, id: &str, label: Option<&str>) -> Result<()> {
    let id = DeviceId::new(id).ok_or_else(|| eyre::eyre!("Device id must not be empty"))?;
    let device = Device::new(id, label);

    let outcome = config.switcher().switch_to(&device.id, &device.label());
    if config.settings.notify_switch {
        notify_switch(&device, &outcome);
    }

    match outcome {
        SwitchOutcome::Spawned { .. } => {
            println!("{} {}", "Switching to".success(), device.label().bold());
            Ok(())
        }
        SwitchOutcome::SpawnFailed(e) => eyre::bail!(
            "Failed to switch to {} (ID: {}): could not run '{}': {e}",
            device.label(),
            device.id,
            config.settings.switch_command
        ),
    }
}

/// Hook that sends desktop notifications for menu switches when enabled
#[must_use]
pub fn switch_hook(config: &Config) -> Option<crate::menu::SwitchHook> {
    config
        .settings
        .notify_switch
        .then(|| {
            Arc::new(|device: &Device, outcome: &SwitchOutcome| {
                notify_switch(device, outcome);
            }) as crate::menu::SwitchHook
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lister::parse_device_lines;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_json_ok() {
        let outcome = RefreshOutcome::Listed(parse_device_lines(
            "{\"id\":1,\"desc\":\"Speakers\"}\ngarbage\n{\"id\":2}\n",
        ));
        let json = serde_json::to_value(ListJson::from(&outcome)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "status": "ok",
                "devices": [
                    {"id": "1", "label": "Speakers", "description": "Speakers"},
                    {"id": "2", "label": "Device 2"}
                ],
                "skipped": 1
            })
        );
    }

    #[test]
    fn test_list_json_failure_carries_message() {
        let outcome =
            RefreshOutcome::Listed(DeviceListResult::CommandFailed("pw-dump: not found".into()));
        let json = ListJson::from(&outcome);

        assert_eq!(json.status, "command_failed");
        assert_eq!(json.message.as_deref(), Some("pw-dump: not found"));
        assert!(json.devices.is_empty());
    }

    #[test]
    fn test_list_json_unresolved() {
        let json = ListJson::from(&RefreshOutcome::Unresolved("no exe".into()));
        assert_eq!(json.status, "unresolved");
        assert_eq!(json.skipped, 0);
    }

    #[test]
    fn test_skipped_notice_only_when_lines_were_skipped() {
        assert_eq!(skipped_notice(0), None);
        assert_eq!(
            skipped_notice(2).as_deref(),
            Some("Skipped 2 malformed line(s) in enumeration output")
        );
    }

    #[test]
    fn test_switch_rejects_blank_id() {
        let err = switch(&Config::default(), "   ", None).unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_switch_reports_spawn_failure() {
        let mut config = Config::default();
        config.settings.switch_command = "/nonexistent/outsw-test/wpctl".to_string();

        let err = switch(&config, "2", Some("Headphones")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Headphones"), "{msg}");
        assert!(msg.contains("ID: 2"), "{msg}");
    }

    #[test]
    fn test_switch_hook_follows_setting() {
        let mut config = Config::default();
        assert!(switch_hook(&config).is_none());
        config.settings.notify_switch = true;
        assert!(switch_hook(&config).is_some());
    }
}
