//! `outsw` - Output Switcher
//!
//! Lists the audio output sinks reported by an enumeration command and makes
//! one the default with `wpctl set-default <id>`.
//!
//! # Components
//! - [`lister`]: runs the enumeration command (bounded wait) and parses its
//!   line-oriented JSON output, skipping malformed lines individually
//! - [`menu`]: rebuilds the device menu on every refresh and binds each entry
//!   to a switch action
//! - [`switcher`]: launches the switch command without waiting for it
//!
//! The presentation layer is abstracted behind [`menu::MenuHost`]; the CLI and
//! the terminal menu both render through [`menu::MenuView`].

pub mod cli;
pub mod commands;
pub mod config;
pub mod device;
pub mod lister;
pub mod logging;
pub mod menu;
pub mod notification;
pub mod style;
pub mod switcher;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types for convenience
pub use cli::Args;
pub use config::Config;
pub use device::{Device, DeviceId};
pub use lister::{DeviceListResult, DeviceLister};
pub use menu::{MenuCoordinator, MenuHost, MenuView};
pub use switcher::{DeviceSwitcher, SwitchOutcome};
