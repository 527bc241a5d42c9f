//! Command-line interface definitions
//!
//! Uses clap for argument parsing with derive macros.

use clap::{Parser, Subcommand};

/// outsw - Output Switcher
///
/// List audio output sinks and make one the default.
#[derive(Parser)]
#[command(name = "outsw")]
#[command(version)]
#[command(about = "Output Switcher - List audio output sinks and switch the default one")]
#[command(after_help = "\
BEHAVIOR:
  - Devices come from an enumeration command printing one JSON object per line:
      {\"id\": 52, \"desc\": \"Built-in Audio Analog Stereo\"}
  - Lines that are not valid JSON are skipped; records without an id are ignored
  - Records without a description are shown as \"Device <id>\"
  - Switching runs: wpctl set-default <id>

COMMANDS:
  outsw                    List devices (same as: outsw list)
  outsw list --json        List devices as JSON
  outsw switch ID          Make device ID the default output
  outsw menu               Interactive device menu
  outsw validate           Validate config file

ENUMERATION COMMAND:
  Looked up next to the outsw binary as 'get_audio_devices' unless
  list_command / install_dir are set in ~/.config/outsw/config.toml.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand)]
pub enum Command {
    /// List available audio output devices
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Make a device the default audio output
    Switch {
        /// Device id as reported by the enumeration command
        id: String,

        /// Label used in log lines and notifications
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Interactive device menu (refresh with 'r', switch with Enter)
    Menu,

    /// Validate config file
    Validate,
}
