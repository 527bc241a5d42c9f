//! Configuration management
//!
//! Handles loading, parsing, and validating the TOML configuration file.
//! Every key is optional; a commented default file is written on first load.

use color_eyre::eyre::{self, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::lister::{DEFAULT_LIST_TIMEOUT, DeviceLister, is_executable};
use crate::menu::ScriptLocation;
use crate::style::OutswStyle;
use crate::switcher::{DEFAULT_SWITCH_COMMAND, DeviceSwitcher};

/// Default enumeration command file name (resolved next to the executable)
pub const DEFAULT_LIST_COMMAND: &str = "get_audio_devices";

/// Upper bound for `list_timeout_ms`
const MAX_LIST_TIMEOUT_MS: u64 = 60_000;

// ============================================================================
// Public Configuration Types
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: Settings,
}

/// Global settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Enumeration command; relative paths resolve against `install_dir`
    pub list_command: PathBuf,
    /// Directory relative commands resolve against (default: executable directory)
    pub install_dir: Option<PathBuf>,
    /// Switch program, looked up in `PATH`
    pub switch_command: String,
    pub list_timeout_ms: u64,
    /// Desktop notification after a successful switch
    pub notify_switch: bool,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        SettingsFile::default().into()
    }
}

// ============================================================================
// Config File Deserialization (TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    settings: SettingsFile,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    #[serde(default = "default_list_command")]
    list_command: PathBuf,
    #[serde(default)]
    install_dir: Option<PathBuf>,
    #[serde(default = "default_switch_command")]
    switch_command: String,
    #[serde(default = "default_list_timeout_ms")]
    list_timeout_ms: u64,
    #[serde(default)]
    notify_switch: bool,
    #[serde(default = "default_log_level")]
    log_level: String,
}

fn default_list_command() -> PathBuf {
    PathBuf::from(DEFAULT_LIST_COMMAND)
}

fn default_switch_command() -> String {
    DEFAULT_SWITCH_COMMAND.to_string()
}

fn default_list_timeout_ms() -> u64 {
    DEFAULT_LIST_TIMEOUT.as_millis() as u64
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for SettingsFile {
    fn default() -> Self {
        Self {
            list_command: default_list_command(),
            install_dir: None,
            switch_command: default_switch_command(),
            list_timeout_ms: default_list_timeout_ms(),
            notify_switch: false,
            log_level: default_log_level(),
        }
    }
}

impl From<SettingsFile> for Settings {
    fn from(file: SettingsFile) -> Self {
        Self {
            list_command: file.list_command,
            install_dir: file.install_dir,
            switch_command: file.switch_command,
            list_timeout_ms: file.list_timeout_ms,
            notify_switch: file.notify_switch,
            log_level: file.log_level,
        }
    }
}

// ============================================================================
// Config Implementation
// ============================================================================

impl Config {
    /// Load configuration from the default XDG config path
    ///
    /// # Errors
    /// Returns an error if the config directory is unavailable or the file is invalid.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from `path`, creating a default file if it is missing
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, written, parsed, or validated.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Creating default config at {:?}", path);
            Self::create_default_config(path)?;
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {path:?}"))?;

        Self::from_toml_str(&contents).with_context(|| format!("Invalid config: {path:?}"))
    }

    /// Parse and validate configuration text
    ///
    /// # Errors
    /// Returns an error on TOML syntax errors, unknown keys, or invalid values.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config_file: ConfigFile =
            toml::from_str(contents).context("Failed to parse config")?;

        let config = Config {
            settings: config_file.settings.into(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let settings = &self.settings;

        match settings.log_level.as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => {}
            level => eyre::bail!(
                "Invalid log_level '{level}'. Must be: error, warn, info, debug, or trace"
            ),
        }

        if settings.list_timeout_ms == 0 || settings.list_timeout_ms > MAX_LIST_TIMEOUT_MS {
            eyre::bail!(
                "Invalid list_timeout_ms {}. Must be between 1 and {MAX_LIST_TIMEOUT_MS}",
                settings.list_timeout_ms
            );
        }

        if settings.switch_command.trim().is_empty() {
            eyre::bail!("switch_command must not be empty");
        }

        if settings.list_command.as_os_str().is_empty() {
            eyre::bail!("list_command must not be empty");
        }

        if let Some(dir) = &settings.install_dir
            && !dir.is_absolute()
        {
            eyre::bail!("install_dir must be an absolute path, got {dir:?}");
        }

        Ok(())
    }

    /// Get the XDG config path for outsw
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined or created.
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre::eyre!("Could not determine config directory"))?
            .join("outsw");
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config dir: {config_dir:?}"))?;
        Ok(config_dir.join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<()> {
        let default_config = r#"# outsw (Output Switcher) Configuration
#
# Lists audio output sinks through an enumeration command and switches the
# default sink with `wpctl set-default <id>`.

[settings]
# Enumeration command. Prints one JSON object per line: {"id": 52, "desc": "Speakers"}
# Relative paths resolve against install_dir (default: the directory of the outsw binary).
list_command = "get_audio_devices"
# install_dir = "/usr/share/outsw"

switch_command = "wpctl"   # Invoked as: <switch_command> set-default <id>
list_timeout_ms = 3000     # Enumeration commands running longer are killed
notify_switch = false      # Desktop notification after switching
log_level = "info"         # error, warn, info, debug, trace
"#;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {parent:?}"))?;
        }
        fs::write(path, default_config)
            .with_context(|| format!("Failed to write config: {path:?}"))?;

        eprintln!("Created default config at: {path:?}");
        eprintln!();
        eprintln!("Next steps:");
        eprintln!("  1. Install the enumeration command next to the outsw binary");
        eprintln!("  2. Run 'outsw list' to see available audio outputs");
        eprintln!("  3. Run 'outsw menu' to pick one interactively");
        eprintln!();

        Ok(())
    }

    /// Print a human-readable summary of the configuration
    pub fn print_summary(&self) {
        let settings = &self.settings;
        println!("{}\n", "✓ Configuration valid".success());

        println!("{}", "Settings:".header());
        println!("  list_command: {}", settings.list_command.display());
        match &settings.install_dir {
            Some(dir) => println!("  install_dir: {}", dir.display()),
            None => println!("  install_dir: (directory of the outsw binary)"),
        }
        println!("  switch_command: {}", settings.switch_command);
        println!("  list_timeout_ms: {}", settings.list_timeout_ms);
        println!("  notify_switch: {}", settings.notify_switch);
        println!("  log_level: {}", settings.log_level);

        match self.script_location().resolve() {
            Ok(path) => {
                let state = match command_state(&path) {
                    state @ "found" => state.success().to_string(),
                    state => state.error().to_string(),
                };
                println!("\nEnumeration command: {} ({state})", path.display().to_string().technical());
            }
            Err(e) => println!("\nEnumeration command: {}", format!("{e:#}").error()),
        }

        if let Ok(path) = Self::get_config_path() {
            println!("\nConfig: {path:?}");
        }
    }

    #[must_use]
    pub fn list_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.list_timeout_ms)
    }

    #[must_use]
    pub fn script_location(&self) -> ScriptLocation {
        ScriptLocation::new(
            self.settings.list_command.clone(),
            self.settings.install_dir.clone(),
        )
    }

    #[must_use]
    pub fn lister(&self) -> DeviceLister {
        DeviceLister::new(self.list_timeout())
    }

    #[must_use]
    pub fn switcher(&self) -> Arc<DeviceSwitcher> {
        Arc::new(DeviceSwitcher::new(self.settings.switch_command.clone()))
    }

    /// `tracing` filter directive for this crate at the configured level
    #[must_use]
    pub fn log_filter(&self) -> String {
        format!("outsw={}", self.settings.log_level)
    }
}

/// Whether the enumeration command at `path` would actually run
fn command_state(path: &Path) -> &'static str {
    if is_executable(path) {
        "found"
    } else if path.exists() {
        "not executable"
    } else {
        "missing"
    }
}
