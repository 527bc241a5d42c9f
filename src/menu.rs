//! Menu coordination
//!
//! [`MenuCoordinator`] owns the device list shown to the user. Every refresh
//! clears the dynamic entries below the fixed header, runs the enumeration
//! command, and renders either one selectable entry per device or a single
//! disabled status entry. Selecting an entry launches the switch command.
//!
//! The coordinator only talks to the presentation layer through [`MenuHost`].
//! [`MenuView`] is the in-memory host used by the CLI, the TUI, and tests.

use color_eyre::eyre::{Context, Result, eyre};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::device::Device;
use crate::lister::{DeviceListResult, DeviceLister};
use crate::switcher::{DeviceSwitcher, SwitchOutcome};

// ============================================================================
// Constants
// ============================================================================

/// Menu title (first fixed entry)
pub const MENU_TITLE: &str = "Audio Output Devices";

/// Title + separator
pub const FIXED_PREFIX_LEN: usize = 2;

pub const STATUS_FETCH_ERROR: &str = "Error fetching audio devices";
pub const STATUS_EMPTY_OUTPUT: &str = "No audio devices found. Script output empty";
pub const STATUS_NO_DEVICES: &str = "No audio devices found.";
pub const STATUS_BROKEN: &str = "Extension broke.";

// ============================================================================
// Presentation Interface
// ============================================================================

/// Handle to an entry added to a [`MenuHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(u64);

/// Callback fired when a selectable entry is activated
pub type Activation = Box<dyn Fn() + Send + Sync>;

/// Called after every switch attempt made from the menu
pub type SwitchHook = Arc<dyn Fn(&Device, &SwitchOutcome) + Send + Sync>;

/// Presentation surface driven by the coordinator
pub trait MenuHost {
    /// Remove every entry after the fixed header
    fn clear_dynamic_entries(&mut self);

    fn add_text_entry(&mut self, text: &str, selectable: bool) -> EntryHandle;

    fn add_separator(&mut self) -> EntryHandle;

    fn add_selectable_entry(&mut self, text: &str) -> EntryHandle;

    /// Bind `activation` to a selectable entry
    fn on_activate(&mut self, entry: EntryHandle, activation: Activation);
}

// ============================================================================
// In-Memory View
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Plain text row (title, status line)
    Text { selectable: bool },
    Separator,
    /// Device row
    Selectable,
}

pub struct MenuEntry {
    pub handle: EntryHandle,
    pub text: String,
    pub kind: EntryKind,
    activation: Option<Activation>,
}

impl MenuEntry {
    #[must_use]
    pub fn has_activation(&self) -> bool {
        self.activation.is_some()
    }
}

impl fmt::Debug for MenuEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuEntry")
            .field("handle", &self.handle)
            .field("text", &self.text)
            .field("kind", &self.kind)
            .field("activation", &self.activation.is_some())
            .finish()
    }
}

/// Ordered list of menu entries
#[derive(Debug, Default)]
pub struct MenuView {
    entries: Vec<MenuEntry>,
    next_handle: u64,
}

impl MenuView {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[MenuEntry] {
        &self.entries
    }

    /// Entries below the fixed header
    #[must_use]
    pub fn dynamic_entries(&self) -> &[MenuEntry] {
        self.entries.get(FIXED_PREFIX_LEN..).unwrap_or_default()
    }

    /// Labels of the device rows, in menu order
    #[must_use]
    pub fn selectable_labels(&self) -> Vec<&str> {
        self.dynamic_entries()
            .iter()
            .filter(|e| e.kind == EntryKind::Selectable)
            .map(|e| e.text.as_str())
            .collect()
    }

    /// Disabled status lines below the header
    #[must_use]
    pub fn status_lines(&self) -> Vec<&str> {
        self.dynamic_entries()
            .iter()
            .filter(|e| e.kind == EntryKind::Text { selectable: false })
            .map(|e| e.text.as_str())
            .collect()
    }

    /// Fire the activation bound to `handle`
    ///
    /// Returns `false` if the entry does not exist or has nothing bound.
    pub fn activate(&self, handle: EntryHandle) -> bool {
        match self
            .entries
            .iter()
            .find(|e| e.handle == handle)
            .and_then(|e| e.activation.as_ref())
        {
            Some(activation) => {
                activation();
                true
            }
            None => false,
        }
    }

    fn push(&mut self, text: &str, kind: EntryKind) -> EntryHandle {
        let handle = EntryHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.push(MenuEntry {
            handle,
            text: text.to_string(),
            kind,
            activation: None,
        });
        handle
    }
}

impl MenuHost for MenuView {
    fn clear_dynamic_entries(&mut self) {
        self.entries.truncate(FIXED_PREFIX_LEN);
    }

    fn add_text_entry(&mut self, text: &str, selectable: bool) -> EntryHandle {
        self.push(text, EntryKind::Text { selectable })
    }

    fn add_separator(&mut self) -> EntryHandle {
        self.push("", EntryKind::Separator)
    }

    fn add_selectable_entry(&mut self, text: &str) -> EntryHandle {
        self.push(text, EntryKind::Selectable)
    }

    fn on_activate(&mut self, entry: EntryHandle, activation: Activation) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.handle == entry) {
            e.activation = Some(activation);
        }
    }
}

// ============================================================================
// Script Location
// ============================================================================

/// Where to find the enumeration command
///
/// Relative commands resolve against the install directory (the directory of
/// the running executable unless configured), never the working directory.
#[derive(Debug, Clone)]
pub struct ScriptLocation {
    command: PathBuf,
    install_dir: Option<PathBuf>,
}

impl ScriptLocation {
    #[must_use]
    pub fn new(command: impl Into<PathBuf>, install_dir: Option<PathBuf>) -> Self {
        Self {
            command: command.into(),
            install_dir,
        }
    }

    /// Absolute path of the enumeration command
    ///
    /// # Errors
    /// Returns an error if the install directory cannot be determined.
    pub fn resolve(&self) -> Result<PathBuf> {
        if self.command.is_absolute() {
            return Ok(self.command.clone());
        }

        let base = match &self.install_dir {
            Some(dir) => dir.clone(),
            None => install_dir()?,
        };
        Ok(base.join(&self.command))
    }
}

/// Directory containing the running executable
///
/// # Errors
/// Returns an error if the executable path is unavailable.
pub fn install_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Could not locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| eyre!("Executable path {exe:?} has no parent directory"))
}

// ============================================================================
// Coordinator
// ============================================================================

/// What the last refresh rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Listed(DeviceListResult),
    /// The enumeration command path could not be resolved
    Unresolved(String),
}

impl RefreshOutcome {
    #[must_use]
    pub fn devices(&self) -> &[Device] {
        match self {
            Self::Listed(result) => result.devices(),
            Self::Unresolved(_) => &[],
        }
    }
}

pub struct MenuCoordinator<H: MenuHost> {
    host: H,
    lister: DeviceLister,
    switcher: Arc<DeviceSwitcher>,
    script: ScriptLocation,
    on_switch: Option<SwitchHook>,
    built: bool,
}

impl<H: MenuHost> MenuCoordinator<H> {
    #[must_use]
    pub fn new(
        host: H,
        lister: DeviceLister,
        switcher: Arc<DeviceSwitcher>,
        script: ScriptLocation,
    ) -> Self {
        Self {
            host,
            lister,
            switcher,
            script,
            on_switch: None,
            built: false,
        }
    }

    /// Run `hook` after every switch attempt made from the menu
    #[must_use]
    pub fn with_switch_hook(mut self, hook: SwitchHook) -> Self {
        self.on_switch = Some(hook);
        self
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    #[must_use]
    pub fn into_host(self) -> H {
        self.host
    }

    /// Install the fixed header (title + separator); no-op after the first call
    pub fn build(&mut self) {
        if self.built {
            return;
        }
        self.host.add_text_entry(MENU_TITLE, false);
        self.host.add_separator();
        self.built = true;
    }

    /// Rebuild the dynamic entries from a fresh enumeration
    ///
    /// Never fails; every outcome is rendered as entries and logged.
    pub async fn refresh(&mut self) -> RefreshOutcome {
        info!("Looking for audio devices");
        self.build();
        self.host.clear_dynamic_entries();

        let script = match self.script.resolve() {
            Ok(path) => path,
            Err(e) => {
                error!("Could not resolve enumeration command: {e:#}");
                self.add_status(STATUS_BROKEN);
                return RefreshOutcome::Unresolved(format!("{e:#}"));
            }
        };

        let result = self.lister.list_devices(&script).await;
        self.render_result(&script, &result);
        RefreshOutcome::Listed(result)
    }

    /// Replace the dynamic entries with the rendering of `result`
    pub(crate) fn render_result(&mut self, script: &Path, result: &DeviceListResult) {
        self.build();
        self.host.clear_dynamic_entries();

        match result {
            DeviceListResult::CommandMissing => {
                error!("Enumeration command not found at: {}", script.display());
                let name = script
                    .file_name()
                    .map_or_else(|| script.display().to_string(), |n| n.to_string_lossy().into_owned());
                self.add_status(&format!("Error: {name} missing"));
            }
            DeviceListResult::CommandFailed(message) => {
                error!("Enumeration command failed: {message}");
                self.add_status(STATUS_FETCH_ERROR);
            }
            DeviceListResult::EmptyOutput => {
                warn!("Enumeration command returned empty output");
                self.add_status(STATUS_EMPTY_OUTPUT);
            }
            DeviceListResult::Ok { devices, skipped } => {
                if *skipped > 0 {
                    warn!("Skipped {skipped} malformed line(s) in enumeration output");
                }
                if devices.is_empty() {
                    info!("No devices found.");
                    self.add_status(STATUS_NO_DEVICES);
                    return;
                }
                for device in devices {
                    self.add_device(device);
                }
                info!("Listed {} device(s)", devices.len());
            }
        }
    }

    fn add_status(&mut self, text: &str) {
        self.host.add_text_entry(text, false);
    }

    fn add_device(&mut self, device: &Device) {
        let label = device.label();
        let handle = self.host.add_selectable_entry(&label);

        let switcher = Arc::clone(&self.switcher);
        let hook = self.on_switch.clone();
        let bound = device.clone();
        self.host.on_activate(
            handle,
            Box::new(move || {
                let outcome = switcher.switch_to(&bound.id, &bound.label());
                if let Some(hook) = &hook {
                    hook(&bound, &outcome);
                }
            }),
        );

        info!("Added {label} (ID: {})", device.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn coordinator(script: ScriptLocation) -> MenuCoordinator<MenuView> {
        MenuCoordinator::new(
            MenuView::new(),
            DeviceLister::default(),
            Arc::new(DeviceSwitcher::new("/nonexistent/outsw-test/wpctl")),
            script,
        )
    }

    #[test]
    fn test_build_installs_prefix_once() {
        let mut c = coordinator(ScriptLocation::new("/nonexistent", None));
        c.build();
        c.build();

        let entries = c.host().entries();
        assert_eq!(entries.len(), FIXED_PREFIX_LEN);
        assert_eq!(entries[0].text, MENU_TITLE);
        assert_eq!(entries[1].kind, EntryKind::Separator);
    }

    #[test]
    fn test_render_ok_adds_one_entry_per_device() {
        let mut c = coordinator(ScriptLocation::new("/nonexistent", None));
        c.build();
        let result = crate::lister::parse_device_lines(
            "{\"id\":1,\"desc\":\"Speakers\"}\ngarbage\n{\"id\":2}\n",
        );
        c.render_result(Path::new("/x/get_audio_devices"), &result);

        assert_eq!(c.host().selectable_labels(), vec!["Speakers", "Device 2"]);
        assert!(c.host().status_lines().is_empty());
        assert!(c.host().dynamic_entries().iter().all(MenuEntry::has_activation));
    }

    #[test]
    fn test_render_status_lines() {
        let cases = [
            (DeviceListResult::CommandMissing, "Error: get_audio_devices missing"),
            (
                DeviceListResult::CommandFailed("exit 1".to_string()),
                STATUS_FETCH_ERROR,
            ),
            (DeviceListResult::EmptyOutput, STATUS_EMPTY_OUTPUT),
            (
                DeviceListResult::Ok {
                    devices: vec![],
                    skipped: 3,
                },
                STATUS_NO_DEVICES,
            ),
        ];

        for (result, expected) in cases {
            let mut c = coordinator(ScriptLocation::new("/nonexistent", None));
            c.build();
            c.render_result(Path::new("/opt/outsw/get_audio_devices"), &result);

            assert_eq!(c.host().status_lines(), vec![expected]);
            assert!(c.host().selectable_labels().is_empty());
        }
    }

    #[tokio::test]
    async fn test_refresh_replaces_previous_batch() {
        let mut c = coordinator(ScriptLocation::new("/nonexistent/outsw/get_audio_devices", None));
        c.build();
        let result = crate::lister::parse_device_lines("{\"id\":1}\n{\"id\":2}\n{\"id\":3}\n");
        c.render_result(Path::new("/x"), &result);
        assert_eq!(c.host().dynamic_entries().len(), 3);

        // Missing script: stale device rows must not survive next to the error
        let outcome = c.refresh().await;
        assert_eq!(outcome, RefreshOutcome::Listed(DeviceListResult::CommandMissing));
        assert_eq!(c.host().entries().len(), FIXED_PREFIX_LEN + 1);
        assert_eq!(c.host().status_lines(), vec!["Error: get_audio_devices missing"]);

        c.refresh().await;
        assert_eq!(c.host().entries().len(), FIXED_PREFIX_LEN + 1);
        assert_eq!(c.host().entries()[0].text, MENU_TITLE);
    }

    #[test]
    fn test_activation_runs_switch_and_hook() {
        let seen: Arc<Mutex<Vec<(String, bool)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let mut c = coordinator(ScriptLocation::new("/nonexistent", None)).with_switch_hook(
            Arc::new(move |device: &Device, outcome: &SwitchOutcome| {
                sink.lock()
                    .unwrap()
                    .push((device.id.to_string(), outcome.is_spawned()));
            }),
        );
        c.build();
        c.render_result(
            Path::new("/x"),
            &crate::lister::parse_device_lines("{\"id\":2,\"desc\":\"Headphones\"}\n"),
        );

        let handle = c.host().dynamic_entries()[0].handle;
        let labels_before: Vec<String> =
            c.host().entries().iter().map(|e| e.text.clone()).collect();

        assert!(c.host().activate(handle));

        // Spawn failure is reported to the hook but leaves the menu untouched
        assert_eq!(*seen.lock().unwrap(), vec![("2".to_string(), false)]);
        let labels_after: Vec<String> =
            c.host().entries().iter().map(|e| e.text.clone()).collect();
        assert_eq!(labels_before, labels_after);
    }

    #[test]
    fn test_added_device_is_logged_and_bound() {
        let logs = crate::test_utils::LogCapture::default();
        let mut c = coordinator(ScriptLocation::new("/nonexistent", None));
        {
            let _guard = logs.install();
            c.render_result(
                Path::new("/x"),
                &crate::lister::parse_device_lines("{\"id\":7,\"desc\":\"Dock\"}\n"),
            );
        }

        let output = logs.contents();
        assert!(output.contains("Added Dock (ID: 7)"), "{output}");
        assert!(c.host().dynamic_entries()[0].has_activation());
    }

    #[test]
    fn test_activate_unknown_or_unbound_entry() {
        let mut view = MenuView::new();
        let title = view.add_text_entry(MENU_TITLE, false);
        assert!(!view.activate(title));
        assert!(!view.activate(EntryHandle(999)));
    }

    #[test]
    fn test_clear_keeps_prefix_only() {
        let mut view = MenuView::new();
        view.add_text_entry(MENU_TITLE, false);
        view.add_separator();
        view.add_selectable_entry("A");
        view.add_text_entry("status", false);

        view.clear_dynamic_entries();
        assert_eq!(view.entries().len(), FIXED_PREFIX_LEN);
        assert!(view.dynamic_entries().is_empty());
    }

    #[test]
    fn test_script_location_absolute_is_unchanged() {
        let location = ScriptLocation::new("/usr/libexec/get_audio_devices", None);
        assert_eq!(
            location.resolve().unwrap(),
            PathBuf::from("/usr/libexec/get_audio_devices")
        );
    }

    #[test]
    fn test_script_location_relative_uses_install_dir() {
        let location = ScriptLocation::new("get_audio_devices", Some(PathBuf::from("/opt/outsw")));
        assert_eq!(
            location.resolve().unwrap(),
            PathBuf::from("/opt/outsw/get_audio_devices")
        );
    }

    #[test]
    fn test_script_location_defaults_to_executable_dir() {
        let location = ScriptLocation::new("get_audio_devices", None);
        let resolved = location.resolve().unwrap();
        let exe_dir = std::env::current_exe().unwrap().parent().unwrap().to_path_buf();
        assert_eq!(resolved, exe_dir.join("get_audio_devices"));
    }
}
