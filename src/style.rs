//! Terminal styling utilities
//!
//! Provides a consistent color scheme for CLI output and the TUI:
//! - Semantic colors for status (green/yellow/red)
//! - Cyan for headers and technical terms
//! - Dim (from crossterm's `Stylize`) for secondary information

use crossterm::style::Stylize;

/// Extension trait for consistent outsw styling
///
/// # Examples
///
/// ```
/// use outsw::style::OutswStyle;
///
/// println!("{}", "Audio Output Devices".header());
/// println!("{}", "found".success());
/// println!("{}", "/usr/libexec/get_audio_devices".technical());
/// ```
pub trait OutswStyle: Stylize {
    /// Style for section headers (cyan bold)
    fn header(self) -> <<Self as Stylize>::Styled as Stylize>::Styled
    where
        Self: Sized,
        <Self as Stylize>::Styled: Stylize,
    {
        self.cyan().bold()
    }

    /// Style for success/available status (green)
    fn success(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.green()
    }

    /// Style for error/missing status (red)
    fn error(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.red()
    }

    /// Style for warning/partial status (yellow)
    fn warning(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.yellow()
    }

    /// Style for technical terms and identifiers (cyan)
    fn technical(self) -> <Self as Stylize>::Styled
    where
        Self: Sized,
    {
        self.cyan()
    }
}

// Implement for all types that implement Stylize (String, &str, etc.)
impl<T: Stylize> OutswStyle for T {}

// ============================================================================
// Ratatui TUI Color Helpers
// ============================================================================

/// Semantic color palette for TUI use with ratatui
#[cfg(feature = "tui")]
pub mod colors {
    use ratatui::style::Color;

    /// Color for the menu title (use with bold)
    pub const UI_HEADER: Color = Color::Cyan;

    /// Color for selected UI elements (cyan, use with bold)
    pub const UI_SELECTED: Color = Color::Cyan;

    /// Background color for selected UI elements (dark gray)
    pub const UI_SELECTED_BG: Color = Color::DarkGray;

    /// Color for success states (green)
    pub const UI_SUCCESS: Color = Color::Green;

    /// Color for error states (red)
    pub const UI_ERROR: Color = Color::Red;

    /// Color for warning states (yellow)
    pub const UI_WARNING: Color = Color::Yellow;

    /// Color for secondary/dimmed text (gray)
    pub const UI_SECONDARY: Color = Color::Gray;

    /// Color for normal UI text (white)
    pub const UI_TEXT: Color = Color::White;
}
