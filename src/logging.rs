//! Logging setup
//!
//! CLI commands log to stderr. The terminal menu owns the screen, so it logs
//! to a size-limited file instead (`outsw.log` plus one `outsw.log.old`).

use color_eyre::eyre::{Result, eyre};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// Rotate the log file once it grows past this size
pub const MAX_LOG_BYTES: u64 = 512 * 1024;

pub const LOG_FILE_NAME: &str = "outsw.log";

// ============================================================================
// Subscriber Setup
// ============================================================================

/// Build a filter from `RUST_LOG`, falling back to `default_directive`
fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive))
}

/// Log to stderr (CLI commands)
pub fn init_stderr(default_directive: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .with_writer(io::stderr)
        .init();
}

/// Log to the rotating file in [`log_dir`] (terminal menu)
///
/// Keep the returned guard alive for the lifetime of the program; dropping it
/// flushes pending lines.
///
/// # Errors
/// Returns an error if no state or cache directory is available.
pub fn init_file(default_directive: &str) -> Result<WorkerGuard> {
    let dir = log_dir()?;
    let appender = RotatingFileAppender::new(dir, LOG_FILE_NAME, MAX_LOG_BYTES);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_directive))
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

/// `$XDG_STATE_HOME/outsw`, falling back to the cache directory
///
/// # Errors
/// Returns an error if neither directory can be determined.
pub fn log_dir() -> Result<PathBuf> {
    dirs::state_dir()
        .or_else(dirs::cache_dir)
        .map(|d| d.join("outsw"))
        .ok_or_else(|| eyre!("Could not determine a state or cache directory for logs"))
}

// ============================================================================
// Rotating File Appender
// ============================================================================

/// Appends to `path`, moving it to `path.old` once it reaches `max_size_bytes`.
///
/// The file is created with 0o600 permissions (Unix) and re-created if it is
/// removed while open.
pub struct RotatingFileAppender {
    path: PathBuf,
    backup_path: PathBuf,
    max_size_bytes: u64,
    file: Option<File>,
}

impl RotatingFileAppender {
    pub fn new(dir: impl Into<PathBuf>, filename: &str, max_size_bytes: u64) -> Self {
        let dir = dir.into();
        Self {
            path: dir.join(filename),
            backup_path: dir.join(format!("{filename}.old")),
            max_size_bytes,
            file: None,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(path: &Path, append: bool) -> io::Result<File> {
        let mut options = fs::OpenOptions::new();
        options.create(true).write(true);
        if append {
            options.append(true);
        } else {
            options.truncate(true);
        }

        #[cfg(unix)]
        {
            options.mode(0o600);
        }

        options.open(path)
    }

    /// Current file handle, (re)opening it when needed
    fn current(&mut self) -> io::Result<&mut File> {
        if !self.path.exists() {
            self.file = None;
        }

        if self.file.is_none() {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            self.file = Some(Self::open(&self.path, true)?);
        }

        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file not open"))
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file = None;
        if self.path.exists() {
            fs::rename(&self.path, &self.backup_path)?;
        }
        self.file = Some(Self::open(&self.path, false)?);
        Ok(())
    }
}

impl Write for RotatingFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let size = self.current()?.metadata()?.len();

        if size >= self.max_size_bytes
            && let Err(e) = self.rotate()
        {
            eprintln!("Failed to rotate log file: {e}");
        }

        self.current()?.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_appends_until_limit() {
        let dir = TempDir::new().unwrap();
        let mut appender = RotatingFileAppender::new(dir.path(), "test.log", 1024);

        appender.write_all(b"first\n").unwrap();
        appender.write_all(b"second\n").unwrap();
        appender.flush().unwrap();

        let contents = fs::read_to_string(appender.path()).unwrap();
        assert_eq!(contents, "first\nsecond\n");
        assert!(!dir.path().join("test.log.old").exists());
    }

    #[test]
    fn test_rotates_when_limit_reached() {
        let dir = TempDir::new().unwrap();
        let mut appender = RotatingFileAppender::new(dir.path(), "test.log", 8);

        appender.write_all(b"0123456789\n").unwrap();
        appender.write_all(b"next\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("test.log")).unwrap(), "next\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("test.log.old")).unwrap(),
            "0123456789\n"
        );
    }

    #[test]
    fn test_recreates_deleted_file() {
        let dir = TempDir::new().unwrap();
        let mut appender = RotatingFileAppender::new(dir.path(), "test.log", 1024);

        appender.write_all(b"before\n").unwrap();
        fs::remove_file(appender.path()).unwrap();
        appender.write_all(b"after\n").unwrap();
        appender.flush().unwrap();

        assert_eq!(fs::read_to_string(appender.path()).unwrap(), "after\n");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("state").join("outsw");
        let mut appender = RotatingFileAppender::new(&nested, LOG_FILE_NAME, MAX_LOG_BYTES);

        appender.write_all(b"hello\n").unwrap();
        assert!(nested.join(LOG_FILE_NAME).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let mut appender = RotatingFileAppender::new(dir.path(), "test.log", 1024);
        appender.write_all(b"x").unwrap();

        let mode = fs::metadata(appender.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
