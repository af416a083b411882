//! Session log with colored console mirroring.
//!
//! A [`Logger`] owns one append-only log file per build session. The file
//! lives in the directory given to [`Logger::open`] and is named after the
//! moment the session was opened (`build_YYYY-MM-DD_HH-MM-SS.log`). It is
//! created on the first recorded message and flushed after every write, so a
//! crash never loses buffered output.
//!
//! Every component receives the logger by reference; there is no global log
//! state.

use crate::bundler::error::{ErrorExt, Result};
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

/// Severity of a recorded message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Normal progress output.
    Info,
    /// Advisory condition; the build continues.
    Warning,
    /// Fatal condition for the current step.
    Error,
    /// Completed milestone.
    Success,
}

impl Level {
    /// Label written to the session log.
    pub fn label(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Success => "SUCCESS",
        }
    }
}

/// Process-lifetime build log.
#[derive(Debug)]
pub struct Logger {
    path: PathBuf,
    started_at: DateTime<Local>,
    file: Mutex<Option<File>>,
    console: Option<Console>,
}

impl Logger {
    /// Opens a logging session whose file lives in `log_dir`.
    ///
    /// Nothing touches the disk until the first message is recorded.
    pub fn open(log_dir: impl AsRef<Path>) -> Self {
        let started_at = Local::now();
        let file_name = format!("build_{}.log", started_at.format("%Y-%m-%d_%H-%M-%S"));

        Self {
            path: log_dir.as_ref().join(file_name),
            started_at,
            file: Mutex::new(None),
            console: Some(Console::new()),
        }
    }

    /// Enables or disables console mirroring. The session file is unaffected.
    pub fn with_console(mut self, enabled: bool) -> Self {
        self.console = enabled.then(Console::new);
        self
    }

    /// Path of the session log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records a message to the session log and the console.
    pub fn record(&self, message: &str, level: Level) {
        self.append(level, message);

        if let Some(console) = &self.console {
            console.message(level, message);
        }
    }

    /// Records an informational message.
    pub fn info(&self, message: &str) {
        self.record(message, Level::Info);
    }

    /// Records a warning.
    pub fn warn(&self, message: &str) {
        self.record(message, Level::Warning);
    }

    /// Records an error.
    pub fn error(&self, message: &str) {
        self.record(message, Level::Error);
    }

    /// Records a success.
    pub fn success(&self, message: &str) {
        self.record(message, Level::Success);
    }

    /// Prints a raw line (e.g. child process output) to the console and
    /// appends it to the session log as command output.
    pub fn output_line(&self, line: &str) {
        if let Some(console) = &self.console {
            console.plain(line);
        }
        self.append(Level::Info, &format!("| {line}"));
    }

    /// Appends a line to the session file only.
    ///
    /// Write failures are reported through the `log` facade and otherwise
    /// ignored so that a full disk never aborts a build step.
    pub fn append(&self, level: Level, message: &str) {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("[{timestamp}] {}: {message}\n", level.label());

        let mut guard = self.lock();
        if let Err(e) = self.write_line(&mut guard, &line) {
            log::warn!("Failed to write session log {}: {}", self.path.display(), e);
        }
    }

    /// Flushes and closes the session file.
    pub fn close(self) -> Result<()> {
        let mut guard = self.lock();
        if let Some(mut file) = guard.take() {
            file.flush().fs_context("flushing session log", &self.path)?;
            file.sync_all().fs_context("syncing session log", &self.path)?;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        // A panic while holding the lock cannot leave the handle half-written.
        self.file.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_line(&self, slot: &mut Option<File>, line: &str) -> Result<()> {
        if slot.is_none() {
            *slot = Some(self.create_file()?);
        }

        if let Some(file) = slot.as_mut() {
            file.write_all(line.as_bytes())
                .fs_context("writing session log", &self.path)?;
            file.flush().fs_context("flushing session log", &self.path)?;
        }
        Ok(())
    }

    fn create_file(&self) -> Result<File> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).fs_context("creating log directory", dir)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .fs_context("opening session log", &self.path)?;

        let header = format!(
            "Browser Build Log - Started at {}\n{}\n\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            "=".repeat(80)
        );
        file.write_all(header.as_bytes())
            .fs_context("writing session log header", &self.path)?;

        Ok(file)
    }
}

/// Colored terminal output for recorded messages.
struct Console {
    stdout: BufferWriter,
    stderr: BufferWriter,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

impl Console {
    fn new() -> Self {
        Self {
            stdout: BufferWriter::stdout(ColorChoice::Auto),
            stderr: BufferWriter::stderr(ColorChoice::Auto),
        }
    }

    fn message(&self, level: Level, message: &str) {
        let (writer, marker, color) = match level {
            Level::Info => (&self.stdout, None, None),
            Level::Warning => (&self.stdout, Some("⚠"), Some(Color::Yellow)),
            Level::Error => (&self.stderr, Some("✗"), Some(Color::Red)),
            Level::Success => (&self.stdout, Some("✓"), Some(Color::Green)),
        };

        let mut buffer = writer.buffer();
        if let Some(marker) = marker {
            let _ = buffer.set_color(ColorSpec::new().set_fg(color).set_bold(true));
            let _ = write!(&mut buffer, "{marker} ");
            let _ = buffer.reset();
        }
        let _ = writeln!(&mut buffer, "{message}");
        // Console failures never affect the session file.
        let _ = writer.print(&buffer);
    }

    fn plain(&self, line: &str) {
        let mut buffer = self.stdout.buffer();
        let _ = writeln!(&mut buffer, "{line}");
        let _ = self.stdout.print(&buffer);
    }
}
