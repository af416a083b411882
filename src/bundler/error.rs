//! Error types for bundler operations.
//!
//! Packaging distinguishes two classes of problems:
//!
//! - **Fatal** conditions abort the current run and surface as [`Error`].
//!   The most common one is [`Error::Command`], raised when a child process
//!   cannot be started or exits non-zero while failure-on-nonzero is requested.
//! - **Advisory** conditions (a missing artifact, a missing icon, a webhook
//!   outage) are written to the session log as warnings and never become an
//!   [`Error`].
//!
//! # Features
//!
//! - **Context trait**: Add context to errors similar to anyhow
//! - **ErrorExt trait**: Filesystem operations with automatic path context
//! - **bail! macro**: Early return with formatted error messages

use std::{
    fmt::{self, Display},
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Failure of an external command.
///
/// Carries everything an operator needs to diagnose the failing step: the
/// full argv, the exit code (absent when the process never started or was
/// killed by a signal) and every line the process wrote to its merged
/// stdout/stderr stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFailure {
    /// Program and arguments as passed to the executor.
    pub argv: Vec<String>,
    /// Exit code, if the process ran to completion.
    pub exit_code: Option<i32>,
    /// Captured output, in emission order.
    pub output: Vec<String>,
    /// Reason the process could not be started, if it never ran.
    pub cause: Option<String>,
}

impl CommandFailure {
    /// Returns the argv joined with spaces, as shown in logs.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

impl Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.cause, self.exit_code) {
            (Some(cause), _) => write!(f, "failed to start `{}`: {}", self.command_line(), cause),
            (None, Some(code)) => write!(
                f,
                "command `{}` exited with code {}",
                self.command_line(),
                code
            ),
            (None, None) => write!(
                f,
                "command `{}` was terminated by a signal",
                self.command_line()
            ),
        }
    }
}

impl std::error::Error for CommandFailure {}

/// Errors returned by the bundler.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "creating bundle directory")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// An external command failed to start or exited non-zero.
    #[error(transparent)]
    Command(#[from] CommandFailure),

    /// Error walking directory (used when merging directory trees).
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// HTTP client error (downloading tools).
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unsupported CPU architecture.
    #[error("unsupported architecture: {0}")]
    ArchError(String),

    /// The package path of a build context was already recorded.
    #[error("package path already recorded as {0}")]
    PackagePathAlreadySet(PathBuf),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with bundler's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying binary".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// # Examples
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(exit_code: Option<i32>, cause: Option<&str>) -> CommandFailure {
        CommandFailure {
            argv: vec!["sh".into(), "-c".into(), "exit 7".into()],
            exit_code,
            output: Vec::new(),
            cause: cause.map(str::to_string),
        }
    }

    #[test]
    fn test_command_failure_display_exit_code() {
        let msg = failure(Some(7), None).to_string();
        assert_eq!(msg, "command `sh -c exit 7` exited with code 7");
    }

    #[test]
    fn test_command_failure_display_spawn_error() {
        let msg = failure(None, Some("No such file or directory")).to_string();
        assert!(msg.starts_with("failed to start `sh -c exit 7`"));
        assert!(msg.contains("No such file or directory"));
    }

    #[test]
    fn test_option_context() {
        let missing: Option<u8> = None;
        let err = missing.context("no main binary").unwrap_err();
        assert_eq!(err.to_string(), "no main binary");
    }

    #[test]
    fn test_fs_context_includes_path() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
        let err = result.fs_context("reading file", "/tmp/x").unwrap_err();
        assert_eq!(err.to_string(), "reading file /tmp/x: gone");
    }
}
