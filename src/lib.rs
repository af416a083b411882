//! Browser AppImage packager library
//!
//! This library provides the core packaging functionality for turning the
//! output of a Chromium-based browser build into a portable AppImage:
//! - session logging with console mirroring
//! - child process execution with live, captured output
//! - optional webhook build notifications
//! - AppDir assembly and appimagetool invocation
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
