//! Command line interface for the browser packager.
//!
//! This module provides argument parsing and the command drivers that tie
//! the session log, notifications and the packaging pipeline together.

mod args;
pub mod commands;

pub use args::{Args, BuildArgs, Command, PackageArgs};
pub use commands::execute_command;

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
