//! Command execution functions for packaging operations.

mod package;
mod platform;

use crate::cli::{Args, Command};
use crate::error::{CliError, Result};

use package::execute_package;
use platform::{execute_sign, execute_universal};

/// Exit code for a run stopped with Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    match args.command {
        Command::Package(package) => execute_package(package).await,
        Command::Sign(build) => execute_sign(&build),
        Command::Universal(build) => execute_universal(&build),
    }
}
