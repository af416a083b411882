//! Operations that have a fixed answer for Linux images.

use crate::bundler::{Arch, Logger, platform::linux};
use crate::cli::BuildArgs;
use crate::error::Result;

/// Execute sign command
pub(super) fn execute_sign(args: &BuildArgs) -> Result<i32> {
    let logger = Logger::open(args.log_dir());
    let ctx = args.context()?;

    let signed = linux::sign_binaries(&logger, &ctx);
    logger.close()?;
    Ok(if signed { 0 } else { 1 })
}

/// Execute universal command
pub(super) fn execute_universal(args: &BuildArgs) -> Result<i32> {
    let logger = Logger::open(args.log_dir());
    let contexts = [args.context_for(Arch::X64)?, args.context_for(Arch::Arm64)?];

    let packaged = linux::package_universal(&logger, &contexts);
    logger.close()?;
    Ok(if packaged { 0 } else { 1 })
}
