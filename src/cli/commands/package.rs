//! Package command implementation.
//!
//! Drives one packaging run and reports its lifecycle to the session log and
//! the notification webhook.

use super::EXIT_INTERRUPTED;
use crate::bundler::{Logger, NotificationDispatcher, PackagingPipeline};
use crate::cli::PackageArgs;
use crate::error::{BundlerError, CliError, Result};

/// Execute package command
pub(super) async fn execute_package(args: PackageArgs) -> Result<i32> {
    let logger = Logger::open(args.build.log_dir());
    logger.info(&format!("Session log: {}", logger.path().display()));

    let notifier = if args.notify {
        NotificationDispatcher::from_url(args.webhook_url.clone())
    } else {
        NotificationDispatcher::Disabled
    };

    let mut ctx = match args.build.context() {
        Ok(ctx) => ctx,
        Err(e) => {
            logger.error(&format!("Invalid build configuration: {e}"));
            logger.close()?;
            return Err(e.into());
        }
    };

    notifier
        .build_started(&logger, "package", ctx.architecture().as_str())
        .await;

    let mut pipeline = PackagingPipeline::new(&logger);
    let outcome = tokio::select! {
        result = pipeline.package(&mut ctx) => Some(result),
        _ = tokio::signal::ctrl_c() => None,
    };

    let result = match outcome {
        Some(Ok(true)) => {
            notifier
                .build_step(&logger, "Completed creating AppImage package")
                .await;
            notifier
                .build_succeeded(&logger, ctx.started_at().elapsed())
                .await;
            Ok(0)
        }
        Some(Ok(false)) => {
            let reason = "no AppImage was produced".to_string();
            notifier.build_failed(&logger, &reason).await;
            Err(BundlerError::Cli(CliError::PackagingFailed { reason }))
        }
        Some(Err(e)) => {
            notifier.build_failed(&logger, &e.to_string()).await;
            Err(e.into())
        }
        None => {
            logger.warn("Build interrupted");
            notifier.build_interrupted(&logger).await;
            Ok(EXIT_INTERRUPTED)
        }
    };

    logger.close()?;
    result
}
