//! Notification delivery never fails the caller.

use browser_bundler::bundler::{Logger, NotificationDispatcher};
use std::time::Duration;

#[tokio::test]
async fn disabled_dispatcher_reports_success() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Logger::open(dir.path()).with_console(false);
    let notifier = NotificationDispatcher::from_url(None);

    assert!(!notifier.is_enabled());
    assert!(notifier.notify(&logger, "Build started", true).await);
    assert!(notifier.build_failed(&logger, "boom").await);
    // Nothing was recorded, so the session file was never created
    assert!(!logger.path().exists());
}

#[tokio::test]
async fn unreachable_webhook_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let logger = Logger::open(dir.path()).with_console(false);
    let notifier = NotificationDispatcher::from_url(Some("http://127.0.0.1:9/hook".into()));

    assert!(notifier.is_enabled());
    assert!(
        !notifier
            .build_succeeded(&logger, Duration::from_secs(125))
            .await
    );

    let log = std::fs::read_to_string(logger.path()).unwrap();
    assert!(log.contains("WARNING:"));
}
