//! Child process execution: live capture, logging and failure reporting.

use browser_bundler::bundler::{CommandExecutor, Error, ExecOptions, Logger};

fn quiet_logger(dir: &tempfile::TempDir) -> Logger {
    Logger::open(dir.path().join("logs")).with_console(false)
}

#[tokio::test]
async fn echo_is_captured_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let logger = quiet_logger(&dir);

    let result = CommandExecutor::new(&logger)
        .execute(&["sh", "-c", "echo hello"], &ExecOptions::default())
        .await
        .unwrap();

    assert_eq!(result.exit_code, 0);
    assert_eq!(result.output, vec!["hello".to_string()]);

    let log = std::fs::read_to_string(logger.path()).unwrap();
    assert!(log.contains("INFO: | hello"));
    assert!(log.contains("Command completed with exit code: 0"));
}

#[tokio::test]
async fn nonzero_exit_raises_with_code() {
    let dir = tempfile::tempdir().unwrap();
    let logger = quiet_logger(&dir);

    let err = CommandExecutor::new(&logger)
        .execute(&["sh", "-c", "echo doomed; exit 7"], &ExecOptions::default())
        .await
        .unwrap_err();

    let Error::Command(failure) = err else {
        panic!("expected a command failure, got {err:?}");
    };
    assert_eq!(failure.exit_code, Some(7));
    assert_eq!(failure.argv, vec!["sh", "-c", "echo doomed; exit 7"]);
    assert_eq!(failure.output, vec!["doomed".to_string()]);

    let log = std::fs::read_to_string(logger.path()).unwrap();
    assert!(log.contains("ERROR: Exit code: 7"));
}

#[tokio::test]
async fn nonzero_exit_allowed_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    let logger = quiet_logger(&dir);

    let result = CommandExecutor::new(&logger)
        .execute(&["sh", "-c", "exit 7"], &ExecOptions::allow_failure())
        .await
        .unwrap();

    assert_eq!(result.exit_code, 7);
    assert!(!result.success());
    assert!(result.output.is_empty());
}

#[tokio::test]
async fn missing_program_is_a_command_failure() {
    let dir = tempfile::tempdir().unwrap();
    let logger = quiet_logger(&dir);

    let err = CommandExecutor::new(&logger)
        .execute(
            &["/nonexistent/appimagetool", "--version"],
            &ExecOptions::allow_failure(),
        )
        .await
        .unwrap_err();

    let Error::Command(failure) = err else {
        panic!("expected a command failure, got {err:?}");
    };
    assert_eq!(failure.exit_code, None);
    assert!(failure.cause.is_some());
}
