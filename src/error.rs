//! Top-level error types for the packaging CLI.
//!
//! Wraps the bundler's errors together with CLI problems and attaches
//! recovery hints for the operator.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all CLI operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Packaging finished without producing an image
    #[error("Packaging failed: {reason}")]
    PackagingFailed {
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as Inner;

        match self {
            BundlerError::Bundler(Inner::Command(failure)) if failure.cause.is_some() => {
                let program = failure.argv.first().map(String::as_str).unwrap_or_default();
                vec![
                    format!("Check that `{program}` exists and is executable"),
                    "Delete build/tools to force a fresh tool download".to_string(),
                ]
            }
            BundlerError::Bundler(Inner::Command(_)) => vec![
                "Read the command output recorded in the session log".to_string(),
                "Set APPIMAGE_EXTRACT_AND_RUN=1 if FUSE is unavailable".to_string(),
            ],
            BundlerError::Bundler(Inner::ArchError(_)) => {
                vec!["Use one of: x64, arm64".to_string()]
            }
            BundlerError::Bundler(Inner::Fs { path, .. }) => vec![format!(
                "Check permissions and free space for {}",
                path.display()
            )],
            BundlerError::Cli(CliError::InvalidArguments { .. }) => {
                vec!["Run with --help to see the accepted options".to_string()]
            }
            BundlerError::Cli(CliError::PackagingFailed { .. }) => vec![
                "Check the warnings in the session log for missing artifacts".to_string(),
                "Verify network access to the appimagetool release URL".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::CommandFailure;

    #[test]
    fn test_spawn_failure_suggests_tool_check() {
        let err = BundlerError::from(crate::bundler::Error::from(CommandFailure {
            argv: vec!["/tools/appimagetool".into()],
            exit_code: None,
            output: Vec::new(),
            cause: Some("No such file or directory".into()),
        }));

        let hints = err.recovery_suggestions();
        assert!(hints[0].contains("/tools/appimagetool"));
    }

    #[test]
    fn test_invalid_arguments_point_to_help() {
        let err = BundlerError::from(CliError::InvalidArguments {
            reason: "Product name cannot be empty".into(),
        });

        assert!(err.to_string().contains("Product name cannot be empty"));
        assert!(err.recovery_suggestions()[0].contains("--help"));
    }

    #[test]
    fn test_generic_suggestion() {
        let err = BundlerError::from(crate::bundler::Error::GenericError("boom".into()));
        assert_eq!(err.recovery_suggestions().len(), 1);
    }
}
