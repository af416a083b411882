//! External command execution with live, fully captured output.
//!
//! The child's stdout and stderr are wired to the write end of a single pipe,
//! so the parent reads one stream in the order the child produced it. Each
//! line is echoed to the console, appended to the session log and collected
//! for the returned [`CommandResult`] inside the same read loop.

use crate::bundler::{
    error::{CommandFailure, Result},
    logging::{Level, Logger},
};
use std::collections::HashMap;
use std::os::fd::OwnedFd;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::unix::pipe;
use tokio::process::{Child, Command};

/// Completed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Exit code, or `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    /// Non-empty output lines in emission order, stdout and stderr interleaved.
    pub output: Vec<String>,
}

impl CommandResult {
    /// True when the command exited with code zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Options for a single [`CommandExecutor::execute`] call.
#[derive(Debug, Clone)]
pub struct ExecOptions {
    /// Working directory for the child; inherits the parent's when unset.
    pub working_dir: Option<PathBuf>,
    /// Variables layered over the inherited environment.
    pub environment: HashMap<String, String>,
    /// Raise [`CommandFailure`] when the exit code is non-zero.
    pub fail_on_nonzero: bool,
}

impl Default for ExecOptions {
    fn default() -> Self {
        Self {
            working_dir: None,
            environment: HashMap::new(),
            fail_on_nonzero: true,
        }
    }
}

impl ExecOptions {
    /// Returns the result regardless of exit code.
    pub fn allow_failure() -> Self {
        Self {
            fail_on_nonzero: false,
            ..Self::default()
        }
    }

    /// Sets the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Adds an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }
}

/// Runs external commands through a [`Logger`].
#[derive(Debug, Clone, Copy)]
pub struct CommandExecutor<'a> {
    logger: &'a Logger,
}

impl<'a> CommandExecutor<'a> {
    /// Creates an executor that records through `logger`.
    pub fn new(logger: &'a Logger) -> Self {
        Self { logger }
    }

    /// Runs `argv` to completion.
    ///
    /// Output is streamed line by line while the child runs. A child that
    /// cannot be started is reported as a [`CommandFailure`] without an exit
    /// code; a non-zero exit is reported the same way (with its code) when
    /// [`ExecOptions::fail_on_nonzero`] is set.
    pub async fn execute<S: AsRef<str>>(
        &self,
        argv: &[S],
        options: &ExecOptions,
    ) -> Result<CommandResult> {
        let argv: Vec<String> = argv.iter().map(|a| a.as_ref().to_string()).collect();
        let command_line = argv.join(" ");

        self.logger.info(&format!("🔧 Running: {command_line}"));

        let (mut child, reader) = match self.spawn(&argv, options) {
            Ok(spawned) => spawned,
            Err(e) => {
                self.logger.error(&format!("Failed to start {command_line}: {e}"));
                return Err(CommandFailure {
                    argv,
                    exit_code: None,
                    output: Vec::new(),
                    cause: Some(e.to_string()),
                }
                .into());
            }
        };

        let mut output = Vec::new();
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    let line = line.trim_end();
                    if !line.is_empty() {
                        self.logger.output_line(line);
                        output.push(line.to_string());
                    }
                }
                Err(e) => {
                    log::warn!("Stopped reading output of {}: {}", command_line, e);
                    break;
                }
            }
        }
        // A child blocked on a full pipe only exits once the read end is gone.
        drop(reader);

        let status = match child.wait().await {
            Ok(status) => status,
            Err(e) => {
                self.logger.error(&format!("Failed to wait for {command_line}: {e}"));
                return Err(CommandFailure {
                    argv,
                    exit_code: None,
                    output,
                    cause: Some(e.to_string()),
                }
                .into());
            }
        };

        let exit_code = status.code().unwrap_or(-1);
        self.logger.append(
            Level::Info,
            &format!("Command completed with exit code: {exit_code}"),
        );

        if options.fail_on_nonzero && exit_code != 0 {
            self.logger.error(&format!("Command failed: {command_line}"));
            self.logger.error(&format!("Exit code: {exit_code}"));
            return Err(CommandFailure {
                argv,
                exit_code: status.code(),
                output,
                cause: None,
            }
            .into());
        }

        Ok(CommandResult { exit_code, output })
    }

    /// Spawns the child with both output streams on one pipe.
    fn spawn(
        &self,
        argv: &[String],
        options: &ExecOptions,
    ) -> std::io::Result<(Child, pipe::Receiver)> {
        let Some((program, args)) = argv.split_first() else {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty command",
            ));
        };

        let (read_end, write_end) = std::io::pipe()?;
        let stderr_end = write_end.try_clone()?;

        // The command owns the parent's copies of the write end; it must be
        // dropped right after spawning or the reader never sees EOF.
        let child = {
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::null())
                .stdout(Stdio::from(write_end))
                .stderr(Stdio::from(stderr_end))
                .kill_on_drop(true);

            if let Some(dir) = &options.working_dir {
                command.current_dir(dir);
            }
            for (key, value) in &options.environment {
                command.env(key, value);
            }

            command.spawn()?
        };

        let reader = pipe::Receiver::from_owned_fd(OwnedFd::from(read_end))?;
        Ok((child, reader))
    }
}

/// Renders a path argument for an argv.
pub fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
