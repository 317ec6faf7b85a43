//! External command execution

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, error, warn};
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{ContainerError, Result};

/// Result of one command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Whether the command exited successfully
    pub success: bool,
    /// Exit code of the command
    pub exit_code: Option<i32>,
    /// Standard output
    pub stdout: String,
    /// Standard error
    pub stderr: String,
    /// Duration of the command
    pub duration_ms: u64,
}

impl CommandOutput {
    /// Stdout of a successful run, otherwise an error carrying stderr.
    pub fn into_stdout(self, command: &str) -> Result<String> {
        if self.success {
            Ok(self.stdout)
        } else {
            Err(ContainerError::CommandFailed {
                command: command.to_string(),
                output: self.stderr.trim().to_string(),
            })
        }
    }
}

/// Runs external programs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: Vec<String>) -> Result<CommandOutput>;
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    operation_timeout: Duration,
}

impl ProcessRunner {
    pub fn new(operation_timeout: Duration) -> Self {
        Self { operation_timeout }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &str, args: Vec<String>) -> Result<CommandOutput> {
        let operation = format!("{} {}", program, args.join(" "));
        let start_time = Instant::now();

        let mut cmd = Command::new(program);
        cmd.args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("Executing {}", operation);

        let result = timeout(self.operation_timeout, cmd.output()).await;
        let duration_ms = start_time.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(output)) => {
                let success = output.status.success();
                let exit_code = output.status.code();
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                if success {
                    debug!("{} completed in {}ms", operation, duration_ms);
                } else {
                    warn!("{} failed with exit code {:?}: {}", operation, exit_code, stderr);
                }
                Ok(CommandOutput {
                    success,
                    exit_code,
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr,
                    duration_ms,
                })
            }
            Ok(Err(e)) => {
                error!("{} failed to execute: {}", operation, e);
                Err(ContainerError::CommandFailed {
                    command: operation,
                    output: e.to_string(),
                })
            }
            Err(_) => {
                error!("{} timed out after {:?}", operation, self.operation_timeout);
                Err(ContainerError::Timeout { command: operation })
            }
        }
    }
}
