//! External tool execution

use async_trait::async_trait;
use repogen_core::{with_timeout, ErrorContext, RepogenError, RepogenResult};
use std::io::ErrorKind;
use tokio::process::Command;
use tracing::debug;

/// Captured result of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs such as `pipreqs`
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, killing it after `timeout_secs`
    ///
    /// A program that cannot be found is reported as `RepogenError::NotFound`
    /// with the program name as the resource.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout_secs: u64,
    ) -> RepogenResult<CommandOutput>;
}

/// Runs commands on the host with `tokio::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout_secs: u64,
    ) -> RepogenResult<CommandOutput> {
        debug!(program = %program, args = ?args, "Running external command");

        let mut cmd = Command::new(program);
        cmd.args(args).kill_on_drop(true);

        let output = with_timeout(cmd.output(), timeout_secs.saturating_mul(1000), program)
            .await?
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    RepogenError::NotFound {
                        resource: program.to_string(),
                        context: ErrorContext::new("command_runner")
                            .with_operation("spawn")
                            .with_suggestion("Install the tool or fix its configured path"),
                    }
                } else {
                    RepogenError::Tool {
                        message: format!("Failed to run {}: {}", program, e),
                        tool: program.to_string(),
                        context: ErrorContext::new("command_runner").with_operation("spawn"),
                    }
                }
            })?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}
