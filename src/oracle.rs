//! Precise lookup through an external jump-to-definition command.

use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::config::OracleConfig;
use crate::error::Error;
use crate::locator::{Oracle, OracleTarget, QueryContext};

/// Runs a configured helper program and reads its JSON answer from stdout.
///
/// The helper is called as `command [args..] --file F --line L --column C`
/// with a zero-based position, and prints either nothing, `null`, or
/// `{"resultFile": "...", "fullPath": "..."}`.
#[derive(Debug, Clone)]
pub struct CommandOracle {
    /// Program, arguments, and timeout.
    config: OracleConfig,
}

impl CommandOracle {
    /// Oracle backed by the configured command.
    pub const fn new(config: OracleConfig) -> Self {
        return Self { config };
    }
}

impl Oracle for CommandOracle {
    async fn resolve(&self, context: &QueryContext) -> Result<Option<OracleTarget>, Error> {
        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .arg("--file")
            .arg(&context.document)
            .arg("--line")
            .arg(context.position.line.to_string())
            .arg("--column")
            .arg(context.position.column.to_string())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let timeout_ms = u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX);
        let output = tokio::time::timeout(self.config.timeout, command.output())
            .await
            .map_err(|_elapsed| {
                return Error::OracleTimeout {
                    command: self.config.command.clone(),
                    timeout_ms,
                };
            })?
            .map_err(|e| {
                return Error::OracleFailed {
                    command: self.config.command.clone(),
                    reason: e.to_string(),
                };
            })?;

        if !output.status.success() {
            return Err(Error::OracleFailed {
                command: self.config.command.clone(),
                reason: output.status.to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        debug!(command = %self.config.command, answer = %stdout.trim(), "oracle answered");
        return parse_answer(&stdout).map_err(|e| {
            return Error::OracleFailed {
                command: self.config.command.clone(),
                reason: e.to_string(),
            };
        });
    }
}

/// Parse the helper's stdout. Blank output and `null` mean no target.
///
/// # Errors
///
/// Returns `Error::Json` if the output is neither blank nor valid JSON.
fn parse_answer(stdout: &str) -> Result<Option<OracleTarget>, Error> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    return Ok(serde_json::from_str::<Option<OracleTarget>>(trimmed)?);
}
