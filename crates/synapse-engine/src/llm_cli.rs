use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::EngineError;

/// Configuration for an LLM command-line invocation.
#[derive(Debug, Clone)]
pub struct LlmCliConfig {
    /// Executable to run. Must accept `-p`, `--system-prompt`, `--model` and
    /// `--output-format`.
    pub command: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for LlmCliConfig {
    fn default() -> Self {
        Self {
            command: "claude".to_string(),
            model: "claude-3-5-haiku-latest".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Run the LLM CLI with a system prompt and user prompt. Returns raw stdout.
pub async fn invoke_llm(
    system_prompt: &str,
    user_prompt: &str,
    config: &LlmCliConfig,
) -> Result<String, EngineError> {
    debug!(command = %config.command, model = %config.model, "Invoking LLM CLI");

    let output = tokio::time::timeout(
        config.timeout,
        Command::new(&config.command)
            .args([
                "-p",
                user_prompt,
                "--system-prompt",
                system_prompt,
                "--model",
                &config.model,
                "--output-format",
                "text",
            ])
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| {
        EngineError::Timeout(
            format!("{} invocation", config.command),
            config.timeout.as_millis() as u64,
        )
    })?
    .map_err(|e| EngineError::Reasoning(format!("Failed to spawn {}: {e}", config.command)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(status = %output.status, stderr = %stderr, "LLM CLI failed");
        return Err(EngineError::Reasoning(format!(
            "{} exited {}: {}",
            config.command, output.status, stderr
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    if stdout.trim().is_empty() {
        return Err(EngineError::Reasoning(format!(
            "{} returned an empty response",
            config.command
        )));
    }

    Ok(stdout)
}

/// Whether `command --version` runs successfully.
pub async fn check_cli_available(command: &str) -> bool {
    match Command::new(command).arg("--version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}
