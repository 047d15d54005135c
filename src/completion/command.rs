//! Completion through an external command
//!
//! Pipes the paper through a shell command and types whatever comes out.
//! Commonly used with local LLMs (Ollama, llama.cpp) or plain scripts.
//!
//! # Example Configuration
//!
//! ```toml
//! [completion]
//! backend = "command"
//! command = "ollama run llama3.2:1b 'Continue this text with one sentence:'"
//! timeout_secs = 30
//! ```
//!
//! The command receives the current paper on stdin and should print only the
//! continuation on stdout.

use super::Completer;
use crate::config::CompletionConfig;
use crate::error::CompletionError;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

/// Completer that runs an external command on the paper text
#[derive(Debug, Clone)]
pub struct CommandCompleter {
    command: String,
    timeout: Duration,
}

impl CommandCompleter {
    /// Create a new command completer from configuration
    pub fn new(config: &CompletionConfig) -> Result<Self, CompletionError> {
        let command = config
            .command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                CompletionError::NotConfigured(
                    "backend = 'command' requires completion.command".into(),
                )
            })?;

        Ok(Self {
            command: command.to_string(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    async fn execute_command(&self, text: &str) -> Result<String, CompletionError> {
        // Spawn command via shell for proper parsing of complex commands
        let mut child = Command::new("sh")
            .args(["-c", &self.command])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CompletionError::Command(format!("failed to spawn: {}", e)))?;

        let stdin = child.stdin.take();
        let output = timeout(self.timeout, async move {
            if let Some(mut stdin) = stdin {
                // Commands that ignore their input may exit before we finish writing
                match stdin.write_all(text.as_bytes()).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                    Err(e) => {
                        return Err(CompletionError::Command(format!(
                            "failed to write to stdin: {}",
                            e
                        )))
                    }
                }
                // Close stdin to signal EOF
                drop(stdin);
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| CompletionError::Command(format!("failed to wait: {}", e)))
        })
        .await
        .map_err(|_| CompletionError::Timeout(self.timeout.as_secs()))??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            return Err(CompletionError::Command(if stderr.is_empty() {
                format!("exited with code {:?}", output.status.code())
            } else {
                format!("exited with code {:?}: {}", output.status.code(), stderr)
            }));
        }

        let completion = String::from_utf8(output.stdout)
            .map_err(|e| CompletionError::Command(format!("output is not valid UTF-8: {}", e)))?;

        // Leading whitespace belongs to the continuation
        Ok(completion.trim_end_matches(['\n', '\r']).to_string())
    }
}

#[async_trait::async_trait]
impl Completer for CommandCompleter {
    async fn complete(&self, current_text: &str) -> Result<String, CompletionError> {
        tracing::debug!("Running completion command: {}", self.command);
        let completion = self.execute_command(current_text).await?;
        if completion.trim().is_empty() {
            return Err(CompletionError::Empty);
        }
        Ok(completion)
    }

    fn name(&self) -> &'static str {
        "command"
    }
}
