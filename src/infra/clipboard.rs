use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::{AppError, AppResult};
use crate::services::Clipboard;

/// Pipes text into a clipboard helper such as `wl-copy`, `xclip -selection clipboard`
/// or `pbcopy`.
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn parse(command_line: &str) -> AppResult<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AppError::Configuration("clipboard command is empty".to_string()))?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    async fn write_text(&self, text: &str) -> AppResult<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| AppError::Clipboard(format!("failed to run {}: {err}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).await.map_err(|err| {
                AppError::Clipboard(format!("failed to write to {}: {err}", self.program))
            })?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|err| AppError::Clipboard(format!("{} did not finish: {err}", self.program)))?;
        if !output.status.success() {
            return Err(AppError::Clipboard(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}
