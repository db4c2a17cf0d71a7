//! Sink that prints one JSON line per command on standard output.

use std::io::Write;

use crate::traits::{SinkCommand, SinkError, TitleSink};

#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

/// Format a title command as a single JSON line (no trailing newline).
pub fn format_command(command: &SinkCommand) -> Result<String, SinkError> {
    let value = match command {
        SinkCommand::SetTitle(payload) => {
            let payload: serde_json::Value = serde_json::from_str(payload)
                .map_err(|e| SinkError::Rejected(format!("payload is not JSON: {e}")))?;
            serde_json::json!({ "command": command.label(), "payload": payload })
        }
        SinkCommand::ClearTitle => serde_json::json!({ "command": command.label() }),
    };
    Ok(value.to_string())
}

fn format_warning(message: &str) -> String {
    serde_json::json!({ "command": "show_warning", "message": message }).to_string()
}

fn write_line(line: &str) -> Result<(), SinkError> {
    let mut out = std::io::stdout().lock();
    writeln!(out, "{line}")?;
    out.flush()?;
    Ok(())
}

#[async_trait::async_trait]
impl TitleSink for StdoutSink {
    async fn set_title(&self, payload: &str) -> Result<(), SinkError> {
        write_line(&format_command(&SinkCommand::SetTitle(payload.to_string()))?)
    }

    async fn clear_title(&self) -> Result<(), SinkError> {
        write_line(&format_command(&SinkCommand::ClearTitle)?)
    }

    async fn show_warning(&self, message: &str) -> Result<(), SinkError> {
        write_line(&format_warning(message))
    }

    fn name(&self) -> &str {
        "stdout"
    }
}
