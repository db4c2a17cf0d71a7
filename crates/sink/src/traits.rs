//! TitleSink trait definition and shared error types.

/// Errors that can occur while talking to a title sink.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Sink rejected command: {0}")]
    Rejected(String),

    #[error("Sink worker has shut down")]
    Closed,
}

/// A title command queued for the designated sink context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCommand {
    /// Show a title. Carries the serialized payload.
    SetTitle(String),
    ClearTitle,
}

impl SinkCommand {
    pub fn label(&self) -> &'static str {
        match self {
            SinkCommand::SetTitle(_) => "set_title",
            SinkCommand::ClearTitle => "clear_title",
        }
    }
}

/// Trait for title sink implementations.
///
/// Calls are only ever made from the [`SinkWorker`](crate::SinkWorker)
/// task; both title commands are idempotent.
#[async_trait::async_trait]
pub trait TitleSink: Send + Sync {
    async fn set_title(&self, payload: &str) -> Result<(), SinkError>;

    async fn clear_title(&self) -> Result<(), SinkError>;

    /// Surface a warning to the user. Sinks without a user-facing channel just log it.
    async fn show_warning(&self, message: &str) -> Result<(), SinkError> {
        tracing::warn!(sink = self.name(), %message, "title warning");
        Ok(())
    }

    /// Human-readable name for this sink (e.g., "stdout", "webhook").
    fn name(&self) -> &str;
}
