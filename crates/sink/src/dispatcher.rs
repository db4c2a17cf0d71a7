//! The designated sink context.
//!
//! Exactly one task, spawned by [`SinkWorker::spawn`], ever calls into the
//! [`TitleSink`]. Everything else posts to the shared [`SinkMailbox`]
//! through a [`SinkHandle`]. Sink failures are logged and never stop the
//! worker.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::mailbox::{Batch, SinkMailbox};
use crate::traits::{SinkCommand, SinkError, TitleSink};

/// Cloneable producer side of the sink mailbox.
#[derive(Clone)]
pub struct SinkHandle {
    mailbox: Arc<SinkMailbox>,
}

impl SinkHandle {
    /// Queue a title command. Supersedes any command not yet delivered.
    pub fn send(&self, command: SinkCommand) -> Result<(), SinkError> {
        self.mailbox.post(command)
    }

    /// Queue a user-facing warning.
    pub fn warn(&self, message: impl Into<String>) -> Result<(), SinkError> {
        self.mailbox.post_warning(message)
    }

    /// Wait until every command posted so far has reached the sink.
    pub async fn flush(&self) -> Result<(), SinkError> {
        self.mailbox
            .request_flush()
            .await
            .map_err(|_| SinkError::Closed)
    }

    /// Close the mailbox. The worker delivers what is queued, then exits.
    pub fn shutdown(&self) {
        self.mailbox.close();
    }
}

pub struct SinkWorker {
    sink: Arc<dyn TitleSink>,
    mailbox: Arc<SinkMailbox>,
}

impl SinkWorker {
    /// Spawn the worker task on the current tokio runtime.
    pub fn spawn(sink: Arc<dyn TitleSink>) -> (SinkHandle, JoinHandle<()>) {
        let mailbox = Arc::new(SinkMailbox::new());
        let worker = SinkWorker {
            sink,
            mailbox: mailbox.clone(),
        };
        let join = tokio::spawn(worker.run());
        (SinkHandle { mailbox }, join)
    }

    async fn run(self) {
        tracing::info!(sink = self.sink.name(), "sink worker started");

        loop {
            let batch = self.mailbox.take();
            let closed = batch.closed;

            if batch.is_empty() {
                if closed {
                    break;
                }
                self.mailbox.wait().await;
                continue;
            }

            self.deliver(batch).await;
        }

        tracing::info!(sink = self.sink.name(), "sink worker stopped");
    }

    async fn deliver(&self, batch: Batch) {
        let sink_name = self.sink.name();

        if let Some(command) = batch.command {
            let result = match &command {
                SinkCommand::SetTitle(payload) => self.sink.set_title(payload).await,
                SinkCommand::ClearTitle => self.sink.clear_title().await,
            };
            match result {
                Ok(()) => tracing::debug!(sink = sink_name, command = command.label(), "title command delivered"),
                Err(e) => tracing::warn!(
                    sink = sink_name,
                    command = command.label(),
                    error = %e,
                    "title command failed"
                ),
            }
        }

        for message in batch.warnings {
            if let Err(e) = self.sink.show_warning(&message).await {
                tracing::warn!(sink = sink_name, error = %e, "failed to show warning");
            }
        }

        for waiter in batch.flush_waiters {
            let _ = waiter.send(());
        }
    }
}
