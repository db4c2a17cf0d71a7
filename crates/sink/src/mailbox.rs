//! Single-consumer mailbox feeding the designated sink task.
//!
//! Title commands do not queue: a newer set or clear replaces one that
//! has not been delivered yet, so the sink only ever sees the latest
//! intent. Warnings are kept in order. Flush waiters are released after
//! everything posted before them has been handed to the sink.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::{oneshot, Notify};

use crate::traits::{SinkCommand, SinkError};

#[derive(Default)]
struct MailboxState {
    pending: Option<SinkCommand>,
    warnings: VecDeque<String>,
    flush_waiters: Vec<oneshot::Sender<()>>,
    closed: bool,
}

/// Everything the worker should deliver in one pass.
#[derive(Default)]
pub struct Batch {
    pub command: Option<SinkCommand>,
    pub warnings: Vec<String>,
    pub flush_waiters: Vec<oneshot::Sender<()>>,
    pub closed: bool,
}

impl Batch {
    /// Nothing to deliver and nobody waiting.
    pub fn is_empty(&self) -> bool {
        self.command.is_none() && self.warnings.is_empty() && self.flush_waiters.is_empty()
    }
}

#[derive(Default)]
pub struct SinkMailbox {
    state: Mutex<MailboxState>,
    notify: Notify,
}

impl SinkMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a title command, superseding any undelivered one.
    pub fn post(&self, command: SinkCommand) -> Result<(), SinkError> {
        {
            let mut state = self.state.lock().expect("sink mailbox lock poisoned");
            if state.closed {
                return Err(SinkError::Closed);
            }
            if let Some(previous) = state.pending.replace(command) {
                tracing::debug!(superseded = previous.label(), "undelivered title command replaced");
            }
        }
        self.notify.notify_one();
        Ok(())
    }

    pub fn post_warning(&self, message: impl Into<String>) -> Result<(), SinkError> {
        {
            let mut state = self.state.lock().expect("sink mailbox lock poisoned");
            if state.closed {
                return Err(SinkError::Closed);
            }
            state.warnings.push_back(message.into());
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Register a flush waiter. The receiver resolves once every command
    /// posted before this call has been delivered. On a closed mailbox the
    /// sender is dropped straight away.
    pub fn request_flush(&self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.state.lock().expect("sink mailbox lock poisoned");
            if state.closed {
                return rx;
            }
            state.flush_waiters.push(tx);
        }
        self.notify.notify_one();
        rx
    }

    /// Stop accepting new commands. Already-posted work is still drained.
    pub fn close(&self) {
        self.state.lock().expect("sink mailbox lock poisoned").closed = true;
        self.notify.notify_one();
    }

    /// Take everything currently queued.
    pub fn take(&self) -> Batch {
        let mut state = self.state.lock().expect("sink mailbox lock poisoned");
        Batch {
            command: state.pending.take(),
            warnings: state.warnings.drain(..).collect(),
            flush_waiters: std::mem::take(&mut state.flush_waiters),
            closed: state.closed,
        }
    }

    /// Wait until something is posted (or the mailbox closes).
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}
