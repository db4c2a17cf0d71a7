//! Title sink dispatch.
//!
//! This crate provides:
//! - `TitleSink` trait for whatever actually paints the title
//! - A superseding single-slot mailbox for set/clear commands
//! - `SinkWorker`, the one designated task allowed to call the sink
//! - Stdout and webhook sink implementations

pub mod dispatcher;
pub mod mailbox;
pub mod stdout;
pub mod traits;
pub mod webhook;

pub use dispatcher::{SinkHandle, SinkWorker};
pub use mailbox::SinkMailbox;
pub use stdout::StdoutSink;
pub use traits::{SinkCommand, SinkError, TitleSink};
pub use webhook::WebhookSink;
