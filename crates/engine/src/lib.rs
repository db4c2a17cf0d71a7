//! Presence-to-title update engine.
//!
//! Drives the title shown by a [`titlecast_sink::TitleSink`] from presence
//! snapshots and host ticks: matches rules, throttles rendering,
//! deduplicates dispatches and enforces the sink's output constraints.

pub mod error;
pub mod feed;
pub mod scheduler;

pub use error::EngineError;
pub use feed::{PresenceFeed, StaticFeed};
pub use scheduler::{ActiveRule, EngineState, IgnoreReason, SnapshotOutcome, TickOutcome, UpdateEngine};
