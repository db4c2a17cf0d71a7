//! Update scheduler: the Idle/Active state machine behind the title.
//!
//! Snapshots decide *which* rule is active. Ticks advance the evaluation
//! context and, at most once per throttle interval, re-render the active
//! rule and hand the result to the sink worker if it changed.

mod core;
mod state;


pub use self::core::UpdateEngine;
pub use self::state::{ActiveRule, EngineState, IgnoreReason, SnapshotOutcome, TickOutcome};
