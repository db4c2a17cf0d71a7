use titlecast_core::TitlecastError;
use titlecast_sink::SinkError;

/// Failures surfaced by the engine's lifecycle controls.
///
/// Snapshot and tick handling never fail; they degrade to "no update".
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("presence feed error: {0}")]
    Feed(#[from] TitlecastError),

    #[error("sink error: {0}")]
    Sink(#[from] SinkError),
}
