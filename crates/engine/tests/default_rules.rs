//! End-to-end runs of the engine over the seed rules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use titlecast_core::config::EngineConfig;
use titlecast_core::{ActivityEntry, PresenceEvent, PresenceSnapshot};
use titlecast_engine::{StaticFeed, TickOutcome, UpdateEngine};
use titlecast_rules::defaults::default_rules;
use titlecast_rules::SharedRuleSet;
use titlecast_sink::{SinkError, SinkHandle, SinkWorker, TitleSink};

#[derive(Default)]
struct CountingSink {
    titles: Mutex<Vec<String>>,
    clears: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl TitleSink for CountingSink {
    async fn set_title(&self, payload: &str) -> Result<(), SinkError> {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|e| SinkError::Rejected(e.to_string()))?;
        let title = value["Title"].as_str().unwrap_or_default().to_string();
        self.titles.lock().unwrap().push(title);
        Ok(())
    }

    async fn clear_title(&self) -> Result<(), SinkError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "counting"
    }
}

async fn engine() -> (UpdateEngine, Arc<CountingSink>, SinkHandle) {
    let sink = Arc::new(CountingSink::default());
    let (handle, _join) = SinkWorker::spawn(sink.clone());
    let engine = UpdateEngine::new(
        &EngineConfig::default(),
        SharedRuleSet::new(default_rules()),
        handle.clone(),
        Arc::new(StaticFeed::new()),
    );
    engine.start().await.unwrap();
    (engine, sink, handle)
}

/// Tick for `seconds` of host time at 100 ms frames, flushing each frame.
async fn run_for(engine: &UpdateEngine, handle: &SinkHandle, seconds: u32) {
    for _ in 0..seconds * 10 {
        engine.on_tick(Duration::from_millis(100));
        handle.flush().await.unwrap();
    }
}

#[tokio::test]
async fn spotify_titles_cycle_through_label_track_and_artist() {
    let (engine, sink, handle) = engine().await;
    let snapshot = PresenceSnapshot::new(vec![
        ActivityEntry::game("Elden Ring"),
        ActivityEntry::spotify("Clair de Lune", vec!["Debussy".into()]),
    ]);
    engine.on_presence_snapshot("me", &snapshot);

    run_for(&engine, &handle, 29).await;

    assert_eq!(
        *sink.titles.lock().unwrap(),
        vec!["♪Listening to Spotify♪", "♪Clair de Lune♪", "♪Debussy♪"]
    );
}

#[tokio::test]
async fn music_stopping_falls_back_to_game_rule() {
    let (engine, sink, handle) = engine().await;
    engine.on_presence_snapshot(
        "me",
        &PresenceSnapshot::new(vec![
            ActivityEntry::game("Elden Ring"),
            ActivityEntry::spotify("Clair de Lune", vec!["Debussy".into()]),
        ]),
    );
    run_for(&engine, &handle, 1).await;

    engine.on_presence_snapshot("me", &PresenceSnapshot::new(vec![ActivityEntry::game("Elden Ring")]));
    run_for(&engine, &handle, 11).await;

    assert_eq!(
        *sink.titles.lock().unwrap(),
        vec!["♪Listening to Spotify♪", "Playing Game", "Elden Ring"]
    );
    assert_eq!(sink.clears.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn json_events_drive_the_engine() {
    let (engine, sink, handle) = engine().await;
    let line = r#"{"account":"me","activities":[{"name":"Hades","kind":"Game"}]}"#;
    let event = PresenceEvent::from_json_line(line).unwrap();

    engine.on_presence_snapshot(&event.account, &event.snapshot);
    assert_eq!(engine.on_tick(Duration::from_millis(100)), TickOutcome::Dispatched);
    handle.flush().await.unwrap();

    let empty = PresenceEvent::from_json_line(r#"{"account":"me","activities":[]}"#).unwrap();
    engine.on_presence_snapshot(&empty.account, &empty.snapshot);
    handle.flush().await.unwrap();

    assert_eq!(*sink.titles.lock().unwrap(), vec!["Playing Game"]);
    assert_eq!(sink.clears.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn host_game_never_gets_a_title() {
    let (engine, sink, handle) = engine().await;
    engine.on_presence_snapshot(
        "me",
        &PresenceSnapshot::new(vec![ActivityEntry::game("FINAL FANTASY XIV Online")]),
    );
    run_for(&engine, &handle, 2).await;

    assert!(sink.titles.lock().unwrap().is_empty());
}
