use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use titlecast_core::config::EngineConfig;
use titlecast_core::{ConnectionState, PresenceSnapshot};
use titlecast_rules::{
    find_match, MiniJinjaEvaluator, RenderError, SharedRuleSet, TemplateEvaluator, TitleRenderer,
};
use titlecast_sink::{SinkCommand, SinkHandle};
use tracing::{debug, info, warn};

use super::state::{ActiveRule, EngineInner, EngineState, SnapshotOutcome, TickOutcome};
use crate::error::EngineError;
use crate::feed::PresenceFeed;

/// Owns the title state machine for one presence feed and one sink.
///
/// Snapshot ingestion and host ticks may arrive from different tasks; all
/// mutable state sits behind a single mutex. Templates are evaluated with
/// the lock released, and a generation counter is re-checked before a
/// rendered title is handed to the sink worker.
pub struct UpdateEngine {
    inner: Mutex<EngineInner>,
    rules: SharedRuleSet,
    evaluator: Arc<dyn TemplateEvaluator>,
    renderer: TitleRenderer,
    throttle: Duration,
    sink: SinkHandle,
    feed: Arc<dyn PresenceFeed>,
}

impl UpdateEngine {
    pub fn new(
        config: &EngineConfig,
        rules: SharedRuleSet,
        sink: SinkHandle,
        feed: Arc<dyn PresenceFeed>,
    ) -> Self {
        let account = config.account.clone().filter(|a| !a.is_empty());
        Self {
            inner: Mutex::new(EngineInner::new(
                config.enabled,
                account,
                config.gradient_feature,
            )),
            rules,
            evaluator: Arc::new(MiniJinjaEvaluator::new()),
            renderer: TitleRenderer::new(config.max_title_length),
            throttle: Duration::from_millis(config.throttle_ms),
            sink,
            feed,
        }
    }

    /// Replace the template evaluator.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn TemplateEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().expect("engine state lock poisoned")
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Connect the presence feed and begin accepting snapshots.
    pub async fn start(&self) -> Result<(), EngineError> {
        self.feed.connect().await?;
        self.lock().running = true;
        info!(feed = %self.feed.connection_state(), "update engine started");
        Ok(())
    }

    /// Stop accepting snapshots, clear the title and disconnect the feed.
    ///
    /// The clear has reached the sink by the time this returns.
    pub async fn stop(&self) -> Result<(), EngineError> {
        let queued = {
            let mut inner = self.lock();
            inner.running = false;
            inner.transition(EngineState::Idle, self.throttle);
            self.sink.send(SinkCommand::ClearTitle)
        };
        let cleared = match queued {
            Ok(()) => self.sink.flush().await,
            Err(e) => Err(e),
        };
        self.feed.disconnect().await?;
        cleared?;
        info!("update engine stopped");
        Ok(())
    }

    /// Enable or disable title updates.
    ///
    /// Either way the engine returns to `Idle` and exactly one clear is
    /// delivered to the sink before this returns.
    pub async fn set_enabled(&self, enabled: bool) -> Result<(), EngineError> {
        {
            let mut inner = self.lock();
            inner.enabled = enabled;
            inner.transition(EngineState::Idle, self.throttle);
            // Queued under the lock so no tick can slip a title in after it.
            self.sink.send(SinkCommand::ClearTitle)?;
        }
        info!(enabled, "update engine toggled");
        self.sink.flush().await?;
        Ok(())
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.feed.connection_state()
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    pub fn state(&self) -> EngineState {
        self.lock().state.clone()
    }

    pub fn seconds_elapsed(&self) -> f64 {
        self.lock().context.seconds_elapsed
    }

    /// Only accept snapshots for `account`. `None` or an empty string accepts all.
    pub fn set_account_filter(&self, account: Option<String>) {
        self.lock().account = account.filter(|a| !a.is_empty());
    }

    pub fn set_gradient_feature(&self, granted: bool) {
        self.lock().gradient_feature = granted;
    }

    pub fn rules(&self) -> &SharedRuleSet {
        &self.rules
    }

    // ── Snapshot path ───────────────────────────────────────────

    /// Apply a presence snapshot from the feed.
    pub fn on_presence_snapshot(&self, account: &str, snapshot: &PresenceSnapshot) -> SnapshotOutcome {
        let context = {
            let inner = self.lock();
            if let Err(reason) = inner.accepts(account) {
                debug!(account, ?reason, "presence snapshot ignored");
                return SnapshotOutcome::Ignored(reason);
            }
            inner.context.clone()
        };

        // Filters are user templates; match against the live rules unlocked.
        let rules = self.rules.snapshot();
        let found = find_match(self.evaluator.as_ref(), snapshot, &rules, &context);

        let mut inner = self.lock();
        if let Err(reason) = inner.accepts(account) {
            debug!(account, ?reason, "presence snapshot dropped after matching");
            return SnapshotOutcome::Ignored(reason);
        }

        let Some(m) = found else {
            if !inner.state.is_active() {
                return SnapshotOutcome::Unchanged;
            }
            info!("no rule matches, clearing title");
            inner.transition(EngineState::Idle, self.throttle);
            self.post_clear();
            return SnapshotOutcome::Cleared;
        };

        if let EngineState::Active(active) = &mut inner.state {
            if active.rule_id == m.rule.id {
                active.activity = m.activity;
                return SnapshotOutcome::Refreshed;
            }
        }

        info!(rule = %m.rule.name, activity = %m.activity.name, "rule activated");
        let active = ActiveRule {
            rule_id: m.rule.id,
            rule_name: m.rule.name,
            activity: m.activity,
        };
        inner.transition(EngineState::Active(active), self.throttle);
        SnapshotOutcome::Activated
    }

    fn post_clear(&self) {
        if let Err(e) = self.sink.send(SinkCommand::ClearTitle) {
            warn!(error = %e, "failed to queue clear");
        }
    }

    // ── Tick path ───────────────────────────────────────────────

    /// Advance elapsed time by `delta` and re-render if the throttle allows.
    pub fn on_tick(&self, delta: Duration) -> TickOutcome {
        let (generation, active, context, gradient_feature) = {
            let mut inner = self.lock();
            if !inner.running || !inner.enabled {
                return TickOutcome::Disabled;
            }
            let EngineState::Active(active) = &inner.state else {
                return TickOutcome::Idle;
            };
            let active = active.clone();

            inner.context.advance(delta);
            inner.since_render += delta;
            if inner.since_render < self.throttle {
                return TickOutcome::Throttled;
            }
            inner.since_render = Duration::ZERO;

            (inner.generation, active, inner.context.clone(), inner.gradient_feature)
        };

        let rule = match self.rules.get(active.rule_id) {
            Some(rule) if rule.enabled => rule,
            _ => return self.clear_vanished(generation, &active),
        };

        let rendered = self.renderer.render(
            self.evaluator.as_ref(),
            &rule,
            &active.activity,
            &context,
            gradient_feature,
        );

        let mut inner = self.lock();
        if inner.generation != generation {
            debug!(rule = %active.rule_name, "state changed during render, dropping result");
            return TickOutcome::Stale;
        }

        match rendered {
            Ok(title) => {
                if inner.dispatch.last_payload.as_deref() == Some(title.json.as_str()) {
                    debug!(rule = %rule.name, "title unchanged, not dispatching");
                    return TickOutcome::Unchanged;
                }
                match self.sink.send(SinkCommand::SetTitle(title.json.clone())) {
                    Ok(()) => {
                        debug!(rule = %rule.name, title = %title.payload.title, "title dispatched");
                        inner.dispatch.last_payload = Some(title.json);
                        TickOutcome::Dispatched
                    }
                    Err(e) => {
                        warn!(rule = %rule.name, error = %e, "failed to queue title");
                        TickOutcome::SinkClosed
                    }
                }
            }
            Err(RenderError::TooLong { text, length, max }) => {
                if !inner.dispatch.warned {
                    inner.dispatch.warned = true;
                    let message = format!(
                        "Title from rule '{}' is too long ({length} > {max} characters): {text}",
                        rule.name
                    );
                    warn!(rule = %rule.name, length, max, "rendered title too long");
                    if let Err(e) = self.sink.warn(message) {
                        warn!(error = %e, "failed to queue warning");
                    }
                }
                TickOutcome::TooLong
            }
            Err(e) => {
                warn!(rule = %rule.name, error = %e, "title render failed");
                TickOutcome::RenderFailed
            }
        }
    }

    /// The active rule was removed from the live set or disabled.
    fn clear_vanished(&self, generation: u64, active: &ActiveRule) -> TickOutcome {
        let mut inner = self.lock();
        if inner.generation != generation {
            return TickOutcome::Stale;
        }
        info!(rule = %active.rule_name, "active rule no longer available, clearing title");
        inner.transition(EngineState::Idle, self.throttle);
        self.post_clear();
        TickOutcome::Cleared
    }
}
