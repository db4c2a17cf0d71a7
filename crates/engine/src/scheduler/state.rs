use std::time::Duration;

use titlecast_core::ActivityEntry;
use titlecast_rules::{EvaluationContext, RuleId};

/// The rule currently driving the title and the activity it bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveRule {
    pub rule_id: RuleId,
    pub rule_name: String,
    pub activity: ActivityEntry,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum EngineState {
    #[default]
    Idle,
    Active(ActiveRule),
}

impl EngineState {
    pub fn is_active(&self) -> bool {
        matches!(self, EngineState::Active(_))
    }

    pub fn active_rule_id(&self) -> Option<RuleId> {
        match self {
            EngineState::Active(active) => Some(active.rule_id),
            EngineState::Idle => None,
        }
    }
}

/// Why a snapshot was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The engine has not been started, or was stopped.
    Stopped,
    Disabled,
    /// The snapshot belongs to an account other than the configured one.
    AccountMismatch,
}

/// What a presence snapshot did to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Ignored(IgnoreReason),
    /// A different rule (or the first rule) became active.
    Activated,
    /// The same rule matched again; only its activity was refreshed.
    Refreshed,
    /// Nothing matched while a rule was active; a clear was sent.
    Cleared,
    /// Nothing matched and nothing was active.
    Unchanged,
}

/// What one host tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Disabled,
    Idle,
    /// Inside the throttle interval; no render attempted.
    Throttled,
    Dispatched,
    /// Rendered output matched the last dispatched payload.
    Unchanged,
    TooLong,
    RenderFailed,
    /// The active rule left the live rule set or was disabled.
    Cleared,
    /// State changed while rendering; the result was dropped.
    Stale,
    SinkClosed,
}

/// Last dispatched payload and the one-shot warning flag.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DispatchState {
    pub last_payload: Option<String>,
    pub warned: bool,
}

/// Everything guarded by the engine's single lock.
#[derive(Debug)]
pub(crate) struct EngineInner {
    pub state: EngineState,
    pub context: EvaluationContext,
    pub dispatch: DispatchState,
    pub since_render: Duration,
    /// Bumped on every transition so an out-of-lock render can detect staleness.
    pub generation: u64,
    pub enabled: bool,
    pub running: bool,
    pub account: Option<String>,
    pub gradient_feature: bool,
}

impl EngineInner {
    pub fn new(enabled: bool, account: Option<String>, gradient_feature: bool) -> Self {
        Self {
            state: EngineState::Idle,
            context: EvaluationContext::default(),
            dispatch: DispatchState::default(),
            since_render: Duration::ZERO,
            generation: 0,
            enabled,
            running: false,
            account,
            gradient_feature,
        }
    }

    /// Enter `state` with a fresh context and dispatch state.
    ///
    /// `since_render` is primed to `throttle` so the first tick after a
    /// transition renders immediately.
    pub fn transition(&mut self, state: EngineState, throttle: Duration) {
        self.state = state;
        self.context.reset();
        self.dispatch = DispatchState::default();
        self.since_render = throttle;
        self.generation += 1;
    }

    pub fn accepts(&self, account: &str) -> Result<(), IgnoreReason> {
        if !self.running {
            return Err(IgnoreReason::Stopped);
        }
        if !self.enabled {
            return Err(IgnoreReason::Disabled);
        }
        match &self.account {
            Some(expected) if expected != account => Err(IgnoreReason::AccountMismatch),
            _ => Ok(()),
        }
    }
}
