//! A single user-defined rule.

use serde::{Deserialize, Serialize};
use titlecast_core::ActivityKind;
use uuid::Uuid;

use super::TitleOptions;

/// Stable rule identity, used to tell "same rule matched again" from a rule change.
pub type RuleId = Uuid;

/// One entry in the Rule Set.
///
/// `activity_kind` is kept as the kind name and resolved on every
/// evaluation; an empty or unknown name means the rule never matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    #[serde(default = "Uuid::new_v4")]
    pub id: RuleId,
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Higher wins; ties keep Rule Set order.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub activity_kind: String,
    /// Boolean template. Empty means always true.
    #[serde(default)]
    pub filter: String,
    /// Title template. Empty renders an empty title.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub options: TitleOptions,
}

impl Rule {
    pub fn new(name: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            enabled: true,
            priority: 0,
            activity_kind: kind.to_string(),
            filter: String::new(),
            title: String::new(),
            options: TitleOptions::default(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_options(mut self, options: TitleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Resolve the declared kind name against the static kind table.
    pub fn resolve_kind(&self) -> Option<ActivityKind> {
        let name = self.activity_kind.trim();
        if name.is_empty() {
            return None;
        }
        name.parse().ok()
    }

    pub fn has_filter(&self) -> bool {
        !self.filter.trim().is_empty()
    }
}

pub(crate) fn default_true() -> bool {
    true
}
