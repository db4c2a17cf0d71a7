//! The live, shared Rule Set.
//!
//! Editors and the file loader replace or mutate the rules at any time; the
//! engine reads them on every evaluation through the same handle, so it
//! never works from a stale copy.

use std::sync::{Arc, RwLock};

use crate::schema::{Rule, RuleId};

/// Cheaply cloneable handle to an ordered list of rules.
#[derive(Debug, Clone, Default)]
pub struct SharedRuleSet {
    inner: Arc<RwLock<Vec<Rule>>>,
}

impl SharedRuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(rules)),
        }
    }

    /// Copy of the current rules, in Rule Set order.
    pub fn snapshot(&self) -> Vec<Rule> {
        self.inner.read().expect("rule set lock poisoned").clone()
    }

    /// Current version of a rule by id, if it is still present.
    pub fn get(&self, id: RuleId) -> Option<Rule> {
        self.inner
            .read()
            .expect("rule set lock poisoned")
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Replace every rule at once.
    pub fn replace(&self, rules: Vec<Rule>) {
        *self.inner.write().expect("rule set lock poisoned") = rules;
    }

    /// Mutate the rules in place under the write lock.
    pub fn update<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut Vec<Rule>) -> T,
    {
        let mut guard = self.inner.write().expect("rule set lock poisoned");
        f(&mut guard)
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("rule set lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use titlecast_core::ActivityKind;

    #[test]
    fn clones_share_the_same_rules() {
        let rules = SharedRuleSet::new(vec![Rule::new("a", ActivityKind::Game)]);
        let editor = rules.clone();

        editor.update(|r| r.push(Rule::new("b", ActivityKind::SpotifyGame)));

        let names: Vec<_> = rules.snapshot().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn get_sees_latest_edit() {
        let rule = Rule::new("a", ActivityKind::Game);
        let id = rule.id;
        let rules = SharedRuleSet::new(vec![rule]);

        rules.update(|r| r[0].enabled = false);
        assert!(!rules.get(id).unwrap().enabled);

        rules.replace(Vec::new());
        assert!(rules.get(id).is_none());
        assert!(rules.is_empty());
    }
}
