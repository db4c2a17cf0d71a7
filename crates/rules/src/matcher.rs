//! Rule matching: pick at most one rule for a presence snapshot.
//!
//! Enabled rules are tried in descending priority (stable on Rule Set
//! order). For each rule the first activity whose kind is assignable to
//! the rule's kind is bound, then the rule's filter is evaluated. The first
//! rule that binds an activity and passes its filter wins; lower-priority
//! rules are not evaluated after that.
//!
//! A filter that fails to evaluate, or renders something other than a
//! boolean, fails closed: the rule is skipped and matching moves on.

use std::cmp::Reverse;

use titlecast_core::{ActivityEntry, PresenceSnapshot};
use tracing::{debug, warn};

use crate::schema::Rule;
use crate::templates::{parse_bool, Bindings, EvaluationContext, TemplateError, TemplateEvaluator};

/// The winning rule together with the activity entry it bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleMatch {
    pub rule: Rule,
    pub activity: ActivityEntry,
}

/// Why a filter expression could not be used.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FilterError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("filter rendered '{0}', which is not a boolean")]
    NotBoolean(String),
}

/// Select the highest-priority enabled rule that applies to `snapshot`.
pub fn find_match(
    evaluator: &dyn TemplateEvaluator,
    snapshot: &PresenceSnapshot,
    rules: &[Rule],
    context: &EvaluationContext,
) -> Option<RuleMatch> {
    let mut candidates: Vec<&Rule> = rules.iter().filter(|r| r.enabled).collect();
    // `sort_by_key` is stable, so equal priorities keep Rule Set order.
    candidates.sort_by_key(|r| Reverse(r.priority));

    for rule in candidates {
        let Some(kind) = rule.resolve_kind() else {
            debug!(rule = %rule.name, kind = %rule.activity_kind, "rule has no resolvable activity kind");
            continue;
        };

        let Some(activity) = snapshot.first_assignable_to(kind) else {
            continue;
        };

        if rule.has_filter() {
            match evaluate_filter(evaluator, rule, activity, context) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(rule = %rule.name, error = %e, "filter evaluation failed, skipping rule");
                    continue;
                }
            }
        }

        debug!(rule = %rule.name, priority = rule.priority, activity = %activity.name, "rule matched");
        return Some(RuleMatch {
            rule: rule.clone(),
            activity: activity.clone(),
        });
    }

    None
}

/// Evaluate a rule's filter expression against one activity.
pub fn evaluate_filter(
    evaluator: &dyn TemplateEvaluator,
    rule: &Rule,
    activity: &ActivityEntry,
    context: &EvaluationContext,
) -> Result<bool, FilterError> {
    let rendered = evaluator.evaluate(&rule.filter, &Bindings::new(activity, context))?;
    parse_bool(&rendered).ok_or(FilterError::NotBoolean(rendered))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::MiniJinjaEvaluator;
    use titlecast_core::ActivityKind;

    fn match_with(rules: &[Rule], snapshot: &PresenceSnapshot, seconds: f64) -> Option<RuleMatch> {
        let context = EvaluationContext { seconds_elapsed: seconds };
        find_match(&MiniJinjaEvaluator::new(), snapshot, rules, &context)
    }

    fn game_snapshot(name: &str) -> PresenceSnapshot {
        PresenceSnapshot::new(vec![ActivityEntry::game(name)])
    }

    #[test]
    fn single_game_rule_matches_game_activity() {
        let rules = vec![Rule::new("game", ActivityKind::Game).with_title("Playing")];
        let m = match_with(&rules, &game_snapshot("X"), 0.0).unwrap();
        assert_eq!(m.rule.name, "game");
        assert_eq!(m.activity.name, "X");
    }

    #[test]
    fn disabled_rules_are_never_selected() {
        let rules = vec![
            Rule::new("off", ActivityKind::Game).with_priority(10).disabled(),
            Rule::new("on", ActivityKind::Game),
        ];
        let m = match_with(&rules, &game_snapshot("X"), 0.0).unwrap();
        assert_eq!(m.rule.name, "on");

        let only_disabled = vec![Rule::new("off", ActivityKind::Game).disabled()];
        assert!(match_with(&only_disabled, &game_snapshot("X"), 0.0).is_none());
    }

    #[test]
    fn higher_priority_wins_regardless_of_order() {
        let low = Rule::new("low", ActivityKind::Game).with_priority(0);
        let high = Rule::new("high", ActivityKind::Game).with_priority(1);

        let forward = vec![low.clone(), high.clone()];
        let backward = vec![high, low];

        assert_eq!(match_with(&forward, &game_snapshot("X"), 0.0).unwrap().rule.name, "high");
        assert_eq!(match_with(&backward, &game_snapshot("X"), 0.0).unwrap().rule.name, "high");
    }

    #[test]
    fn equal_priority_keeps_rule_set_order() {
        let rules = vec![
            Rule::new("first", ActivityKind::Game).with_priority(5),
            Rule::new("second", ActivityKind::Game).with_priority(5),
        ];
        assert_eq!(match_with(&rules, &game_snapshot("X"), 0.0).unwrap().rule.name, "first");
    }

    #[test]
    fn subkind_satisfies_general_rule_but_not_reverse() {
        let spotify = PresenceSnapshot::new(vec![ActivityEntry::spotify("Song", vec!["A".into()])]);
        let game_rule = vec![Rule::new("game", ActivityKind::Game)];
        assert!(match_with(&game_rule, &spotify, 0.0).is_some());

        let spotify_rule = vec![Rule::new("spotify", ActivityKind::SpotifyGame)];
        assert!(match_with(&spotify_rule, &game_snapshot("X"), 0.0).is_none());
    }

    #[test]
    fn rule_binds_first_assignable_activity() {
        let snapshot = PresenceSnapshot::new(vec![
            ActivityEntry::game("first"),
            ActivityEntry::spotify("Song", vec![]),
        ]);
        let rules = vec![Rule::new("spotify", ActivityKind::SpotifyGame)];
        let m = match_with(&rules, &snapshot, 0.0).unwrap();
        assert_eq!(m.activity.kind(), ActivityKind::SpotifyGame);
    }

    #[test]
    fn rule_without_kind_never_matches() {
        let mut rule = Rule::new("nokind", ActivityKind::Game);
        rule.activity_kind.clear();
        assert!(match_with(&[rule], &game_snapshot("X"), 0.0).is_none());
    }

    #[test]
    fn false_filter_falls_through_to_lower_priority() {
        let rules = vec![
            Rule::new("filtered", ActivityKind::Game)
                .with_priority(2)
                .with_filter("{{ Activity.name != 'X' }}"),
            Rule::new("fallback", ActivityKind::Game),
        ];
        assert_eq!(match_with(&rules, &game_snapshot("X"), 0.0).unwrap().rule.name, "fallback");
        assert_eq!(match_with(&rules, &game_snapshot("Y"), 0.0).unwrap().rule.name, "filtered");
    }

    #[test]
    fn non_boolean_filter_fails_closed() {
        let rules = vec![
            Rule::new("broken", ActivityKind::Game)
                .with_priority(1)
                .with_filter("{{ Activity.name }}"),
            Rule::new("fallback", ActivityKind::Game),
        ];
        assert_eq!(match_with(&rules, &game_snapshot("X"), 0.0).unwrap().rule.name, "fallback");
    }

    #[test]
    fn filter_syntax_error_fails_closed() {
        let rules = vec![Rule::new("broken", ActivityKind::Game).with_filter("{{ unclosed")];
        assert!(match_with(&rules, &game_snapshot("X"), 0.0).is_none());
    }

    #[test]
    fn filter_can_read_elapsed_time() {
        let rules = vec![Rule::new("cycling", ActivityKind::Game)
            .with_filter("{{ (Context.seconds_elapsed % 20) < 10 }}")];
        assert!(match_with(&rules, &game_snapshot("X"), 5.0).is_some());
        assert!(match_with(&rules, &game_snapshot("X"), 15.0).is_none());
    }

    #[test]
    fn empty_snapshot_matches_nothing() {
        let rules = vec![Rule::new("game", ActivityKind::Game)];
        assert!(match_with(&rules, &PresenceSnapshot::empty(), 0.0).is_none());
    }

    #[test]
    fn evaluate_filter_reports_not_boolean() {
        let rule = Rule::new("r", ActivityKind::Game).with_filter("maybe");
        let err = evaluate_filter(
            &MiniJinjaEvaluator::new(),
            &rule,
            &ActivityEntry::game("X"),
            &EvaluationContext::default(),
        )
        .unwrap_err();
        assert_eq!(err, FilterError::NotBoolean("maybe".to_string()));
    }
}
