//! Behaviour of the seed rules shipped in `defaults::default_rules()`.

use titlecast_core::{ActivityEntry, PresenceSnapshot};
use titlecast_rules::defaults::default_rules;
use titlecast_rules::{find_match, EvaluationContext, MiniJinjaEvaluator, TitleRenderer};

fn title_for(snapshot: &PresenceSnapshot, seconds: f64) -> Option<String> {
    let evaluator = MiniJinjaEvaluator::new();
    let context = EvaluationContext { seconds_elapsed: seconds };
    let rules = default_rules();
    let m = find_match(&evaluator, snapshot, &rules, &context)?;
    let rendered = TitleRenderer::default()
        .render(&evaluator, &m.rule, &m.activity, &context, false)
        .expect("default templates render");
    Some(rendered.payload.title)
}

#[test]
fn game_rule_cycles_between_label_and_name() {
    let snapshot = PresenceSnapshot::new(vec![ActivityEntry::game("Elden Ring")]);
    assert_eq!(title_for(&snapshot, 0.0).as_deref(), Some("Playing Game"));
    assert_eq!(title_for(&snapshot, 12.0).as_deref(), Some("Elden Ring"));
    assert_eq!(title_for(&snapshot, 25.0).as_deref(), Some("Playing Game"));
}

#[test]
fn game_rule_ignores_host_game_and_custom_status() {
    let own_game = PresenceSnapshot::new(vec![ActivityEntry::game("FINAL FANTASY XIV Online")]);
    assert_eq!(title_for(&own_game, 0.0), None);

    let status = PresenceSnapshot::new(vec![ActivityEntry::custom_status("brb")]);
    assert_eq!(title_for(&status, 0.0), None);
}

#[test]
fn spotify_rule_outranks_game_rule() {
    let snapshot = PresenceSnapshot::new(vec![
        ActivityEntry::game("Elden Ring"),
        ActivityEntry::spotify("Clair de Lune", vec!["Debussy".into()]),
    ]);
    assert_eq!(title_for(&snapshot, 0.0).as_deref(), Some("♪Listening to Spotify♪"));
    assert_eq!(title_for(&snapshot, 15.0).as_deref(), Some("♪Clair de Lune♪"));
    assert_eq!(title_for(&snapshot, 25.0).as_deref(), Some("♪Debussy♪"));
}

#[test]
fn default_titles_fit_the_length_limit() {
    let long = "x".repeat(80);
    let snapshot = PresenceSnapshot::new(vec![ActivityEntry::spotify(long.clone(), vec![long])]);
    for seconds in [0.0, 15.0, 25.0] {
        let title = title_for(&snapshot, seconds).unwrap();
        assert!(title.chars().count() <= 32, "{title} is too long");
    }
}
