//! Seed rules offered when the host has no rule set of its own.

use titlecast_core::ActivityKind;

use crate::schema::Rule;

/// Bumped whenever the seed templates change, so hosts can tell them apart.
pub const DEFAULT_VERSION: u32 = 2;

const GAME_FILTER: &str = r#"{{ Activity.name != "FINAL FANTASY XIV Online" and Activity.name != "FINAL FANTASY XIV" and Activity.name != "Custom Status" }}"#;

const GAME_TITLE: &str = r#"
{%- if (Context.seconds_elapsed % 20) < 10 -%}
    Playing Game
{%- else -%}
    {{ Activity.name | truncate(32) }}
{%- endif -%}
"#;

const SPOTIFY_TITLE: &str = r#"♪{%- if (Context.seconds_elapsed % 30) < 10 -%}
    Listening to Spotify
{%- elif (Context.seconds_elapsed % 30) < 20 -%}
    {{ Activity.track_title | truncate(30) }}
{%- else -%}
    {{ Activity.artists[0] | truncate(30) }}
{%- endif -%}♪"#;

/// The default Rule Set: a generic game rule and a higher-priority Spotify rule.
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule::new(format!("Game (V{DEFAULT_VERSION})"), ActivityKind::Game)
            .with_filter(GAME_FILTER)
            .with_title(GAME_TITLE),
        Rule::new(format!("Spotify (V{DEFAULT_VERSION})"), ActivityKind::SpotifyGame)
            .with_priority(1)
            .with_title(SPOTIFY_TITLE),
    ]
}
