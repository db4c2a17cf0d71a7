//! Presence data model: what a remote account is currently doing.
//!
//! A [`PresenceSnapshot`] carries zero or more [`ActivityEntry`] values,
//! each tagged with an [`ActivityKind`]. Kinds form a small static
//! hierarchy (every kind is-a [`ActivityKind::Game`]) which rules match
//! against with [`ActivityKind::is_assignable_to`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Activity kinds ────────────────────────────────────────────

/// Closed set of activity kinds a rule can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    Game,
    RichGame,
    SpotifyGame,
    StreamingGame,
    CustomStatusGame,
}

impl ActivityKind {
    /// Every kind, in the order offered to rule editors.
    pub const ALL: [ActivityKind; 5] = [
        ActivityKind::CustomStatusGame,
        ActivityKind::Game,
        ActivityKind::RichGame,
        ActivityKind::SpotifyGame,
        ActivityKind::StreamingGame,
    ];

    /// Direct supertype in the kind table, `None` for the root.
    pub fn parent(self) -> Option<ActivityKind> {
        match self {
            ActivityKind::Game => None,
            ActivityKind::RichGame
            | ActivityKind::SpotifyGame
            | ActivityKind::StreamingGame
            | ActivityKind::CustomStatusGame => Some(ActivityKind::Game),
        }
    }

    /// Whether an activity of this kind satisfies a rule declared for `target`.
    ///
    /// Walks the supertype chain, so a `SpotifyGame` is assignable to
    /// `Game` but a `Game` is not assignable to `SpotifyGame`.
    pub fn is_assignable_to(self, target: ActivityKind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == target {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityKind::Game => "Game",
            ActivityKind::RichGame => "RichGame",
            ActivityKind::SpotifyGame => "SpotifyGame",
            ActivityKind::StreamingGame => "StreamingGame",
            ActivityKind::CustomStatusGame => "CustomStatusGame",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Game" => Ok(ActivityKind::Game),
            "RichGame" => Ok(ActivityKind::RichGame),
            "SpotifyGame" => Ok(ActivityKind::SpotifyGame),
            "StreamingGame" => Ok(ActivityKind::StreamingGame),
            "CustomStatusGame" => Ok(ActivityKind::CustomStatusGame),
            other => Err(format!("unknown activity kind: '{}'", other)),
        }
    }
}

// ── Activity entries ──────────────────────────────────────────

/// One typed record within a presence snapshot.
///
/// Serialized flat: `{"name": "...", "kind": "SpotifyGame", "track_title": ...}`.
/// This is also the shape templates see under `Activity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub name: String,
    #[serde(flatten)]
    pub data: ActivityData,
}

/// Kind-specific activity fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ActivityData {
    Game {},
    RichGame {
        details: Option<String>,
        state: Option<String>,
        large_image_text: Option<String>,
        small_image_text: Option<String>,
        application_id: Option<u64>,
    },
    SpotifyGame {
        track_title: String,
        #[serde(default)]
        artists: Vec<String>,
        album_title: Option<String>,
        track_url: Option<String>,
        duration_secs: Option<f64>,
        elapsed_secs: Option<f64>,
    },
    StreamingGame {
        url: Option<String>,
    },
    CustomStatusGame {
        state: Option<String>,
        emote: Option<String>,
    },
}

impl ActivityEntry {
    /// A plain game activity with no extra fields.
    pub fn game(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: ActivityData::Game {},
        }
    }

    /// A Spotify listening activity.
    pub fn spotify(track_title: impl Into<String>, artists: Vec<String>) -> Self {
        Self {
            name: "Spotify".to_string(),
            data: ActivityData::SpotifyGame {
                track_title: track_title.into(),
                artists,
                album_title: None,
                track_url: None,
                duration_secs: None,
                elapsed_secs: None,
            },
        }
    }

    /// A custom status line.
    pub fn custom_status(state: impl Into<String>) -> Self {
        Self {
            name: "Custom Status".to_string(),
            data: ActivityData::CustomStatusGame {
                state: Some(state.into()),
                emote: None,
            },
        }
    }

    pub fn kind(&self) -> ActivityKind {
        match self.data {
            ActivityData::Game {} => ActivityKind::Game,
            ActivityData::RichGame { .. } => ActivityKind::RichGame,
            ActivityData::SpotifyGame { .. } => ActivityKind::SpotifyGame,
            ActivityData::StreamingGame { .. } => ActivityKind::StreamingGame,
            ActivityData::CustomStatusGame { .. } => ActivityKind::CustomStatusGame,
        }
    }
}

// ── Snapshots and feed events ─────────────────────────────────

/// Point-in-time description of what an account is doing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    #[serde(default)]
    pub activities: Vec<ActivityEntry>,
}

impl PresenceSnapshot {
    pub fn new(activities: Vec<ActivityEntry>) -> Self {
        Self { activities }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// First activity (in snapshot order) whose kind is assignable to `kind`.
    pub fn first_assignable_to(&self, kind: ActivityKind) -> Option<&ActivityEntry> {
        self.activities
            .iter()
            .find(|activity| activity.kind().is_assignable_to(kind))
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

/// A presence update as delivered by the feed: who, and what they are doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceEvent {
    pub account: String,
    #[serde(flatten)]
    pub snapshot: PresenceSnapshot,
}

impl PresenceEvent {
    /// Decode one newline-delimited JSON event.
    pub fn from_json_line(line: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(line.trim())?)
    }
}

// ── Connection state ──────────────────────────────────────────

/// Read-only session status reported by the presence feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "Disconnected"),
            ConnectionState::Connecting => write!(f, "Connecting"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Disconnecting => write!(f, "Disconnecting"),
        }
    }
}
