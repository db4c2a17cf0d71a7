//! Output styling options and the sink payload they project into.

use serde::{Deserialize, Serialize};

/// RGB colour with components in `[0, 1]`, serialized as `{"X","Y","Z"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Animation applied to a gradient colour set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradientAnimationStyle {
    Pulse,
    Wave,
    Static,
}

/// Per-rule output options as configured by the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TitleOptions {
    #[serde(default)]
    pub is_prefix: bool,
    #[serde(default)]
    pub color: Option<Vec3>,
    #[serde(default)]
    pub glow: Option<Vec3>,
    /// Preset index; only emitted when the gradient feature is granted.
    #[serde(default)]
    pub gradient_colour_set: Option<i32>,
    #[serde(default)]
    pub gradient_animation_style: Option<GradientAnimationStyle>,
}

impl TitleOptions {
    /// Project the options and a rendered title into the sink payload.
    ///
    /// Gradient fields survive only when `gradient_feature` is granted and a
    /// colour set is configured; an active gradient replaces the glow.
    pub fn to_payload(&self, title: String, gradient_feature: bool) -> TitlePayload {
        let gradient_colour_set = if gradient_feature { self.gradient_colour_set } else { None };
        let gradient_active = gradient_colour_set.is_some();

        TitlePayload {
            title,
            is_prefix: self.is_prefix,
            color: self.color,
            glow: if gradient_active { None } else { self.glow },
            gradient_colour_set,
            gradient_animation_style: if gradient_active {
                self.gradient_animation_style
            } else {
                None
            },
        }
    }
}

/// Title data handed to the sink.
///
/// Field order is fixed and absent options are skipped, so equal payloads
/// always serialize to identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TitlePayload {
    pub title: String,
    pub is_prefix: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glow: Option<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_colour_set: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_animation_style: Option<GradientAnimationStyle>,
}

impl TitlePayload {
    /// Serialized form used both for the sink call and for deduplication.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
