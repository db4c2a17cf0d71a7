use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_u64(profile: &str, key: &str, default: u64) -> u64 {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_usize(profile: &str, key: &str, default: usize) -> usize {
    profiled_env_opt(profile, key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn profiled_env_bool(profile: &str, key: &str, default: bool) -> bool {
    profiled_env_opt(profile, key)
        .and_then(|v| parse_flag(&v))
        .unwrap_or(default)
}

/// Accepts the usual spellings of an on/off flag.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Minimum interval between render attempts.
pub const DEFAULT_THROTTLE_MS: u64 = 100;

/// Longest title the sink will accept, in characters.
pub const DEFAULT_MAX_TITLE_LENGTH: usize = 32;

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub engine: EngineConfig,
    pub rules: RulesConfig,
    pub sink: SinkConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `TITLECAST_PROFILE`. When set (e.g. `ALT`),
    /// every key is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("TITLECAST_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            engine: EngineConfig::from_env_profiled(p),
            rules: RulesConfig::from_env_profiled(p),
            sink: SinkConfig::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!(
            "  engine:  enabled={}, account={}, gradient_feature={}",
            self.engine.enabled,
            self.engine.account.as_deref().unwrap_or("(any)"),
            self.engine.gradient_feature
        );
        tracing::info!(
            "  limits:  throttle_ms={}, max_title_length={}",
            self.engine.throttle_ms,
            self.engine.max_title_length
        );
        tracing::info!(
            "  rules:   file={}",
            self.rules
                .file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(defaults)".to_string())
        );
        tracing::info!(
            "  sink:    webhook={}",
            if self.sink.webhook_url.is_some() { "configured" } else { "(stdout)" }
        );
    }
}

// ── Engine ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub enabled: bool,
    /// Only accept presence for this account (exact, case-sensitive).
    pub account: Option<String>,
    /// Externally owned flag gating gradient output fields.
    pub gradient_feature: bool,
    pub throttle_ms: u64,
    pub max_title_length: usize,
}

impl EngineConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            enabled: profiled_env_bool(p, "TITLECAST_ENABLED", true),
            account: profiled_env_opt(p, "TITLECAST_ACCOUNT").filter(|a| !a.trim().is_empty()),
            gradient_feature: profiled_env_bool(p, "TITLECAST_GRADIENT_FEATURE", false),
            throttle_ms: profiled_env_u64(p, "TITLECAST_THROTTLE_MS", DEFAULT_THROTTLE_MS),
            max_title_length: profiled_env_usize(
                p,
                "TITLECAST_MAX_TITLE_LENGTH",
                DEFAULT_MAX_TITLE_LENGTH,
            ),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            account: None,
            gradient_feature: false,
            throttle_ms: DEFAULT_THROTTLE_MS,
            max_title_length: DEFAULT_MAX_TITLE_LENGTH,
        }
    }
}

// ── Rules ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesConfig {
    /// YAML rule file; the built-in defaults are used when unset.
    pub file: Option<PathBuf>,
    /// Reload the rule file when it changes on disk.
    pub watch: bool,
}

impl RulesConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            file: profiled_env_opt(p, "TITLECAST_RULES_FILE").map(PathBuf::from),
            watch: profiled_env_bool(p, "TITLECAST_RULES_WATCH", true),
        }
    }
}

// ── Sink ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkConfig {
    pub webhook_url: Option<String>,
}

impl SinkConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            webhook_url: profiled_env_opt(p, "TITLECAST_WEBHOOK_URL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_flag_accepts_common_spellings() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" YES "), Some(true));
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("False"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn defaults_match_sink_constraints() {
        let config = Config::default();
        assert!(config.engine.enabled);
        assert_eq!(config.engine.throttle_ms, 100);
        assert_eq!(config.engine.max_title_length, 32);
        assert!(config.engine.account.is_none());
        assert!(!config.engine.gradient_feature);
        assert_eq!(config.profile_label(), "default");
    }

    #[test]
    fn profiled_lookup_prefers_prefixed_key() {
        std::env::set_var("TCTEST_TITLECAST_ACCOUNT", "profiled-user");
        std::env::set_var("TCTEST_TITLECAST_THROTTLE_MS", "250");

        let config = Config::for_profile("tctest");
        assert_eq!(config.profile, "TCTEST");
        assert_eq!(config.engine.account.as_deref(), Some("profiled-user"));
        assert_eq!(config.engine.throttle_ms, 250);

        std::env::remove_var("TCTEST_TITLECAST_ACCOUNT");
        std::env::remove_var("TCTEST_TITLECAST_THROTTLE_MS");
    }

    #[test]
    fn profiled_lookup_falls_back_to_plain_key() {
        std::env::set_var("TITLECAST_RULES_FILE", "/tmp/plain-rules.yml");

        let config = Config::for_profile("tcfallback");
        assert_eq!(config.profile_label(), "TCFALLBACK");
        assert_eq!(
            config.rules.file.as_deref(),
            Some(std::path::Path::new("/tmp/plain-rules.yml"))
        );

        std::env::remove_var("TITLECAST_RULES_FILE");
    }
}
