//! Core [`RuleSetLoader`] struct: file-backed rule loading with optional hot-reload.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::rule_set::SharedRuleSet;
use crate::schema::{Rule, RuleId};
use crate::templates::MiniJinjaEvaluator;

use super::error::{Result, RuleError};
use super::watcher::handle_fs_event;

/// On-disk shape of a rule file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleFile {
    #[serde(default)]
    pub rules: Vec<Rule>,
}

/// Rule file as read, before ids are settled.
#[derive(Deserialize)]
struct RawRuleFile {
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Deserialize)]
struct RawRule {
    #[serde(default)]
    id: Option<RuleId>,
    #[serde(flatten)]
    rule: Rule,
}

/// Id for a rule written without one: stable across reloads of the same
/// file so an active rule keeps its identity.
fn derived_id(index: usize, name: &str) -> RuleId {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("titlecast-rule:{index}:{name}").as_bytes())
}

/// Parse and validate the contents of a rule file.
///
/// Rules without an `id` get one derived from their position and name.
/// Duplicate rule IDs reject the whole file. Template syntax problems are
/// only logged: the rule still loads and fails at evaluation time.
pub fn parse_rules(contents: &str) -> Result<Vec<Rule>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let raw: RawRuleFile = serde_yaml::from_str(contents)?;
    let file = RuleFile {
        rules: raw
            .rules
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                let mut rule = raw.rule;
                rule.id = raw.id.unwrap_or_else(|| derived_id(index, &rule.name));
                rule
            })
            .collect(),
    };

    let mut seen = HashSet::new();
    for rule in &file.rules {
        if !seen.insert(rule.id) {
            return Err(RuleError::Validation(format!(
                "duplicate rule id '{}' ({})",
                rule.id, rule.name
            )));
        }
    }

    let evaluator = MiniJinjaEvaluator::new();
    for rule in &file.rules {
        for (field, template) in [("filter", &rule.filter), ("title", &rule.title)] {
            if let Err(e) = evaluator.validate(template) {
                warn!(rule = %rule.name, field, error = %e, "rule template does not parse");
            }
        }
        if !rule.activity_kind.trim().is_empty() && rule.resolve_kind().is_none() {
            warn!(rule = %rule.name, kind = %rule.activity_kind, "unknown activity kind, rule will never match");
        }
    }

    Ok(file.rules)
}

/// Loads a YAML rule file into a [`SharedRuleSet`], optionally watching it.
pub struct RuleSetLoader {
    /// Rule file path.
    path: PathBuf,
    /// Live rule set updated by loads and hot-reloads.
    rules: SharedRuleSet,
    /// Active filesystem watcher (held to keep it alive).
    _watcher: Option<RecommendedWatcher>,
}

impl RuleSetLoader {
    pub fn new(path: PathBuf, rules: SharedRuleSet) -> Self {
        Self {
            path,
            rules,
            _watcher: None,
        }
    }

    /// Read the file and replace the live rules. Returns the number loaded.
    ///
    /// On error the live rules are left untouched.
    pub fn load(&self) -> Result<usize> {
        let contents = fs::read_to_string(&self.path)?;
        let rules = parse_rules(&contents)?;
        let count = rules.len();
        self.rules.replace(rules);
        info!(path = %self.path.display(), count, "loaded rule file");
        Ok(count)
    }

    /// Atomically write the live rules back to the file.
    ///
    /// Writes to a `.tmp` file first, then renames to the final path to
    /// avoid partial writes on crash.
    pub fn write(&self) -> Result<()> {
        let file = RuleFile {
            rules: self.rules.snapshot(),
        };
        let yaml = serde_yaml::to_string(&file)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RuleError::Validation(format!("invalid rule file path: {}", self.path.display())))?;
        let tmp_path = self.path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, yaml)?;
        fs::rename(&tmp_path, &self.path)?;

        info!(path = %self.path.display(), count = file.rules.len(), "wrote rule file");
        Ok(())
    }

    /// Start watching the rule file.
    ///
    /// The parent directory is watched (editors often replace files by
    /// rename) and events are filtered down to the rule file itself.
    pub fn watch(&mut self) -> Result<()> {
        let rules = self.rules.clone();
        let path = self.path.clone();
        let dir = watch_dir(&self.path);

        let mut watcher = notify::recommended_watcher(move |res: std::result::Result<notify::Event, notify::Error>| {
            match res {
                Ok(event) => handle_fs_event(&event, &path, &rules),
                Err(e) => warn!(error = %e, "filesystem watcher error"),
            }
        })?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!(path = %self.path.display(), "watching rule file for changes");
        self._watcher = Some(watcher);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rules(&self) -> SharedRuleSet {
        self.rules.clone()
    }
}

fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
