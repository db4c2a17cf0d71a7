//! Filesystem event handler for the notify watcher (hot-reload).

use std::fs;
use std::path::Path;

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Event, EventKind};
use tracing::{info, warn};

use crate::rule_set::SharedRuleSet;

use super::core::parse_rules;

/// Handle a single filesystem event from the notify watcher.
pub(super) fn handle_fs_event(event: &Event, rule_file: &Path, rules: &SharedRuleSet) {
    let Some(target) = rule_file.file_name() else {
        return;
    };

    for path in &event.paths {
        if path.file_name() != Some(target) {
            continue;
        }

        match &event.kind {
            EventKind::Create(CreateKind::File | CreateKind::Any)
            | EventKind::Modify(ModifyKind::Data(_) | ModifyKind::Name(_) | ModifyKind::Any) => {
                reload(path, rules);
            }
            EventKind::Remove(RemoveKind::File | RemoveKind::Any) => {
                warn!(path = %path.display(), "rule file removed, keeping current rules");
            }
            _ => {}
        }
    }
}

fn reload(path: &Path, rules: &SharedRuleSet) {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read rule file during hot-reload");
            return;
        }
    };

    match parse_rules(&contents) {
        Ok(parsed) => {
            let count = parsed.len();
            rules.replace(parsed);
            info!(path = %path.display(), count, "hot-reloaded rule file");
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "failed to parse rule file during hot-reload, keeping previous version"
            );
        }
    }
}
