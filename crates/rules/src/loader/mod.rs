//! YAML rule-file loader with hot-reload via `notify` watcher.
//!
//! Loads a single YAML file (`rules: [...]`) into a [`SharedRuleSet`] and,
//! when watched, replaces the live rules whenever the file changes.
//! A file that fails to parse never clears the rules already loaded.
//!
//! [`SharedRuleSet`]: crate::rule_set::SharedRuleSet

mod core;
mod error;
mod watcher;


pub use self::core::{parse_rules, RuleFile, RuleSetLoader};
pub use self::error::{Result, RuleError};
