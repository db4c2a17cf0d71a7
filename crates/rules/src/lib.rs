//! Presence-to-title rule engine.
//!
//! This crate provides:
//! - Rule Set data model (`schema`) and a live, shared rule set
//! - Minijinja-backed template evaluation behind the `TemplateEvaluator` trait
//! - Rule matching by priority, activity kind and filter expression
//! - Title rendering with length and feature-gate constraints
//! - Default seed rules and a YAML rule-file loader with hot-reload

pub mod defaults;
pub mod loader;
pub mod matcher;
pub mod renderer;
pub mod rule_set;
pub mod schema;
pub mod templates;

pub use matcher::{find_match, FilterError, RuleMatch};
pub use renderer::{RenderError, RenderedTitle, TitleRenderer};
pub use rule_set::SharedRuleSet;
pub use schema::{Rule, RuleId, TitleOptions, TitlePayload};
pub use templates::{Bindings, EvaluationContext, MiniJinjaEvaluator, TemplateError, TemplateEvaluator};
