//! Template evaluation for rule filters and titles.
//!
//! Rules carry two templates: a filter that must render to a boolean and
//! a title that renders the sink text. Both are evaluated against the same
//! [`Bindings`]: the matched activity under `Activity` and the scheduler's
//! [`EvaluationContext`] under `Context`.
//!
//! Templates are arbitrary user strings (not pre-registered), so a fresh
//! [`minijinja::Environment`] is created per evaluation.

use std::time::Duration;

use serde::Serialize;
use titlecast_core::ActivityEntry;

/// Errors produced while evaluating a template.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TemplateError {
    #[error("template syntax error: {0}")]
    Syntax(String),

    #[error("template render error: {0}")]
    Render(String),
}

/// Mutable evaluation state owned by the update scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationContext {
    /// Seconds since the current rule became active.
    pub seconds_elapsed: f64,
}

impl EvaluationContext {
    pub fn advance(&mut self, delta: Duration) {
        self.seconds_elapsed += delta.as_secs_f64();
    }

    pub fn reset(&mut self) {
        self.seconds_elapsed = 0.0;
    }
}

/// Variables visible to a template.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Bindings<'a> {
    #[serde(rename = "Activity")]
    pub activity: &'a ActivityEntry,
    #[serde(rename = "Context")]
    pub context: &'a EvaluationContext,
}

impl<'a> Bindings<'a> {
    pub fn new(activity: &'a ActivityEntry, context: &'a EvaluationContext) -> Self {
        Self { activity, context }
    }
}

/// Evaluate a template string against named variables.
pub trait TemplateEvaluator: Send + Sync {
    fn evaluate(&self, template: &str, bindings: &Bindings<'_>) -> Result<String, TemplateError>;
}

/// [`TemplateEvaluator`] backed by minijinja.
#[derive(Debug, Default)]
pub struct MiniJinjaEvaluator {
    _private: (),
}

impl MiniJinjaEvaluator {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Build a minijinja environment with the custom `truncate` filter.
    fn build_env<'a>() -> minijinja::Environment<'a> {
        let mut env = minijinja::Environment::new();

        env.add_filter("truncate", truncate_filter);

        env
    }

    /// Validate that a template string parses without evaluating it.
    pub fn validate(&self, template: &str) -> Result<(), TemplateError> {
        let env = Self::build_env();
        env.template_from_str(template)
            .map_err(|e| TemplateError::Syntax(e.to_string()))?;
        Ok(())
    }
}

impl TemplateEvaluator for MiniJinjaEvaluator {
    fn evaluate(&self, template: &str, bindings: &Bindings<'_>) -> Result<String, TemplateError> {
        let env = Self::build_env();
        env.render_str(template, bindings).map_err(|e| match e.kind() {
            minijinja::ErrorKind::SyntaxError => TemplateError::Syntax(e.to_string()),
            _ => TemplateError::Render(e.to_string()),
        })
    }
}

/// Interpret rendered filter output as a boolean.
///
/// Surrounding whitespace is ignored and `true`/`false` match
/// case-insensitively; anything else is not a boolean.
pub fn parse_bool(rendered: &str) -> Option<bool> {
    let trimmed = rendered.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Custom filter: cut a string to at most `length` characters, ending in `ellipsis`.
///
/// The ellipsis counts toward `length`. Strings that already fit are returned as-is.
fn truncate_filter(value: String, length: usize, ellipsis: Option<String>) -> String {
    let ellipsis = ellipsis.unwrap_or_else(|| "...".to_string());
    if value.chars().count() <= length {
        return value;
    }
    let ellipsis_len = ellipsis.chars().count();
    if ellipsis_len >= length {
        return ellipsis.chars().take(length).collect();
    }
    let mut out: String = value.chars().take(length - ellipsis_len).collect();
    out.push_str(&ellipsis);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(template: &str, activity: &ActivityEntry, seconds: f64) -> Result<String, TemplateError> {
        let context = EvaluationContext { seconds_elapsed: seconds };
        MiniJinjaEvaluator::new().evaluate(template, &Bindings::new(activity, &context))
    }

    #[test]
    fn render_activity_fields() {
        let activity = ActivityEntry::spotify("Song Title", vec!["First".into(), "Second".into()]);
        let out = render("{{ Activity.track_title }} by {{ Activity.artists[0] }}", &activity, 0.0).unwrap();
        assert_eq!(out, "Song Title by First");
    }

    #[test]
    fn render_context_cycles() {
        let activity = ActivityEntry::game("X");
        let template = "{% if (Context.seconds_elapsed % 20) < 10 %}A{% else %}B{% endif %}";
        assert_eq!(render(template, &activity, 3.5).unwrap(), "A");
        assert_eq!(render(template, &activity, 12.0).unwrap(), "B");
        assert_eq!(render(template, &activity, 21.0).unwrap(), "A");
    }

    #[test]
    fn render_kind_is_visible() {
        let activity = ActivityEntry::custom_status("afk");
        assert_eq!(render("{{ Activity.kind }}", &activity, 0.0).unwrap(), "CustomStatusGame");
    }

    #[test]
    fn builtin_case_and_round_filters_are_available() {
        let activity = ActivityEntry::game("Hades");
        assert_eq!(
            render("{{ Activity.name | upper }} {{ Activity.name | lower }}", &activity, 0.0).unwrap(),
            "HADES hades"
        );
        assert_eq!(render("{{ Context.seconds_elapsed | round }}", &activity, 2.6).unwrap(), "3.0");
    }

    #[test]
    fn empty_template_renders_empty() {
        assert_eq!(render("", &ActivityEntry::game("X"), 0.0).unwrap(), "");
    }

    #[test]
    fn syntax_error_is_reported_as_syntax() {
        let err = render("{{ unclosed", &ActivityEntry::game("X"), 0.0).unwrap_err();
        assert!(matches!(err, TemplateError::Syntax(_)), "got {err:?}");
    }

    #[test]
    fn runtime_error_is_reported_as_render() {
        let err = render("{{ Activity.name + 1 }}", &ActivityEntry::game("X"), 0.0).unwrap_err();
        assert!(matches!(err, TemplateError::Render(_)), "got {err:?}");
    }

    #[test]
    fn truncate_filter_counts_ellipsis() {
        assert_eq!(truncate_filter("short".into(), 10, None), "short");
        assert_eq!(truncate_filter("abcdefghij".into(), 8, None), "abcde...");
        assert_eq!(truncate_filter("abcdefghij".into(), 5, Some("~".into())), "abcd~");
        assert_eq!(truncate_filter("abcdefghij".into(), 2, None), "..");
    }

    #[test]
    fn truncate_filter_in_template() {
        let activity = ActivityEntry::game("A Very Long Game Name That Goes On");
        let out = render("{{ Activity.name | truncate(12) }}", &activity, 0.0).unwrap();
        assert_eq!(out, "A Very Lo...");
    }

    #[test]
    fn boolean_filter_output() {
        let activity = ActivityEntry::game("X");
        let out = render("{{ Activity.name != 'Y' }}", &activity, 0.0).unwrap();
        assert_eq!(parse_bool(&out), Some(true));
    }

    #[test]
    fn parse_bool_is_lenient_on_case_and_whitespace() {
        assert_eq!(parse_bool(" True\n"), Some(true));
        assert_eq!(parse_bool("FALSE"), Some(false));
        assert_eq!(parse_bool("yes"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn validate_reports_syntax_only() {
        let evaluator = MiniJinjaEvaluator::new();
        assert!(evaluator.validate("Hello {{ Activity.name }}").is_ok());
        assert!(evaluator.validate("{% if %}").is_err());
    }
}
