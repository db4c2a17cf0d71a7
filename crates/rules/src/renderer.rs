//! Title rendering with output constraints.

use titlecast_core::config::DEFAULT_MAX_TITLE_LENGTH;
use titlecast_core::ActivityEntry;

use crate::schema::{Rule, TitlePayload};
use crate::templates::{Bindings, EvaluationContext, TemplateError, TemplateEvaluator};

/// Errors that prevent a rendered title from being dispatched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("title '{text}' is {length} characters, longer than the {max} allowed")]
    TooLong { text: String, length: usize, max: usize },

    #[error("failed to serialize title payload: {0}")]
    Serialize(String),
}

/// A title ready for the sink, plus its serialized form for deduplication.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTitle {
    pub payload: TitlePayload,
    pub json: String,
}

/// Renders a rule's title template and enforces sink constraints.
#[derive(Debug, Clone)]
pub struct TitleRenderer {
    max_length: usize,
}

impl TitleRenderer {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Render `rule`'s title for `activity`.
    ///
    /// Length is measured in characters. Gradient fields are kept only when
    /// `gradient_feature` is granted.
    pub fn render(
        &self,
        evaluator: &dyn TemplateEvaluator,
        rule: &Rule,
        activity: &ActivityEntry,
        context: &EvaluationContext,
        gradient_feature: bool,
    ) -> Result<RenderedTitle, RenderError> {
        let text = evaluator.evaluate(&rule.title, &Bindings::new(activity, context))?;

        let length = text.chars().count();
        if length > self.max_length {
            return Err(RenderError::TooLong {
                text,
                length,
                max: self.max_length,
            });
        }

        let payload = rule.options.to_payload(text, gradient_feature);
        let json = payload
            .to_json()
            .map_err(|e| RenderError::Serialize(e.to_string()))?;

        Ok(RenderedTitle { payload, json })
    }
}

impl Default for TitleRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TITLE_LENGTH)
    }
}
