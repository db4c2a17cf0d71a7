//! HTTP webhook sink.
//!
//! Titles are POSTed as the JSON payload; a clear is sent as DELETE to the
//! same URL. Warnings are POSTed to `{url}/warnings`.

use std::collections::HashMap;

use crate::traits::{SinkError, TitleSink};

/// Delivers title commands over HTTP to a configured endpoint.
///
/// Environment variable references (`${VAR_NAME}`) in the URL and header
/// values are resolved at construction time.
#[derive(Debug)]
pub struct WebhookSink {
    url: String,
    headers: HashMap<String, String>,
    client: reqwest::Client,
}

impl WebhookSink {
    /// Create a new webhook sink. Missing env vars produce [`SinkError::Config`].
    pub fn new(url: &str, headers: HashMap<String, String>) -> Result<Self, SinkError> {
        let resolved_url = resolve_env_vars(url)?;
        if resolved_url.trim().is_empty() {
            return Err(SinkError::Config("webhook url is empty".into()));
        }

        let mut resolved_headers = HashMap::with_capacity(headers.len());
        for (key, value) in &headers {
            resolved_headers.insert(key.clone(), resolve_env_vars(value)?);
        }

        Ok(Self {
            url: resolved_url,
            headers: resolved_headers,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn warnings_url(&self) -> String {
        format!("{}/warnings", self.url.trim_end_matches('/'))
    }

    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<(), SinkError> {
        let mut request = request;
        for (key, value) in &self.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(
                url = %self.url,
                %status,
                body = %body_text,
                "webhook returned non-2xx status"
            );
            return Err(SinkError::Rejected(format!(
                "webhook returned {status}: {body_text}"
            )));
        }

        tracing::debug!(url = %self.url, %status, "webhook title command delivered");
        Ok(())
    }
}

#[async_trait::async_trait]
impl TitleSink for WebhookSink {
    async fn set_title(&self, payload: &str) -> Result<(), SinkError> {
        let request = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(payload.to_string());
        self.execute(request).await
    }

    async fn clear_title(&self) -> Result<(), SinkError> {
        self.execute(self.client.delete(&self.url)).await
    }

    async fn show_warning(&self, message: &str) -> Result<(), SinkError> {
        let body = serde_json::json!({ "message": message }).to_string();
        let request = self
            .client
            .post(self.warnings_url())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body);
        self.execute(request).await
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

/// Resolve `${VAR_NAME}` patterns in a string using `std::env::var`.
///
/// Returns an error if a referenced variable is not set.
fn resolve_env_vars(input: &str) -> Result<String, SinkError> {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next();
            let mut var_name = String::new();
            let mut closed = false;
            for c in chars.by_ref() {
                if c == '}' {
                    closed = true;
                    break;
                }
                var_name.push(c);
            }
            if !closed {
                return Err(SinkError::Config(format!(
                    "unclosed env var reference in: {input}"
                )));
            }
            let value = std::env::var(&var_name)
                .map_err(|_| SinkError::Config(format!("env var not found: {var_name}")))?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}
