use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::config::UpstreamConfig;

pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
}

#[derive(Debug, Serialize)]
pub struct Message<'a> {
    pub role: Role,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ReasoningOptions {
    pub include: bool,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<Message<'a>>,
    pub reasoning: ReasoningOptions,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub reasoning: Option<String>,
    pub content: Option<String>,
}

impl From<ChatCompletionResponse> for Completion {
    fn from(response: ChatCompletionResponse) -> Self {
        let message = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .unwrap_or_default();
        Self {
            reasoning: message.reasoning,
            content: message.content,
        }
    }
}

impl Completion {
    // Joins the labelled reasoning and content blocks. Empty fields are
    // skipped; `None` means there was nothing to show.
    pub fn render(&self) -> Option<String> {
        let mut out = String::new();

        if let Some(reasoning) = self.reasoning.as_deref().filter(|r| !r.is_empty()) {
            out.push_str("Reasoning:\n---\n");
            out.push_str(reasoning);
            out.push_str("\n\n");
        }

        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            out.push_str("Content:\n---\n");
            out.push_str(content);
        }

        if out.is_empty() {
            None
        } else {
            Some(out)
        }
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl UpstreamError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            UpstreamError::Transport(e) => e.status().map(|s| s.as_u16()),
            UpstreamError::Decode(_) => None,
        }
    }
}

// Pulls `error.message` out of an upstream error body, falling back to the
// raw body text.
pub fn extract_error_message(body: &str) -> Option<String> {
    let nested = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.pointer("/error/message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    });

    nested.or_else(|| {
        let trimmed = body.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

// Message for a non-2xx reply. A body that could not be read is reported by
// its read error so the status is kept.
fn status_message(body: reqwest::Result<String>) -> String {
    match body {
        Ok(body) => extract_error_message(&body).unwrap_or_else(|| UNEXPECTED_ERROR.to_string()),
        Err(e) => e.to_string(),
    }
}

// Client for an OpenAI-compatible chat-completions endpoint.
pub struct CompletionClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl CompletionClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "HTTP-Referer",
            HeaderValue::from_str(&config.referer).context("invalid OPENROUTER_REFERER value")?,
        );
        headers.insert(
            "X-Title",
            HeaderValue::from_str(&config.app_title)
                .context("invalid OPENROUTER_APP_TITLE value")?,
        );

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("failed to build HTTP client")?;

        let endpoint = format!("{}/chat/completions", config.base_url);
        info!("Using completion endpoint {} with model {}", endpoint, config.model);

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, prompt: &str) -> Result<Completion, UpstreamError> {
        let payload = ChatCompletionRequest {
            model: &self.model,
            messages: vec![Message {
                role: Role::User,
                content: prompt,
            }],
            reasoning: ReasoningOptions { include: true },
        };
        debug!("Sending completion request: {:?}", payload);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: status_message(response.text().await),
            });
        }

        let body = response.text().await?;
        debug!("Completion response: {}", body);
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)?;
        Ok(parsed.into())
    }
}
