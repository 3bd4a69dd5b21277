use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
const GENERATION_MODEL: &str = "claude-sonnet-4-20250514";
const MAX_TOKENS: u32 = 6000;
const TEMPERATURE: f32 = 0.7;

/// A single-turn generation request.
#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    model: &'static str,
    max_tokens: u32,
    temperature: f32,
    messages: [Turn<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Turn<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> GenerationRequest<'a> {
    fn new(prompt: &'a str) -> Self {
        Self {
            model: GENERATION_MODEL,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            messages: [Turn {
                role: "user",
                content: prompt,
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerationReply {
    content: Vec<ReplyBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ReplyBlock {
    text: Option<String>,
}

impl GenerationReply {
    /// Text blocks joined in order. A reply cut off at the token limit is
    /// still returned; the parser drops a trailing section with no content.
    fn into_text(self) -> Result<String> {
        if self.stop_reason.as_deref() == Some("max_tokens") {
            tracing::warn!("Generation stopped at the {} token limit", MAX_TOKENS);
        }
        let text = self
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");
        if text.trim().is_empty() {
            return Err(AppError::ClaudeApi("reply contained no text".to_string()));
        }
        Ok(text)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

/// Error body in the form `overloaded_error: Overloaded` when it can be read.
fn provider_error(status: StatusCode, body: &str) -> AppError {
    let detail = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => format!("{}: {}", envelope.error.kind, envelope.error.message),
        Err(_) => body.trim().to_string(),
    };
    AppError::ClaudeApi(format!("{} ({})", detail, status))
}

/// Produces new resources from a generation prompt.
pub struct ContentGenerator {
    client: Client,
    api_key: String,
}

impl ContentGenerator {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()?;
        Ok(Self { client, api_key })
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&GenerationRequest::new(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(provider_error(status, &body));
        }

        response.json::<GenerationReply>().await?.into_text()
    }

    pub fn model_version(&self) -> &'static str {
        GENERATION_MODEL
    }
}
