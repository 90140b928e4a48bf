use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::Provider;
use crate::errors::GenerationError;
use crate::wire::GenerationRequest;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";

/// OpenAI Chat Completions with `json_schema` structured output.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl OpenAIProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Only reasoning models accept `reasoning_effort`.
    fn supports_reasoning(&self) -> bool {
        ["o1", "o3", "o4", "gpt-5"].iter().any(|p| self.model.starts_with(p))
    }
}

fn reasoning_effort(budget: u32) -> &'static str {
    match budget {
        0..=1024 => "low",
        1025..=2048 => "medium",
        _ => "high",
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, req: &GenerationRequest) -> Result<String, GenerationError> {
        if self.api_key.trim().is_empty() {
            return Err(GenerationError::Configuration("openai API key is empty".into()));
        }

        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": req.system },
                { "role": "user", "content": req.user }
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": req.call.as_str(),
                    "schema": req.schema.to_json_schema(),
                    "strict": false
                }
            }
        });
        if self.supports_reasoning() {
            body["reasoning_effort"] = json!(reasoning_effort(req.thinking_budget));
        }

        let url = format!("{}/v1/chat/completions", self.api_base.trim_end_matches('/'));
        debug!(call = %req.call, %url, "openai: POST");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(%status, body = %text, "openai: raw response");

        if !status.is_success() {
            return Err(GenerationError::Transport(format!("OpenAI API error ({status}): {text}")));
        }

        // Minimal structs to parse the chat response
        #[derive(Deserialize)]
        struct ChatMessage {
            content: Option<String>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessage,
        }
        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| GenerationError::Transport(format!("unreadable OpenAI response: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GenerationError::EmptyResponse(self.name().to_string()));
        }
        Ok(content)
    }
}
