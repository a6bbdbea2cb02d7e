use crate::llm::client::{ChatMessage, ChatRequest, LLMClient};
use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Client for OpenAI-compatible chat-completion endpoints.
pub struct OpenAIClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_base: String,
    model: String,
}

impl OpenAIClient {
    /// `timeout` bounds each request end to end; `None` leaves requests unbounded.
    pub fn new(
        api_key: Option<String>,
        api_base: String,
        model: String,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| AppError::LLM(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let model = request.model.as_deref().unwrap_or(&self.model);
        let body = CompletionRequest {
            model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let mut http_request = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .json(&body);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| AppError::LLM(format!("OpenAI request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::LLM(format!("OpenAI API error {}: {}", status, text)));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLM(format!("Failed to parse OpenAI response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::LLM("No response from OpenAI".to_string()))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
