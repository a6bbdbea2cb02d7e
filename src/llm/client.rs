//! LLM Client abstractions and provider management
//!
//! This module provides a unified interface for chat-completion providers:
//! - **OpenAI**: Any OpenAI-compatible `/chat/completions` endpoint
//! - **Ollama**: Local inference through Ollama's OpenAI-compatible API

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// A single chat-completion request.
///
/// `model` overrides the client's default model when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// System + user message pair, the shape every call site in this crate uses.
    pub fn with_system(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(prompt)],
            ..Default::default()
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Concatenated content of all user messages.
    pub fn user_content(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Generic LLM client trait for provider abstraction
///
/// Every component that needs text completion holds an `Arc<dyn LLMClient>`,
/// so tests can substitute scripted clients without touching the network.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Run a chat completion and return the text of the first choice
    async fn complete(&self, request: ChatRequest) -> Result<String>;

    /// Get the model name/identifier
    fn model_name(&self) -> &str;

    /// Generate a completion from a single user prompt
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.complete(ChatRequest {
            messages: vec![ChatMessage::user(prompt)],
            ..Default::default()
        })
        .await
    }

    /// Generate with system prompt
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.complete(ChatRequest::with_system(system, prompt)).await
    }
}

/// Provider enum for runtime selection
#[derive(Debug, Clone)]
pub enum Provider {
    /// OpenAI API provider (including Azure OpenAI and compatible APIs)
    ///
    /// # Example
    /// ```rust,ignore
    /// let provider = Provider::OpenAI {
    ///     api_key: "sk-...".to_string(),
    ///     api_base: "https://api.openai.com/v1".to_string(),
    ///     model: "gpt-4o-mini".to_string(),
    ///     timeout: None,
    /// };
    /// ```
    OpenAI {
        api_key: String,
        api_base: String,
        model: String,
        timeout: Option<Duration>,
    },

    /// Ollama local LLM provider, reached through its `/v1` compatibility layer
    Ollama {
        base_url: String,
        model: String,
        timeout: Option<Duration>,
    },
}

impl Provider {
    /// Create a client instance for this provider
    ///
    /// # Errors
    ///
    /// Returns an error if the OpenAI API key is empty or the HTTP client
    /// cannot be built.
    pub fn create_client(&self) -> Result<Box<dyn LLMClient>> {
        match self {
            Provider::OpenAI {
                api_key,
                api_base,
                model,
                timeout,
            } => {
                if api_key.trim().is_empty() {
                    return Err(AppError::Config(
                        "OpenAI provider requires a non-empty API key".to_string(),
                    ));
                }
                Ok(Box::new(super::openai::OpenAIClient::new(
                    Some(api_key.clone()),
                    api_base.clone(),
                    model.clone(),
                    *timeout,
                )?))
            }

            Provider::Ollama {
                base_url,
                model,
                timeout,
            } => {
                let api_base = format!("{}/v1", base_url.trim_end_matches('/'));
                Ok(Box::new(super::openai::OpenAIClient::new(
                    None,
                    api_base,
                    model.clone(),
                    *timeout,
                )?))
            }
        }
    }

    /// Get a human-readable name for this provider
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAI { .. } => "OpenAI",
            Provider::Ollama { .. } => "Ollama",
        }
    }

    /// The model requests default to when a call site does not override it
    pub fn model(&self) -> &str {
        match self {
            Provider::OpenAI { model, .. } | Provider::Ollama { model, .. } => model,
        }
    }
}
