//! Text-to-speech synthesis
//!
//! [`OpenAISpeech`] calls the `/audio/speech` endpoint and returns the raw
//! MP3 bytes of one segment.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::Serialize;

/// Voices accepted by the speech endpoint.
pub const SUPPORTED_VOICES: [&str; 6] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer"];

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice` and return encoded audio bytes.
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
}

pub struct OpenAISpeech {
    http: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl OpenAISpeech {
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::Config(
                "Speech synthesis requires a non-empty API key".to_string(),
            ));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            api_key,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAISpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(format!("{}/audio/speech", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&SpeechRequest {
                model: &self.model,
                voice,
                input: text,
            })
            .send()
            .await
            .map_err(|e| AppError::Speech(format!("Speech request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Speech(format!(
                "Speech API error {}: {}",
                status, text
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::Speech(format!("Failed to read audio: {}", e)))?;
        Ok(bytes.to_vec())
    }
}

pub fn is_supported_voice(voice: &str) -> bool {
    SUPPORTED_VOICES.contains(&voice)
}
