//! TOML-based configuration for A.R.E.S Research
//!
//! This module provides declarative configuration for the LLM provider, the
//! coordinator, the web researcher, search, reporting and narration via a TOML
//! file (`research.toml`). Every field has a documented default, so a missing
//! file or a partial file is valid.
//!
//! Credentials are never stored in the file. Each section names the
//! environment variable that holds the secret (`api_key_env`), resolved after
//! `.env` has been loaded.

use crate::llm::Provider;
use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
/// Longest input the speech endpoint accepts in one request.
pub const MAX_SPEECH_CHUNK_CHARS: usize = 4000;

/// Root configuration structure loaded from research.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearchConfig {
    pub llm: LlmConfig,
    pub coordinator: CoordinatorConfig,
    pub researcher: ResearcherConfig,
    pub search: SearchConfig,
    pub report: ReportConfig,
    pub narration: NarrationConfig,
    pub logging: LoggingConfig,
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,

    /// Base URL of the API (`/v1` root for OpenAI, server root for Ollama)
    pub api_base: String,

    /// Environment variable name containing the API key
    pub api_key_env: String,

    pub default_model: String,

    /// Optional deadline for every chat-completion call. Unset means no deadline.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            default_model: "gpt-4o-mini".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl LlmConfig {
    /// Build the runtime [`Provider`], resolving the API key from the environment.
    pub fn provider(&self) -> Result<Provider> {
        let timeout = self.request_timeout_secs.map(Duration::from_secs);
        match self.provider {
            ProviderKind::OpenAI => {
                let api_key = resolve_env(&self.api_key_env).ok_or_else(|| {
                    AppError::Config(format!(
                        "Environment variable {} is not set",
                        self.api_key_env
                    ))
                })?;
                Ok(Provider::OpenAI {
                    api_key,
                    api_base: self.api_base.clone(),
                    model: self.default_model.clone(),
                    timeout,
                })
            }
            ProviderKind::Ollama => Ok(Provider::Ollama {
                base_url: self.api_base.clone(),
                model: self.default_model.clone(),
                timeout,
            }),
        }
    }
}

// ============= Coordinator Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    pub model: String,
    pub temperature: f32,

    /// Capacity of the admission gate shared by one `delegate_tasks` call
    pub max_parallel_tasks: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            temperature: 0.1,
            max_parallel_tasks: 10,
        }
    }
}

// ============= Researcher Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResearcherConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,

    /// Maximum number of search results fetched per task
    pub max_sources: usize,
    pub fetch_concurrency: usize,
    pub fetch_timeout_secs: u64,

    /// Extracted page text is truncated to this many characters
    pub max_content_chars: usize,
}

impl Default for ResearcherConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 800,
            max_sources: 10,
            fetch_concurrency: 3,
            fetch_timeout_secs: 10,
            max_content_chars: 5000,
        }
    }
}

impl ResearcherConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchProviderKind {
    /// Google Custom Search JSON API (needs key + engine id)
    #[default]
    Google,
    /// DuckDuckGo via daedra, no credentials
    DuckDuckGo,
    /// Always use the deterministic placeholder results
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub provider: SearchProviderKind,
    pub api_key_env: String,
    pub engine_id_env: String,
    pub num_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: SearchProviderKind::Google,
            api_key_env: "GOOGLE_SEARCH_API_KEY".to_string(),
            engine_id_env: "GOOGLE_SEARCH_ENGINE_ID".to_string(),
            num_results: 10,
        }
    }
}

impl SearchConfig {
    /// Google credential pair, present only when both variables resolve.
    pub fn google_credentials(&self) -> Option<(String, String)> {
        Some((
            resolve_env(&self.api_key_env)?,
            resolve_env(&self.engine_id_env)?,
        ))
    }
}

// ============= Report Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,

    /// Directory research reports are saved into
    pub output_dir: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.3,
            max_tokens: 2000,
            output_dir: ".".to_string(),
        }
    }
}

// ============= Narration Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrationConfig {
    /// Environment variable name containing the speech API key
    pub api_key_env: String,
    pub api_base: String,
    pub tts_model: String,
    pub voice: String,
    pub script_model: String,
    pub script_temperature: f32,
    pub output_dir: String,

    /// Maximum characters per synthesized segment
    pub max_chunk_chars: usize,

    /// Fixed pause between segment requests
    pub segment_delay_ms: u64,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            tts_model: "tts-1".to_string(),
            voice: "nova".to_string(),
            script_model: "gpt-4o-mini".to_string(),
            script_temperature: 0.7,
            output_dir: "podcasts".to_string(),
            max_chunk_chars: MAX_SPEECH_CHUNK_CHARS,
            segment_delay_ms: 1000,
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ============= Loading =============

impl ResearchConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; an unreadable or invalid file is a
    /// configuration error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| AppError::Config(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or break a research run.
    pub fn validate(&self) -> Result<()> {
        if self.coordinator.max_parallel_tasks == 0 {
            return Err(AppError::Config(
                "coordinator.max_parallel_tasks must be at least 1".to_string(),
            ));
        }
        if self.researcher.fetch_concurrency == 0 {
            return Err(AppError::Config(
                "researcher.fetch_concurrency must be at least 1".to_string(),
            ));
        }
        if self.researcher.max_sources == 0 {
            return Err(AppError::Config(
                "researcher.max_sources must be at least 1".to_string(),
            ));
        }
        if self.narration.max_chunk_chars == 0 {
            return Err(AppError::Config(
                "narration.max_chunk_chars must be at least 1".to_string(),
            ));
        }
        if self.narration.max_chunk_chars > MAX_SPEECH_CHUNK_CHARS {
            return Err(AppError::Config(format!(
                "narration.max_chunk_chars must be at most {}, got {}",
                MAX_SPEECH_CHUNK_CHARS, self.narration.max_chunk_chars
            )));
        }

        let temperatures = [
            ("coordinator.temperature", self.coordinator.temperature),
            ("researcher.temperature", self.researcher.temperature),
            ("report.temperature", self.report.temperature),
            ("narration.script_temperature", self.narration.script_temperature),
        ];
        for (name, value) in temperatures {
            if !(0.0..=2.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "{} must be between 0.0 and 2.0, got {}",
                    name, value
                )));
            }
        }

        let models = [
            ("llm.default_model", &self.llm.default_model),
            ("coordinator.model", &self.coordinator.model),
            ("researcher.model", &self.researcher.model),
            ("report.model", &self.report.model),
        ];
        for (name, value) in models {
            if value.trim().is_empty() {
                return Err(AppError::Config(format!("{} must not be empty", name)));
            }
        }

        Ok(())
    }
}

/// Read a non-empty environment variable.
pub fn resolve_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
