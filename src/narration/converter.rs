use crate::llm::{ChatRequest, LLMClient};
use crate::tools::speech::{is_supported_voice, OpenAISpeech, SpeechSynthesizer};
use crate::types::{AppError, Result};
use crate::utils::text::sanitize_component;
use crate::utils::toml_config::{resolve_env, NarrationConfig};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").expect("valid regex"));

const SCRIPT_SYSTEM_PROMPT: &str = "You are an expert podcast scriptwriter. Transform a formal, \
dense research report into an engaging, conversational script that is easy to follow when \
heard.

- Open with a welcoming introduction and close with a short outro thanking the listener.
- Turn data, findings and recommendations into natural narrative, using analogies where they help.
- Rewrite the content to be spoken rather than summarizing it.
- Keep the core facts, figures and insights of the report.
- Use conversational transitions instead of formal headers.";

/// Converts a finished report into numbered audio segments.
pub struct NarrationConverter {
    llm: Arc<dyn LLMClient>,
    speech: Arc<dyn SpeechSynthesizer>,
    config: NarrationConfig,
    voice: String,
}

impl NarrationConverter {
    pub fn new(
        llm: Arc<dyn LLMClient>,
        speech: Arc<dyn SpeechSynthesizer>,
        config: NarrationConfig,
    ) -> Self {
        let voice = if is_supported_voice(&config.voice) {
            config.voice.clone()
        } else {
            tracing::warn!("Unsupported voice '{}', using 'nova'", config.voice);
            "nova".to_string()
        };
        Self {
            llm,
            speech,
            config,
            voice,
        }
    }

    /// Build a converter backed by the OpenAI speech endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when the speech API key variable is unset.
    pub fn from_config(llm: Arc<dyn LLMClient>, config: NarrationConfig) -> Result<Self> {
        let api_key = resolve_env(&config.api_key_env).ok_or_else(|| {
            AppError::Config(format!(
                "{} environment variable not set, narration is unavailable",
                config.api_key_env
            ))
        })?;
        let speech = OpenAISpeech::new(api_key, config.api_base.clone(), config.tts_model.clone())?;
        Ok(Self::new(llm, Arc::new(speech), config))
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    /// Switch voices. Unknown names keep the current voice and return false.
    pub fn set_voice(&mut self, voice: &str) -> bool {
        if is_supported_voice(voice) {
            self.voice = voice.to_string();
            tracing::info!("Voice set to '{}'", self.voice);
            true
        } else {
            tracing::warn!("Invalid voice name '{}', keeping '{}'", voice, self.voice);
            false
        }
    }

    /// Rewrite `report` as a spoken script and synthesize it segment by
    /// segment. Returns the directory holding `part_<n>.mp3` files.
    pub async fn create_narration(&self, report: &str, topic: &str) -> Result<PathBuf> {
        tracing::info!("Starting narration for '{}'", topic);

        let script = self.write_script(report, topic).await?;
        let dir = self.run_directory(topic);
        tokio::fs::create_dir_all(&dir).await?;

        let segments = split_into_segments(&script, self.config.max_chunk_chars);
        tracing::info!("Script split into {} audio parts", segments.len());

        let delay = Duration::from_millis(self.config.segment_delay_ms);
        let mut written = 0;
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let path = dir.join(format!("part_{}.mp3", i + 1));
            match self.speech.synthesize(segment, &self.voice).await {
                Ok(audio) => {
                    tokio::fs::write(&path, audio).await?;
                    tracing::debug!("Wrote {}", path.display());
                    written += 1;
                }
                Err(e) => tracing::warn!("Failed to generate part {}: {}", i + 1, e),
            }
        }

        tracing::info!(
            "Narration wrote {}/{} parts to {}",
            written,
            segments.len(),
            dir.display()
        );
        Ok(dir)
    }

    async fn write_script(&self, report: &str, topic: &str) -> Result<String> {
        let prompt = format!(
            "Please rewrite the following research report on the topic '{}' into a podcast script:\n\n\
             --- REPORT START ---\n{}\n--- REPORT END ---",
            topic, report
        );
        let request = ChatRequest::with_system(SCRIPT_SYSTEM_PROMPT, prompt)
            .model(self.config.script_model.clone())
            .temperature(self.config.script_temperature);

        let script = self.llm.complete(request).await?;
        if script.trim().is_empty() {
            return Err(AppError::LLM("Empty narration script".to_string()));
        }
        Ok(script)
    }

    fn run_directory(&self, topic: &str) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Path::new(&self.config.output_dir).join(format!(
            "{}_{}",
            sanitize_component(topic),
            timestamp
        ))
    }
}

/// Split `text` at sentence boundaries into segments of at most `max_chars`
/// characters. Newlines are folded into spaces; a single sentence longer than
/// the limit is cut at character boundaries.
pub fn split_into_segments(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let flattened = text.replace('\n', " ");

    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(&flattened) {
        sentences.push(&flattened[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&flattened[start..]);

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in sentences.into_iter().map(str::trim).filter(|s| !s.is_empty()) {
        let sentence_len = sentence.chars().count();

        if sentence_len > max_chars {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = sentence.chars().collect();
            segments.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }

        let needed = if current.is_empty() {
            sentence_len
        } else {
            current_len + 1 + sentence_len
        };
        if needed > max_chars {
            segments.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(sentence);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
