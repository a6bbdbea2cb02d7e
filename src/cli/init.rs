//! Init command implementation
//!
//! Writes a commented `research.toml`, a `.env.example` and a `.gitignore`
//! into a directory so a research run can be configured in one step.

use super::output::Output;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq, Eq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// research.toml already exists and --force was not given
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// LLM provider to configure (openai or ollama)
    pub provider: String,
    /// Search backend to configure (google, duckduckgo or simulated)
    pub search: String,
}

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.section("Initializing research configuration");

    let base_path = &config.path;
    if let Err(e) = fs::create_dir_all(base_path) {
        output.error(&format!("Failed to create {}: {}", base_path.display(), e));
        return InitResult::Error(e.to_string());
    }

    let config_path = base_path.join("research.toml");
    if config_path.exists() && !config.force {
        output.warning("research.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.group("Creating files");

    if let Err(e) = write_file(&config_path, &generate_research_toml(&config), config.force) {
        output.error(&format!("Failed to create research.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.wrote("config", "research.toml");

    if let Err(e) = write_file(
        &base_path.join(".env.example"),
        &generate_env_example(),
        config.force,
    ) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.wrote("env", ".env.example");

    let gitignore_path = base_path.join(".gitignore");
    if gitignore_path.exists() {
        output.left_alone(".gitignore", "already exists");
    } else if let Err(e) = write_file(&gitignore_path, &generate_gitignore(), false) {
        output.warning(&format!("Failed to create .gitignore: {}", e));
    } else {
        output.wrote("file", ".gitignore");
    }

    output.done("Research configuration initialized!");

    output.section("Next Steps");
    output.next_step(1, "Set up environment variables:", Some("cp .env.example .env"));
    if config.provider == "ollama" {
        output.next_step(2, "Start Ollama (if not running):", Some("ollama serve"));
    } else {
        output.next_step(2, "Set OPENAI_API_KEY in .env", None);
    }
    output.next_step(
        3,
        "Start a research run:",
        Some("ares-research run --topic \"Impact of AI on healthcare\""),
    );

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_research_toml(config: &InitConfig) -> String {
    let llm_section = if config.provider == "ollama" {
        r#"# Ollama - local inference, no API key required.
# Component models below must name models pulled into Ollama.
[llm]
provider = "ollama"
api_base = "http://localhost:11434"
default_model = "llama3.2"
# request_timeout_secs = 120
"#
    } else {
        r#"# OpenAI or any OpenAI-compatible endpoint (set OPENAI_API_KEY in .env)
[llm]
provider = "openai"
api_base = "https://api.openai.com/v1"
api_key_env = "OPENAI_API_KEY"
default_model = "gpt-4o-mini"
# request_timeout_secs = 120
"#
    };

    let (coordinator_model, worker_model) = if config.provider == "ollama" {
        ("llama3.2", "llama3.2")
    } else {
        ("gpt-4", "gpt-4o-mini")
    };

    let search = match config.search.as_str() {
        "duckduckgo" | "simulated" => config.search.as_str(),
        _ => "google",
    };

    format!(
        r#"# A.R.E.S Research configuration
# Every value below is optional and shows its default.

{llm_section}
# ===== Coordinator =====
[coordinator]
model = "{coordinator_model}"
temperature = 0.1
max_parallel_tasks = 10

# ===== Web researcher =====
[researcher]
model = "{worker_model}"
temperature = 0.3
max_tokens = 800
max_sources = 10
fetch_concurrency = 3
fetch_timeout_secs = 10
max_content_chars = 5000

# ===== Search =====
# google needs both variables below; without them simulated results are used.
[search]
provider = "{search}"
api_key_env = "GOOGLE_SEARCH_API_KEY"
engine_id_env = "GOOGLE_SEARCH_ENGINE_ID"
num_results = 10

# ===== Report =====
[report]
model = "{worker_model}"
temperature = 0.3
max_tokens = 2000
output_dir = "."

# ===== Narration =====
[narration]
api_key_env = "OPENAI_API_KEY"
tts_model = "tts-1"
voice = "nova"
script_model = "{worker_model}"
output_dir = "podcasts"
max_chunk_chars = 4000
segment_delay_ms = 1000

# ===== Logging =====
[logging]
level = "info"
json = false
"#
    )
}

fn generate_env_example() -> String {
    r#"# LLM and speech synthesis
OPENAI_API_KEY=sk-your-key-here

# Google Custom Search (optional)
GOOGLE_SEARCH_API_KEY=
GOOGLE_SEARCH_ENGINE_ID=

# Logging (overrides [logging].level)
RUST_LOG=ares_research=info
"#
    .to_string()
}

fn generate_gitignore() -> String {
    r#"# Environment
.env

# Research output
research_report_*.txt
podcasts/

# Rust
/target/
"#
    .to_string()
}
