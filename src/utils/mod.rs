/// JSON payload helpers for provider responses.
pub mod json;
/// Character-safe truncation and filename sanitizing.
pub mod text;
/// TOML configuration.
pub mod toml_config;

pub use json::{parse_json_payload, strip_code_fences};
pub use text::{sanitize_component, truncate_chars};
pub use toml_config::ResearchConfig;
