//! LLM Provider Clients and Abstractions
//!
//! The research pipeline treats the language model as a black-box text
//! completion capability. Every component depends on the [`LLMClient`] trait
//! only, so the coordinator, researcher, reporter and narrator can share one
//! client or each use their own.
//!
//! # Example
//!
//! ```ignore
//! use ares_research::llm::{ChatRequest, Provider};
//!
//! let client = Provider::Ollama {
//!     base_url: "http://localhost:11434".to_string(),
//!     model: "llama3.2".to_string(),
//!     timeout: None,
//! }
//! .create_client()?;
//!
//! let text = client
//!     .complete(ChatRequest::with_system("Be terse.", "What is 2+2?").temperature(0.1))
//!     .await?;
//! ```

/// Core LLM client trait, request types and provider selection.
pub mod client;
/// OpenAI-compatible chat-completion client.
pub mod openai;

pub use client::{ChatMessage, ChatRequest, LLMClient, MessageRole, Provider};
pub use openai::OpenAIClient;
