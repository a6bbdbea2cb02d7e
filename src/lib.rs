//! # A.R.E.S Research - Multi-Agent Deep Research
//!
//! A research pipeline that turns a topic into a cited report. A supervising
//! coordinator asks clarifying questions, decides whether the topic needs to
//! be split, plans one task per sub-topic and runs the tasks in parallel on
//! worker agents. A synthesizer merges the findings into the final report,
//! which can optionally be narrated to audio.
//!
//! ## Overview
//!
//! The crate can be used in two ways:
//!
//! 1. **As a CLI** - Run the `ares-research` binary
//! 2. **As a library** - Wire the components into your own Rust project
//!
//! ### Basic Example
//!
//! ```rust,ignore
//! use ares_research::{ResearchConfig, ResearchSystem};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResearchConfig::load("research.toml")?;
//!     let system = ResearchSystem::from_config(&config)?;
//!
//!     let report = system
//!         .conduct_research("Impact of AI on healthcare", None, None)
//!         .await;
//!     println!("{}", report);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Custom Worker Agents
//!
//! ```rust,ignore
//! use ares_research::{ResearchCoordinator, WorkerAgent};
//! use std::sync::Arc;
//!
//! let coordinator = ResearchCoordinator::new(llm, config.coordinator.clone())
//!     .with_agent(Arc::new(web_researcher))
//!     .with_agent(Arc::new(my_patent_search_agent));
//!
//! let tasks = coordinator.plan_research("Solid-state batteries", None).await?;
//! let results = coordinator.delegate_tasks(tasks).await;
//! ```
//!
//! ## Modules
//!
//! - [`agents`] - Worker agent trait and the web researcher
//! - [`research`] - Planning and parallel delegation
//! - [`report`] - Report synthesis with deterministic fallbacks
//! - [`narration`] - Report-to-audio conversion
//! - [`system`] - End-to-end runs and report persistence
//! - [`llm`] - Chat-completion clients
//! - [`tools`] - Search, page fetching and speech synthesis
//! - [`types`] - Common types and error handling

#![warn(rustdoc::missing_crate_level_docs)]

/// Worker agents and the web researcher.
pub mod agents;
/// Command-line definitions and terminal output.
pub mod cli;
/// LLM provider clients and abstractions.
pub mod llm;
/// Report narration.
pub mod narration;
/// Report synthesis.
pub mod report;
/// Multi-agent research coordination.
pub mod research;
/// End-to-end research runs.
pub mod system;
/// Search, fetch and speech capabilities.
pub mod tools;
/// Core types (tasks, results, errors).
pub mod types;
/// Configuration and text utilities.
pub mod utils;

// Re-export commonly used types
pub use agents::{WebResearcher, WorkerAgent};
pub use llm::{ChatRequest, LLMClient, Provider};
pub use narration::NarrationConverter;
pub use report::ReportSynthesizer;
pub use research::ResearchCoordinator;
pub use system::{ResearchSystem, SystemStatus};
pub use types::{AppError, Result, TaskResult, TaskSpec};
pub use utils::toml_config::ResearchConfig;
