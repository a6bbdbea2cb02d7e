//! Worker agents
//!
//! A worker declares which task categories it accepts and turns one
//! [`TaskSpec`] into one [`TaskResult`]. The coordinator only ever holds
//! `Arc<dyn WorkerAgent>` handles and never inspects the concrete type.

pub mod web_researcher;

use crate::types::{Result, TaskResult, TaskSpec};
use async_trait::async_trait;

pub use web_researcher::{ExtractedSource, WebResearcher};

/// Base trait for all worker agents
#[async_trait]
pub trait WorkerAgent: Send + Sync {
    /// Stable identifier, also used as the task id of synthetic failure results
    fn agent_id(&self) -> &str;

    /// Advertised capability labels (informational)
    fn capabilities(&self) -> &[&'static str];

    /// Whether this agent accepts tasks of `task_type`. Must not change over
    /// the agent's lifetime.
    fn can_handle_task(&self, task_type: &str) -> bool;

    /// Execute one task.
    ///
    /// Expected failures (missing query, no search results, network errors)
    /// are reported as a `failed` or degraded result. An `Err` is reserved for
    /// unexpected internal errors, which the coordinator isolates per task.
    async fn execute_task(&self, task: &TaskSpec) -> Result<TaskResult>;
}
