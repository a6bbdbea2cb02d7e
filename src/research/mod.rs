//! Multi-Agent Research Coordination
//!
//! The [`coordinator::ResearchCoordinator`] is the supervisor of a research
//! run. It turns a topic into a list of [`TaskSpec`](crate::types::TaskSpec)s
//! and dispatches them to registered [`WorkerAgent`](crate::agents::WorkerAgent)s.
//!
//! # Usage
//!
//! ```ignore
//! use ares_research::research::ResearchCoordinator;
//!
//! let coordinator = ResearchCoordinator::new(llm, config.coordinator.clone())
//!     .with_agent(Arc::new(web_researcher));
//!
//! let tasks = coordinator.plan_research("Impact of AI on healthcare", None).await?;
//! let results = coordinator.delegate_tasks(tasks).await;
//! ```
//!
//! # Research Workflow
//!
//! 1. **Clarification** - Generate follow-up questions for the user
//! 2. **Complexity Analysis** - Decide whether the topic needs splitting
//! 3. **Sub-topic Generation** - One task per sub-research area
//! 4. **Delegation** - Group by task type, route to capable agents, run with a
//!    bounded admission gate
//! 5. **Collection** - One result per dispatched task, failures included
//!
//! Every LLM call in this workflow has a deterministic fallback, so planning
//! never fails because of the provider.

/// Research task coordination and delegation.
pub mod coordinator;

pub use coordinator::{AgentCapabilities, ResearchCoordinator, ResearchSummary, COORDINATOR_ID};
