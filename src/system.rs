//! End-to-end research runs
//!
//! [`ResearchSystem`] wires a coordinator with its worker agents and a report
//! synthesizer. [`ResearchSystem::conduct_research`] is the outermost error
//! boundary: whatever goes wrong, the caller gets report text back.

use crate::agents::{WebResearcher, WorkerAgent};
use crate::llm::LLMClient;
use crate::report::ReportSynthesizer;
use crate::research::{AgentCapabilities, ResearchCoordinator};
use crate::types::{FollowUpQuestions, Result};
use crate::utils::text::{sanitize_component, truncate_chars};
use crate::utils::toml_config::ResearchConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

const REPORT_NAME_CHARS: usize = 30;

/// Snapshot of the configured system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub system_status: String,
    pub total_agents: usize,
    pub agents: Vec<AgentCapabilities>,
    pub max_parallel_tasks: usize,
    pub reporter_model: String,
}

pub struct ResearchSystem {
    coordinator: ResearchCoordinator,
    reporter: ReportSynthesizer,
}

impl ResearchSystem {
    pub fn new(coordinator: ResearchCoordinator, reporter: ReportSynthesizer) -> Self {
        Self {
            coordinator,
            reporter,
        }
    }

    /// Build the default system (one web researcher) from configuration,
    /// creating the LLM client from the `[llm]` section.
    pub fn from_config(config: &ResearchConfig) -> Result<Self> {
        let llm: Arc<dyn LLMClient> = Arc::from(config.llm.provider()?.create_client()?);
        Self::with_llm(llm, config)
    }

    /// Build the default system around an existing LLM client.
    pub fn with_llm(llm: Arc<dyn LLMClient>, config: &ResearchConfig) -> Result<Self> {
        let researcher =
            WebResearcher::from_config(Arc::clone(&llm), &config.researcher, &config.search)?;
        let coordinator = ResearchCoordinator::new(Arc::clone(&llm), config.coordinator.clone())
            .with_agent(Arc::new(researcher));
        let reporter = ReportSynthesizer::new(llm, config.report.clone());

        tracing::info!(
            "System initialized with {} agents",
            coordinator.agents().len()
        );
        Ok(Self::new(coordinator, reporter))
    }

    pub fn add_agent(&mut self, agent: Arc<dyn WorkerAgent>) {
        self.coordinator.add_agent(agent);
    }

    pub fn coordinator(&self) -> &ResearchCoordinator {
        &self.coordinator
    }

    pub fn reporter(&self) -> &ReportSynthesizer {
        &self.reporter
    }

    /// Clarifying questions to put to the user before planning.
    pub async fn clarify(&self, topic: &str) -> FollowUpQuestions {
        self.coordinator.generate_follow_up_questions(topic).await
    }

    /// Render question/answer pairs as planning context.
    pub fn format_answers(questions: &[String], answers: &[String]) -> String {
        let mut context = String::from("User responses to follow-up questions:\n");
        for (i, question) in questions.iter().enumerate() {
            let answer = answers
                .get(i)
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .unwrap_or("No answer provided");
            context.push_str(&format!("Q{n}: {question}\nA{n}: {answer}\n\n", n = i + 1));
        }
        context.trim_end().to_string()
    }

    /// Plan, delegate and report on `topic`.
    ///
    /// Never fails: any error is turned into a failure report.
    pub async fn conduct_research(
        &self,
        topic: &str,
        additional_context: Option<&str>,
        brief: Option<&str>,
    ) -> String {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("research_run", %run_id, topic = %topic);

        async {
            tracing::info!("Starting research on '{}'", topic);
            match self.run(topic, additional_context, brief).await {
                Ok(report) => {
                    tracing::info!("Research completed ({} chars)", report.len());
                    report
                }
                Err(e) => {
                    tracing::error!("Research failed: {}", e);
                    error_report(topic, &e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        topic: &str,
        additional_context: Option<&str>,
        brief: Option<&str>,
    ) -> Result<String> {
        let tasks = self.coordinator.plan_research(topic, additional_context).await?;
        tracing::info!("Created {} research tasks", tasks.len());

        let planned = tasks.len();
        let results = self.coordinator.delegate_tasks(tasks).await;
        if results.len() < planned {
            tracing::warn!(
                "{} of {} tasks had no capable agent",
                planned - results.len(),
                planned
            );
        }

        Ok(self.reporter.generate_report(topic, &results, brief).await)
    }

    pub fn status(&self) -> SystemStatus {
        let summary = self.coordinator.research_summary();
        SystemStatus {
            system_status: "operational".to_string(),
            total_agents: summary.total_agents,
            agents: summary.agent_capabilities,
            max_parallel_tasks: summary.max_parallel_tasks,
            reporter_model: self.reporter.model_name().to_string(),
        }
    }
}

/// User-facing report for a run that could not complete.
pub fn error_report(topic: &str, error: &str) -> String {
    format!(
        "# Research Report: {topic}\n\n\
         ## Status: Failed\n\n\
         Unfortunately, the research process encountered an error and could not complete.\n\n\
         **Error Details:**\n\
         {error}\n\n\
         ## Recommendations\n\
         - Check your API keys and network connection\n\
         - Verify the configuration file with `ares-research config --validate`\n\
         - Try a more specific research topic\n"
    )
}

/// `research_report_<topic>.txt` with non-alphanumerics replaced and the topic
/// part capped at 30 characters.
pub fn report_filename(topic: &str) -> String {
    let sanitized = sanitize_component(topic.trim());
    format!(
        "research_report_{}.txt",
        truncate_chars(&sanitized, REPORT_NAME_CHARS)
    )
}

/// Write `report` into `dir`, creating it if needed. Returns the file path.
pub async fn save_report(dir: &Path, topic: &str, report: &str) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(report_filename(topic));
    tokio::fs::write(&path, report).await?;
    tracing::info!("Report saved to {}", path.display());
    Ok(path)
}
