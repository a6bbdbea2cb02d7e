use crate::{
    agents::WorkerAgent,
    llm::{ChatRequest, LLMClient},
    types::{
        AppError, ComplexityAssessment, FollowUpQuestions, Priority, Result, Subtopic, TaskResult,
        TaskSpec, MAX_SUBTOPICS, WEB_SEARCH_TASK,
    },
    utils::{json::parse_json_payload, toml_config::CoordinatorConfig},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;

pub const COORDINATOR_ID: &str = "research_coordinator";

const COORDINATOR_CAPABILITIES: [&str; 3] = ["coordinate_research", "plan_research", "delegate_tasks"];

const PLANNER_SYSTEM_PROMPT: &str =
    "You are a research planning expert. Respond ONLY with valid JSON. No additional text.";
const STRATEGY_SYSTEM_PROMPT: &str =
    "You are a research strategy expert. Respond ONLY with valid JSON. No additional text.";

const FOLLOW_UP_HEADER: &str =
    "To better focus the research, please consider these follow-up questions:\n\n";
const FOLLOW_UP_COUNT: usize = 3;

#[derive(Deserialize)]
struct FollowUpPayload {
    #[serde(default)]
    questions: Vec<String>,
    #[serde(default)]
    explanation: String,
}

#[derive(Deserialize)]
struct SubtopicPayload {
    subtopics: Vec<Subtopic>,
}

/// Capabilities advertised by one registered worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCapabilities {
    pub agent_id: String,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchSummary {
    pub total_agents: usize,
    pub agent_capabilities: Vec<AgentCapabilities>,
    pub max_parallel_tasks: usize,
}

/// Supervisor that plans a topic into tasks and runs them on worker agents.
pub struct ResearchCoordinator {
    llm: Arc<dyn LLMClient>,
    agents: Vec<Arc<dyn WorkerAgent>>,
    config: CoordinatorConfig,
}

impl ResearchCoordinator {
    pub fn new(llm: Arc<dyn LLMClient>, config: CoordinatorConfig) -> Self {
        Self {
            llm,
            agents: Vec::new(),
            config,
        }
    }

    pub fn add_agent(&mut self, agent: Arc<dyn WorkerAgent>) {
        self.agents.push(agent);
    }

    pub fn with_agent(mut self, agent: Arc<dyn WorkerAgent>) -> Self {
        self.add_agent(agent);
        self
    }

    pub fn agents(&self) -> &[Arc<dyn WorkerAgent>] {
        &self.agents
    }

    pub fn max_parallel_tasks(&self) -> usize {
        self.config.max_parallel_tasks.max(1)
    }

    fn planner_request(&self, system: &str, prompt: String) -> ChatRequest {
        ChatRequest::with_system(system, prompt)
            .model(self.config.model.clone())
            .temperature(self.config.temperature)
    }

    /// Ask for three clarifying questions. Never fails: any provider or parse
    /// error yields the fixed fallback set.
    pub async fn generate_follow_up_questions(&self, topic: &str) -> FollowUpQuestions {
        let prompt = format!(
            r#"Based on this research topic: "{topic}"

Generate exactly {FOLLOW_UP_COUNT} follow-up questions that would help gather more context and clarify the research scope.

IMPORTANT: Respond ONLY with valid JSON in this exact format:
{{
    "questions": [
        "First follow-up question?",
        "Second follow-up question?",
        "Third follow-up question?"
    ],
    "explanation": "Brief explanation of why these questions matter for this research"
}}"#
        );

        let payload = match self
            .llm
            .complete(self.planner_request(PLANNER_SYSTEM_PROMPT, prompt))
            .await
            .and_then(|text| parse_json_payload::<FollowUpPayload>(&text))
        {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Follow-up question generation failed: {}", e);
                return fallback_follow_ups(topic);
            }
        };

        let questions: Vec<String> = payload
            .questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .take(FOLLOW_UP_COUNT)
            .collect();

        if questions.is_empty() {
            tracing::warn!("Provider returned no follow-up questions, using fallback");
            return fallback_follow_ups(topic);
        }

        tracing::info!("Generated {} follow-up questions", questions.len());
        let message = format_follow_up_message(&questions, Some(&payload.explanation));
        FollowUpQuestions { questions, message }
    }

    /// Decide whether `topic` needs to be split and into how many parts.
    pub async fn analyze_topic_complexity(&self, topic: &str, context: &str) -> ComplexityAssessment {
        let context_text = if context.is_empty() {
            String::new()
        } else {
            format!("\nAdditional Context: {}", context)
        };

        let prompt = format!(
            r#"Analyze this research topic for complexity and research strategy:

Topic: "{topic}"{context_text}

Evaluate:
1. The main aspects or dimensions of this topic
2. How many sub-research areas would be optimal (between 1 and {MAX_SUBTOPICS})
3. Which research approach would work best

IMPORTANT: Respond ONLY with valid JSON in this exact format:
{{
    "is_complex": true,
    "main_aspects": ["aspect1", "aspect2"],
    "recommended_subtopics": <integer between 1 and {MAX_SUBTOPICS}>,
    "research_approach": "analytical",
    "reasoning": "explanation here"
}}"#
        );

        match self
            .llm
            .complete(self.planner_request(PLANNER_SYSTEM_PROMPT, prompt))
            .await
            .and_then(|text| parse_json_payload::<ComplexityAssessment>(&text))
        {
            Ok(assessment) => {
                let assessment = assessment.normalized();
                tracing::info!(
                    is_complex = assessment.is_complex,
                    recommended_subtopics = assessment.recommended_subtopics,
                    approach = %assessment.research_approach,
                    "Topic analysis: {}",
                    assessment.reasoning
                );
                assessment
            }
            Err(e) => {
                tracing::warn!("Complexity analysis failed, using heuristic: {}", e);
                ComplexityAssessment::heuristic(topic)
            }
        }
    }

    /// Ask for `assessment.recommended_subtopics` sub-research areas.
    pub async fn generate_subtopics(
        &self,
        topic: &str,
        assessment: &ComplexityAssessment,
        context: &str,
    ) -> Vec<Subtopic> {
        let context_text = if context.is_empty() {
            String::new()
        } else {
            format!("\nAdditional Context: {}", context)
        };

        let prompt = format!(
            r#"Create {count} focused research sub-topics for: "{topic}"{context_text}

Main aspects to cover: {aspects}
Research approach: {approach}

IMPORTANT: Respond ONLY with valid JSON in this exact format:
{{
    "subtopics": [
        {{
            "query": "specific search terms",
            "description": "what this sub-research focuses on",
            "context": "specific angle or focus area",
            "priority": "high",
            "rationale": "why this subtopic is important"
        }}
    ]
}}"#,
            count = assessment.recommended_subtopics,
            aspects = assessment.main_aspects.join(", "),
            approach = assessment.research_approach,
        );

        let subtopics = match self
            .llm
            .complete(self.planner_request(STRATEGY_SYSTEM_PROMPT, prompt))
            .await
            .and_then(|text| parse_json_payload::<SubtopicPayload>(&text))
        {
            Ok(payload) => payload
                .subtopics
                .into_iter()
                .filter(|s| !s.query.trim().is_empty())
                .take(MAX_SUBTOPICS)
                .collect::<Vec<_>>(),
            Err(e) => {
                tracing::warn!("Sub-topic generation failed: {}", e);
                Vec::new()
            }
        };

        if subtopics.is_empty() {
            tracing::warn!("No usable sub-topics for '{}', researching it as one topic", topic);
            return vec![fallback_subtopic(topic)];
        }

        tracing::info!("Generated {} sub-topics", subtopics.len());
        subtopics
    }

    /// Break `topic` into web-search tasks.
    ///
    /// Without `context`, follow-up questions are generated and folded into
    /// the planning context. The returned list is the whole plan; nothing is
    /// kept on the coordinator.
    pub async fn plan_research(&self, topic: &str, context: Option<&str>) -> Result<Vec<TaskSpec>> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(AppError::InvalidInput(
                "Research topic must not be empty".to_string(),
            ));
        }

        let enhanced_context = match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(context) => format!("{}\n\n{}", topic, context),
            None => {
                let follow_ups = self.generate_follow_up_questions(topic).await;
                format!(
                    "{}\n\nAdditional context/questions to consider:\n{}",
                    topic, follow_ups.message
                )
            }
        };

        let assessment = self.analyze_topic_complexity(topic, &enhanced_context).await;

        let tasks: Vec<TaskSpec> = if assessment.is_complex {
            self.generate_subtopics(topic, &assessment, &enhanced_context)
                .await
                .into_iter()
                .enumerate()
                .map(|(i, subtopic)| {
                    let priority = subtopic.priority();
                    TaskSpec::new(task_id(i), WEB_SEARCH_TASK, subtopic.query)
                        .with_description(subtopic.description)
                        .with_context(subtopic.context)
                        .with_priority(priority)
                })
                .collect()
        } else {
            vec![TaskSpec::new(task_id(0), WEB_SEARCH_TASK, topic)
                .with_description(format!("Comprehensive research on {}", topic))
                .with_context(enhanced_context)
                .with_priority(Priority::High)]
        };

        tracing::info!("Planned {} research tasks for '{}'", tasks.len(), topic);
        Ok(tasks)
    }

    /// Group tasks by type, preserving the order in which types first appear.
    pub fn group_tasks_by_type(tasks: Vec<TaskSpec>) -> Vec<(String, Vec<TaskSpec>)> {
        let mut groups: Vec<(String, Vec<TaskSpec>)> = Vec::new();
        for task in tasks {
            match groups.iter_mut().find(|(t, _)| *t == task.task_type) {
                Some((_, group)) => group.push(task),
                None => groups.push((task.task_type.clone(), vec![task])),
            }
        }
        groups
    }

    /// Run every task on a capable agent.
    ///
    /// Groups with no capable agent are skipped and produce no results, so the
    /// returned list can be shorter than `tasks`. Results come back group by
    /// group, each group in submission order.
    pub async fn delegate_tasks(&self, tasks: Vec<TaskSpec>) -> Vec<TaskResult> {
        if tasks.is_empty() {
            return Vec::new();
        }

        let gate = Arc::new(Semaphore::new(self.max_parallel_tasks()));
        let mut results = Vec::with_capacity(tasks.len());

        for (task_type, group) in Self::group_tasks_by_type(tasks) {
            let capable: Vec<Arc<dyn WorkerAgent>> = self
                .agents
                .iter()
                .filter(|agent| agent.can_handle_task(&task_type))
                .cloned()
                .collect();

            if capable.is_empty() {
                tracing::warn!(
                    "No agents available for task type '{}', skipping {} tasks",
                    task_type,
                    group.len()
                );
                continue;
            }

            results.extend(execute_tasks_parallel(group, &capable, &gate).await);
        }

        tracing::info!(
            agents = self.agents.len(),
            results = results.len(),
            "Delegation finished"
        );
        results
    }

    pub fn research_summary(&self) -> ResearchSummary {
        ResearchSummary {
            total_agents: self.agents.len(),
            agent_capabilities: self
                .agents
                .iter()
                .map(|agent| AgentCapabilities {
                    agent_id: agent.agent_id().to_string(),
                    capabilities: agent.capabilities().iter().map(|c| c.to_string()).collect(),
                })
                .collect(),
            max_parallel_tasks: self.max_parallel_tasks(),
        }
    }
}

/// Spawn one tokio task per research task, assigning agents round robin. Each
/// execution holds a gate permit while it runs. Errors and panics become
/// failed results attributed to the agent.
async fn execute_tasks_parallel(
    tasks: Vec<TaskSpec>,
    agents: &[Arc<dyn WorkerAgent>],
    gate: &Arc<Semaphore>,
) -> Vec<TaskResult> {
    let handles: Vec<_> = tasks
        .into_iter()
        .enumerate()
        .map(|(i, task)| {
            let agent = Arc::clone(&agents[i % agents.len()]);
            let gate = Arc::clone(gate);
            let agent_id = agent.agent_id().to_string();
            let description = if task.description.is_empty() {
                "Failed task".to_string()
            } else {
                task.description.clone()
            };

            let handle = tokio::spawn(async move {
                let _permit = gate
                    .acquire_owned()
                    .await
                    .map_err(|e| AppError::Internal(format!("Admission gate closed: {}", e)))?;
                tracing::info!(
                    agent = agent.agent_id(),
                    task_id = %task.task_id,
                    "Executing: {}",
                    task.description
                );
                agent.execute_task(&task).await
            });

            (agent_id, description, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (agent_id, description, handle) in handles {
        let result = match handle.await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::warn!(agent = %agent_id, "Task failed: {}", e);
                TaskResult::failed(agent_id, description, format!("Task failed with error: {}", e))
            }
            Err(e) => {
                tracing::error!(agent = %agent_id, "Task aborted: {}", e);
                TaskResult::failed(agent_id, description, format!("Task failed with error: {}", e))
            }
        };
        results.push(result);
    }
    results
}

#[async_trait]
impl WorkerAgent for ResearchCoordinator {
    fn agent_id(&self) -> &str {
        COORDINATOR_ID
    }

    fn capabilities(&self) -> &[&'static str] {
        &COORDINATOR_CAPABILITIES
    }

    fn can_handle_task(&self, task_type: &str) -> bool {
        COORDINATOR_CAPABILITIES.contains(&task_type)
    }

    async fn execute_task(&self, task: &TaskSpec) -> Result<TaskResult> {
        if task.task_type != "coordinate_research" {
            return Ok(TaskResult::unsupported(
                COORDINATOR_ID,
                "Unsupported coordinator task",
                "Coordinator only handles coordination tasks",
            ));
        }

        let topic = match task.query.trim() {
            "" => "Unknown topic",
            query => query,
        };

        let follow_ups = self.generate_follow_up_questions(topic).await;
        let context = format!("{}\n\n{}", topic, follow_ups.message);
        let subtasks = self.plan_research(topic, Some(&context)).await?;
        let planned = subtasks.len();
        let results = self.delegate_tasks(subtasks).await;

        Ok(TaskResult::completed(
            COORDINATOR_ID,
            format!("Coordinated research on {}", topic),
            format!(
                "Coordinated research on '{}' with {} sub-tasks. Collected {} results from sub-agents.",
                topic,
                planned,
                results.len()
            ),
            Vec::new(),
            0.9,
        ))
    }
}

fn task_id(index: usize) -> String {
    format!("research_task_{}", index + 1)
}

fn fallback_follow_ups(topic: &str) -> FollowUpQuestions {
    let questions = vec![
        format!("What specific aspects of {} are you most interested in?", topic),
        format!(
            "Are there any time constraints or geographic focus for this research on {}?",
            topic
        ),
        "What is the primary goal or outcome you hope to achieve with this research?".to_string(),
    ];
    let message = format_follow_up_message(&questions, None);
    FollowUpQuestions { questions, message }
}

fn format_follow_up_message(questions: &[String], explanation: Option<&str>) -> String {
    let mut message = String::from(FOLLOW_UP_HEADER);
    for (i, question) in questions.iter().enumerate() {
        message.push_str(&format!("{}. {}\n", i + 1, question));
    }
    if let Some(explanation) = explanation {
        message.push('\n');
        message.push_str(explanation);
    }
    message
}

fn fallback_subtopic(topic: &str) -> Subtopic {
    Subtopic {
        query: topic.to_string(),
        description: format!("Research on {}", topic),
        context: "comprehensive overview".to_string(),
        priority: Some("high".to_string()),
        rationale: "Fallback single topic due to LLM error".to_string(),
    }
}
