//! Integration tests for research planning and delegation.

mod common;

use ares_research::agents::{WebResearcher, WorkerAgent};
use ares_research::research::{ResearchCoordinator, COORDINATOR_ID};
use ares_research::types::{AppError, Priority, TaskSpec, TaskStatus};
use ares_research::utils::toml_config::{CoordinatorConfig, ResearcherConfig};
use common::mocks::{
    article_text, AgentBehavior, MockAgent, MockFetcher, MockLLMClient, MockSearch,
    COMPLEXITY_PROMPT, FOLLOW_UP_PROMPT, SUBTOPIC_PROMPT,
};
use std::sync::Arc;
use std::time::Duration;

const SIMPLE_ASSESSMENT: &str = r#"{
    "is_complex": false,
    "main_aspects": ["overview"],
    "recommended_subtopics": 1,
    "research_approach": "descriptive",
    "reasoning": "Narrow topic"
}"#;

const COMPLEX_ASSESSMENT: &str = r#"```json
{
    "is_complex": true,
    "main_aspects": ["chemistry", "manufacturing"],
    "recommended_subtopics": 3,
    "research_approach": "analytical",
    "reasoning": "Several distinct dimensions"
}
```"#;

const SUBTOPICS: &str = r#"{
    "subtopics": [
        {
            "query": "solid-state electrolyte chemistry",
            "description": "Electrolyte materials",
            "context": "materials science",
            "priority": "high",
            "rationale": "Core technology"
        },
        {
            "query": "   ",
            "description": "Blank query is dropped"
        },
        {
            "query": "solid-state battery manufacturing cost",
            "description": "Manufacturing economics",
            "context": "industry",
            "priority": "low",
            "rationale": "Adoption barrier"
        }
    ]
}"#;

const FOLLOW_UPS: &str = r#"{
    "questions": ["Which market?", "  ", "Which timeframe?"],
    "explanation": "Scope narrows the search."
}"#;

fn coordinator(llm: MockLLMClient) -> ResearchCoordinator {
    ResearchCoordinator::new(Arc::new(llm), CoordinatorConfig::default())
}

fn tasks(specs: &[(&str, &str)]) -> Vec<TaskSpec> {
    specs
        .iter()
        .map(|(id, task_type)| {
            TaskSpec::new(*id, *task_type, format!("query {}", id))
                .with_description(format!("Task {}", id))
        })
        .collect()
}

// =============================================================================
// Planning
// =============================================================================

#[tokio::test]
async fn test_simple_topic_plans_single_task() {
    let llm = Arc::new(
        MockLLMClient::new()
            .on(FOLLOW_UP_PROMPT, FOLLOW_UPS)
            .on(COMPLEXITY_PROMPT, SIMPLE_ASSESSMENT),
    );
    let coordinator = ResearchCoordinator::new(llm.clone(), CoordinatorConfig::default());

    let plan = coordinator.plan_research("Solar power", None).await.unwrap();

    assert_eq!(plan.len(), 1);
    let task = &plan[0];
    assert_eq!(task.task_id, "research_task_1");
    assert_eq!(task.task_type, "web_search");
    assert_eq!(task.query, "Solar power");
    assert_eq!(task.description, "Comprehensive research on Solar power");
    assert_eq!(task.priority, Priority::High);
    assert!(task
        .context
        .contains("Additional context/questions to consider:"));
    assert!(task.context.contains("1. Which market?"));
    assert_eq!(llm.calls_matching(FOLLOW_UP_PROMPT), 1);
}

#[tokio::test]
async fn test_complex_topic_plans_one_task_per_subtopic() {
    let llm = Arc::new(
        MockLLMClient::new()
            .on(COMPLEXITY_PROMPT, COMPLEX_ASSESSMENT)
            .on(SUBTOPIC_PROMPT, SUBTOPICS),
    );
    let coordinator = ResearchCoordinator::new(llm.clone(), CoordinatorConfig::default());

    let plan = coordinator
        .plan_research("Solid-state batteries", Some("Focus on EVs"))
        .await
        .unwrap();

    let ids: Vec<_> = plan.iter().map(|t| t.task_id.as_str()).collect();
    assert_eq!(ids, vec!["research_task_1", "research_task_2"]);
    assert_eq!(plan[0].query, "solid-state electrolyte chemistry");
    assert_eq!(plan[0].priority, Priority::High);
    assert_eq!(plan[1].description, "Manufacturing economics");
    assert_eq!(plan[1].priority, Priority::Low);
    assert!(plan.iter().all(|t| t.task_type == "web_search"));

    // Supplied context replaces the follow-up round
    assert_eq!(llm.calls_matching(FOLLOW_UP_PROMPT), 0);
    let subtopic_prompt = llm
        .requests()
        .into_iter()
        .map(|r| r.user_content())
        .find(|c| c.contains(SUBTOPIC_PROMPT))
        .unwrap();
    assert!(subtopic_prompt.contains("Create 3 focused research sub-topics"));
    assert!(subtopic_prompt.contains("Focus on EVs"));
}

#[tokio::test]
async fn test_failing_provider_falls_back_at_every_step() {
    let coordinator = coordinator(MockLLMClient::failing());

    // Two words: heuristic says simple
    let plan = coordinator.plan_research("topic X", None).await.unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].description, "Comprehensive research on topic X");
    assert!(plan[0].context.contains(
        "What specific aspects of topic X are you most interested in?"
    ));

    // More than three words: heuristic says complex, sub-topics fall back
    let topic = "Impact of quantum computing on cryptography";
    let plan = coordinator.plan_research(topic, None).await.unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].query, topic);
    assert_eq!(plan[0].description, format!("Research on {}", topic));
    assert_eq!(plan[0].context, "comprehensive overview");
    assert_eq!(plan[0].priority, Priority::High);
}

#[tokio::test]
async fn test_fallback_follow_up_questions() {
    let coordinator = coordinator(MockLLMClient::new().on(FOLLOW_UP_PROMPT, "not json"));

    let follow_ups = coordinator.generate_follow_up_questions("topic X").await;

    assert_eq!(follow_ups.questions.len(), 3);
    assert!(follow_ups.questions[0].contains("topic X"));
    assert!(follow_ups.questions[1].contains("topic X"));
    assert!(follow_ups
        .message
        .starts_with("To better focus the research, please consider these follow-up questions:"));
}

#[tokio::test]
async fn test_follow_up_questions_drop_blank_entries() {
    let coordinator = coordinator(MockLLMClient::new().on(FOLLOW_UP_PROMPT, FOLLOW_UPS));

    let follow_ups = coordinator.generate_follow_up_questions("EV adoption").await;

    assert_eq!(follow_ups.questions, vec!["Which market?", "Which timeframe?"]);
    assert!(follow_ups.message.contains("2. Which timeframe?\n"));
    assert!(follow_ups.message.ends_with("Scope narrows the search."));
}

#[tokio::test]
async fn test_out_of_range_subtopic_count_is_clamped() {
    let assessment = r#"{"is_complex": true, "recommended_subtopics": 50}"#;
    let coordinator = coordinator(MockLLMClient::new().on(COMPLEXITY_PROMPT, assessment));

    let result = coordinator.analyze_topic_complexity("Ocean acidification", "").await;

    assert!(result.is_complex);
    assert_eq!(result.recommended_subtopics, 10);
    assert_eq!(result.research_approach, "comprehensive");
}

#[tokio::test]
async fn test_blank_topic_is_rejected() {
    let coordinator = coordinator(MockLLMClient::new());

    let result = coordinator.plan_research("   ", None).await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

// =============================================================================
// Delegation
// =============================================================================

#[tokio::test]
async fn test_uncovered_task_type_produces_no_results() {
    let agent = MockAgent::new("searcher", &["web_search"]).shared();
    let coordinator = coordinator(MockLLMClient::new()).with_agent(agent.clone());

    let results = coordinator
        .delegate_tasks(tasks(&[
            ("t1", "web_search"),
            ("t2", "translate"),
            ("t3", "web_search"),
        ]))
        .await;

    let ids: Vec<_> = results.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t3"]);
    assert!(results.iter().all(|r| r.status == TaskStatus::Completed));
}

#[tokio::test]
async fn test_delegate_empty_list() {
    let agent = MockAgent::new("searcher", &["web_search"]).shared();
    let coordinator = coordinator(MockLLMClient::new()).with_agent(agent.clone());

    assert!(coordinator.delegate_tasks(Vec::new()).await.is_empty());
    assert!(agent.executed().is_empty());
}

#[tokio::test]
async fn test_agent_error_is_isolated_to_its_task() {
    let agent = MockAgent::new("flaky", &["web_search"])
        .with_behavior(AgentBehavior::Fail)
        .failing_for(&["t2"])
        .shared();
    let coordinator = coordinator(MockLLMClient::new()).with_agent(agent.clone());

    let results = coordinator
        .delegate_tasks(tasks(&[
            ("t1", "web_search"),
            ("t2", "web_search"),
            ("t3", "web_search"),
        ]))
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].task_id, "t1");
    assert_eq!(results[2].task_id, "t3");

    let failed = &results[1];
    assert_eq!(failed.status, TaskStatus::Failed);
    assert_eq!(failed.task_id, "flaky");
    assert_eq!(failed.task_description, "Task t2");
    assert!(failed.findings.starts_with("Task failed with error:"));
    assert!(failed.findings.contains("t2 exploded"));
    assert_eq!(failed.confidence_score, 0.0);
    assert!(failed.sources.is_empty());
}

#[tokio::test]
async fn test_agent_panic_is_isolated_to_its_task() {
    let agent = MockAgent::new("crashy", &["web_search"])
        .with_behavior(AgentBehavior::Panic)
        .failing_for(&["t1"])
        .shared();
    let coordinator = coordinator(MockLLMClient::new()).with_agent(agent.clone());

    let results = coordinator
        .delegate_tasks(tasks(&[("t1", "web_search"), ("t2", "web_search")]))
        .await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, TaskStatus::Failed);
    assert_eq!(results[0].task_id, "crashy");
    assert!(results[0].findings.starts_with("Task failed with error:"));
    assert_eq!(results[1].status, TaskStatus::Completed);
    assert_eq!(results[1].task_id, "t2");
}

#[tokio::test]
async fn test_failed_task_without_description() {
    let agent = MockAgent::new("flaky", &["web_search"])
        .with_behavior(AgentBehavior::Fail)
        .shared();
    let coordinator = coordinator(MockLLMClient::new()).with_agent(agent.clone());

    let results = coordinator
        .delegate_tasks(vec![TaskSpec::new("t1", "web_search", "query")])
        .await;

    assert_eq!(results[0].task_description, "Failed task");
}

#[tokio::test]
async fn test_tasks_assigned_round_robin() {
    let first = MockAgent::new("first", &["web_search"]).shared();
    let second = MockAgent::new("second", &["web_search"]).shared();
    let bystander = MockAgent::new("bystander", &["fact_checking"]).shared();
    let coordinator = coordinator(MockLLMClient::new())
        .with_agent(first.clone())
        .with_agent(bystander.clone())
        .with_agent(second.clone());

    let results = coordinator
        .delegate_tasks(tasks(&[
            ("t1", "web_search"),
            ("t2", "web_search"),
            ("t3", "web_search"),
            ("t4", "web_search"),
        ]))
        .await;

    assert_eq!(results.len(), 4);
    let mut by_first = first.executed();
    by_first.sort();
    let mut by_second = second.executed();
    by_second.sort();
    assert_eq!(by_first, vec!["t1", "t3"]);
    assert_eq!(by_second, vec!["t2", "t4"]);
    assert!(bystander.executed().is_empty());
}

#[tokio::test]
async fn test_results_follow_group_then_submission_order() {
    let agent = MockAgent::new("any", &["web_search", "fact_checking"]).shared();
    let coordinator = coordinator(MockLLMClient::new()).with_agent(agent.clone());

    let results = coordinator
        .delegate_tasks(tasks(&[
            ("a", "fact_checking"),
            ("b", "web_search"),
            ("c", "fact_checking"),
            ("d", "web_search"),
        ]))
        .await;

    let ids: Vec<_> = results.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "b", "d"]);
}

#[tokio::test]
async fn test_admission_gate_bounds_concurrency() {
    let agent = MockAgent::new("slow", &["web_search"])
        .with_delay(Duration::from_millis(40))
        .shared();
    let config = CoordinatorConfig {
        max_parallel_tasks: 2,
        ..CoordinatorConfig::default()
    };
    let coordinator = ResearchCoordinator::new(Arc::new(MockLLMClient::new()), config)
        .with_agent(agent.clone());

    let specs: Vec<(String, &str)> = (1..=6).map(|i| (format!("t{}", i), "web_search")).collect();
    let specs: Vec<(&str, &str)> = specs.iter().map(|(id, t)| (id.as_str(), *t)).collect();
    let results = coordinator.delegate_tasks(tasks(&specs)).await;

    assert_eq!(results.len(), 6);
    assert!(agent.peak_concurrency() <= 2);
    assert!(agent.peak_concurrency() >= 1);
}

// =============================================================================
// Coordinator as a worker
// =============================================================================

#[tokio::test]
async fn test_coordinate_research_task() {
    let agent = MockAgent::new("searcher", &["web_search"]).shared();
    let llm = MockLLMClient::new()
        .on(FOLLOW_UP_PROMPT, FOLLOW_UPS)
        .on(COMPLEXITY_PROMPT, SIMPLE_ASSESSMENT);
    let coordinator = coordinator(llm).with_agent(agent.clone());

    assert!(coordinator.can_handle_task("coordinate_research"));
    assert!(!coordinator.can_handle_task("web_search"));

    let result = coordinator
        .execute_task(&TaskSpec::new("c1", "coordinate_research", "Solar power"))
        .await
        .unwrap();

    assert_eq!(result.status, TaskStatus::Completed);
    assert_eq!(result.task_id, COORDINATOR_ID);
    assert_eq!(result.confidence_score, 0.9);
    assert_eq!(
        result.findings,
        "Coordinated research on 'Solar power' with 1 sub-tasks. Collected 1 results from sub-agents."
    );
    assert_eq!(agent.executed(), vec!["research_task_1"]);
}

#[tokio::test]
async fn test_other_coordinator_tasks_are_unsupported() {
    let coordinator = coordinator(MockLLMClient::new());

    let result = coordinator
        .execute_task(&TaskSpec::new("p1", "plan_research", "Solar power"))
        .await
        .unwrap();

    assert_eq!(result.status, TaskStatus::Unsupported);
    assert_eq!(result.confidence_score, 0.0);
}

#[tokio::test]
async fn test_delegation_survives_search_and_llm_outages() {
    let specs = tasks(&[
        ("t1", "web_search"),
        ("t2", "web_search"),
        ("t3", "web_search"),
    ]);
    let mut fetcher = MockFetcher::new();
    for spec in &specs {
        let url = format!("https://academic.edu/study/{}", spec.query.replace(' ', "_"));
        fetcher = fetcher.with_page(&url, &article_text(&spec.query, 1200));
    }
    let researcher = WebResearcher::new(
        Arc::new(MockLLMClient::failing()),
        Arc::new(fetcher),
        ResearcherConfig::default(),
    )
    .with_search(Arc::new(MockSearch::failing()));
    let coordinator =
        coordinator(MockLLMClient::failing()).with_agent(Arc::new(researcher));

    let results = coordinator.delegate_tasks(specs).await;

    assert_eq!(results.len(), 3);
    let ids: Vec<_> = results.iter().map(|r| r.task_id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "t3"]);
    for result in &results {
        assert!(!result.findings.trim().is_empty());
        assert!(matches!(
            result.status,
            TaskStatus::Completed | TaskStatus::Failed
        ));
        assert!(result
            .findings
            .contains(&format!("Research findings for 'query {}'", result.task_id)));
    }
}

#[tokio::test]
async fn test_research_summary() {
    let coordinator = coordinator(MockLLMClient::new())
        .with_agent(MockAgent::new("one", &["web_search"]).shared())
        .with_agent(MockAgent::new("two", &["fact_checking"]).shared());

    let summary = coordinator.research_summary();

    assert_eq!(summary.total_agents, 2);
    assert_eq!(summary.max_parallel_tasks, 10);
    assert_eq!(summary.agent_capabilities[1].agent_id, "two");
    assert_eq!(summary.agent_capabilities[1].capabilities, vec!["mock"]);
}
