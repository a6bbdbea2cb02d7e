//! Mock implementations for testing.
//!
//! Scripted, in-process stand-ins for every external seam of the research
//! pipeline: the LLM, search, page fetching, speech synthesis and worker
//! agents. Shared across the integration test files.

#![allow(dead_code)]

use ares_research::agents::WorkerAgent;
use ares_research::llm::{ChatRequest, LLMClient};
use ares_research::tools::{HitOrigin, PageFetcher, SearchHit, SearchProvider, SpeechSynthesizer};
use ares_research::types::{AppError, Result, TaskResult, TaskSpec};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Marker found in the follow-up question prompt.
pub const FOLLOW_UP_PROMPT: &str = "follow-up questions that would help";
/// Marker found in the complexity analysis prompt.
pub const COMPLEXITY_PROMPT: &str = "Analyze this research topic for complexity";
/// Marker found in the sub-topic generation prompt.
pub const SUBTOPIC_PROMPT: &str = "focused research sub-topics";
/// Marker found in the per-task synthesis prompt.
pub const SYNTHESIS_PROMPT: &str = "Synthesize what the web sources below say";
/// Marker found in the final report prompt.
pub const REPORT_PROMPT: &str = "Write a comprehensive research report";
/// Marker found in the narration script prompt.
pub const SCRIPT_PROMPT: &str = "into a podcast script";

/// Mock LLM client answering by prompt substring.
///
/// Rules are checked in insertion order against the user content of each
/// request; the first match wins. Unmatched requests get the default reply,
/// or an error when no default is set.
///
/// ```ignore
/// let llm = MockLLMClient::new()
///     .on(COMPLEXITY_PROMPT, r#"{"is_complex": false}"#)
///     .with_default("Generic answer");
/// ```
#[derive(Default)]
pub struct MockLLMClient {
    rules: Vec<(String, String)>,
    default: Option<String>,
    should_fail: bool,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockLLMClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    pub fn on(mut self, marker: &str, reply: &str) -> Self {
        self.rules.push((marker.to_string(), reply.to_string()));
        self
    }

    pub fn with_default(mut self, reply: &str) -> Self {
        self.default = Some(reply.to_string());
        self
    }

    /// Every request seen so far, in call order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests whose user content contains `marker`.
    pub fn calls_matching(&self, marker: &str) -> usize {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.user_content().contains(marker))
            .count()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn complete(&self, request: ChatRequest) -> Result<String> {
        let content = request.user_content();
        self.requests.lock().push(request);

        if self.should_fail {
            return Err(AppError::LLM("Mock LLM failure".to_string()));
        }

        self.rules
            .iter()
            .find(|(marker, _)| content.contains(marker.as_str()))
            .map(|(_, reply)| reply.clone())
            .or_else(|| self.default.clone())
            .ok_or_else(|| AppError::LLM("No scripted reply".to_string()))
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock search provider returning fixed hits, or failing.
pub struct MockSearch {
    hits: Vec<SearchHit>,
    should_fail: bool,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            should_fail: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    fn name(&self) -> &str {
        "mock-search"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.queries.lock().push(query.to_string());
        if self.should_fail {
            return Err(AppError::Search("Mock search failure".to_string()));
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }
}

/// Build a search hit on `domain`.
pub fn hit(domain: &str, title: &str) -> SearchHit {
    SearchHit {
        title: title.to_string(),
        url: format!("https://{}/article", domain),
        snippet: format!("Snippet from {}", domain),
        domain: domain.to_string(),
        origin: HitOrigin::Google,
    }
}

/// Mock page fetcher serving pages by URL.
///
/// Unknown URLs fail. Tracks the peak number of concurrent fetches.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, text: &str) -> Self {
        self.pages.insert(url.to_string(), text.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let page = self.pages.get(url).cloned();

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        page.ok_or_else(|| AppError::Fetch(format!("{} unreachable", url)))
    }
}

/// Mock speech synthesizer returning the input bytes, optionally failing on
/// selected calls (1-based).
#[derive(Default)]
pub struct MockSpeech {
    fail_calls: Vec<usize>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockSpeech {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(calls: &[usize]) -> Self {
        Self {
            fail_calls: calls.to_vec(),
            ..Self::default()
        }
    }

    /// `(text, voice)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSpeech {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        let call = {
            let mut calls = self.calls.lock();
            calls.push((text.to_string(), voice.to_string()));
            calls.len()
        };
        if self.fail_calls.contains(&call) {
            return Err(AppError::Speech("Mock speech failure".to_string()));
        }
        Ok(text.as_bytes().to_vec())
    }
}

/// How a [`MockAgent`] responds to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentBehavior {
    Succeed,
    Fail,
    Panic,
}

/// Mock worker agent with configurable task types and behavior.
///
/// Records executed task ids and the peak number of concurrent executions.
pub struct MockAgent {
    id: String,
    task_types: Vec<String>,
    behavior: AgentBehavior,
    delay: Option<Duration>,
    failing_tasks: Vec<String>,
    executed: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl MockAgent {
    pub fn new(id: &str, task_types: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            task_types: task_types.iter().map(|t| t.to_string()).collect(),
            behavior: AgentBehavior::Succeed,
            delay: None,
            failing_tasks: Vec::new(),
            executed: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn with_behavior(mut self, behavior: AgentBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Apply the configured failure behavior only to these task ids.
    pub fn failing_for(mut self, task_ids: &[&str]) -> Self {
        self.failing_tasks = task_ids.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl WorkerAgent for MockAgent {
    fn agent_id(&self) -> &str {
        &self.id
    }

    fn capabilities(&self) -> &[&'static str] {
        &["mock"]
    }

    fn can_handle_task(&self, task_type: &str) -> bool {
        self.task_types.iter().any(|t| t == task_type)
    }

    async fn execute_task(&self, task: &TaskSpec) -> Result<TaskResult> {
        self.executed.lock().push(task.task_id.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let targeted = self.failing_tasks.is_empty() || self.failing_tasks.contains(&task.task_id);
        match self.behavior {
            AgentBehavior::Fail if targeted => {
                Err(AppError::Internal(format!("{} exploded", task.task_id)))
            }
            AgentBehavior::Panic if targeted => panic!("{} panicked", task.task_id),
            _ => Ok(TaskResult::completed(
                &task.task_id,
                &task.description,
                format!("{} handled {}", self.id, task.query),
                vec![format!("https://{}.example.org/{}", self.id, task.task_id)],
                0.8,
            )),
        }
    }
}

/// A research-sized text that passes the minimum content filter.
pub fn article_text(subject: &str, chars: usize) -> String {
    let sentence = format!("Findings about {} from a detailed study. ", subject);
    sentence.repeat(chars / sentence.len() + 1)[..chars].to_string()
}
