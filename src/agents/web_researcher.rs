//! Web research worker
//!
//! Pipeline for one task, each stage degrading into the next:
//! 1. search (configured provider, else simulated placeholder hits)
//! 2. bounded-concurrency page extraction with a per-fetch timeout
//! 3. relevance scoring and ranking
//! 4. LLM synthesis of the top sources, with a deterministic fallback
//! 5. reliable-source filtering and confidence scoring

use crate::agents::WorkerAgent;
use crate::llm::{ChatRequest, LLMClient};
use crate::tools::fetch::{HttpPageFetcher, PageFetcher, MIN_CONTENT_CHARS};
use crate::tools::search::{
    simulated_results, DuckDuckGoSearch, GoogleSearch, SearchHit, SearchProvider,
    MAX_GOOGLE_RESULTS,
};
use crate::types::{Result, TaskResult, TaskSpec};
use crate::utils::text::truncate_chars;
use crate::utils::toml_config::{ResearcherConfig, SearchConfig, SearchProviderKind};
use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

pub const WEB_RESEARCHER_ID: &str = "web_researcher";

const CAPABILITIES: [&str; 3] = ["web_search", "content_extraction", "fact_checking"];
const HANDLED_TASK_TYPES: [&str; 3] = ["web_search", "fact_checking", "current_events"];

const TRUSTED_DOMAIN_MARKERS: [&str; 3] = [".edu", ".gov", ".org"];
const NEWS_DOMAIN_MARKERS: [&str; 4] = ["bbc", "reuters", "cnn", "nytimes"];

/// Sources above this relevance are reported on the result.
const RELIABLE_RELEVANCE: f64 = 0.1;

const SYNTHESIS_SOURCES: usize = 3;
const SYNTHESIS_EXCERPT_CHARS: usize = 1000;
const FALLBACK_SOURCES: usize = 2;
const FALLBACK_EXCERPT_CHARS: usize = 200;

const SYNTHESIS_SYSTEM_PROMPT: &str = "You are an expert research analyst who synthesizes \
information from multiple sources into focused, accurate insights.";

/// One page that survived extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSource {
    pub url: String,
    pub title: String,
    pub domain: String,
    pub content: String,
    pub snippet: String,
    pub relevance_score: f64,
}

impl ExtractedSource {
    pub fn new(hit: &SearchHit, content: String) -> Self {
        let relevance_score = relevance_score(&hit.domain, &hit.title, &content);
        Self {
            url: hit.url.clone(),
            title: hit.title.clone(),
            domain: hit.domain.clone(),
            content,
            snippet: hit.snippet.clone(),
            relevance_score,
        }
    }
}

pub struct WebResearcher {
    agent_id: String,
    llm: Arc<dyn LLMClient>,
    search: Option<Arc<dyn SearchProvider>>,
    fetcher: Arc<dyn PageFetcher>,
    config: ResearcherConfig,
    num_results: usize,
}

impl WebResearcher {
    /// Researcher with no search provider; every task uses simulated hits
    /// until [`with_search`](Self::with_search) is called.
    pub fn new(
        llm: Arc<dyn LLMClient>,
        fetcher: Arc<dyn PageFetcher>,
        config: ResearcherConfig,
    ) -> Self {
        Self {
            agent_id: WEB_RESEARCHER_ID.to_string(),
            llm,
            search: None,
            fetcher,
            config,
            num_results: MAX_GOOGLE_RESULTS,
        }
    }

    /// Build a researcher with the HTTP fetcher and the search backend named
    /// in configuration. Google without both credentials means simulated hits.
    pub fn from_config(
        llm: Arc<dyn LLMClient>,
        researcher: &ResearcherConfig,
        search: &SearchConfig,
    ) -> Result<Self> {
        let fetcher = HttpPageFetcher::new(researcher.fetch_timeout(), researcher.max_content_chars)?;
        let mut agent = Self::new(llm, Arc::new(fetcher), researcher.clone())
            .with_num_results(search.num_results);

        agent.search = match search.provider {
            SearchProviderKind::Google => match search.google_credentials() {
                Some((api_key, engine_id)) => {
                    Some(Arc::new(GoogleSearch::new(api_key, engine_id)) as Arc<dyn SearchProvider>)
                }
                None => {
                    info!("Google search credentials not configured, using simulated results");
                    None
                }
            },
            SearchProviderKind::DuckDuckGo => Some(Arc::new(DuckDuckGoSearch::new())),
            SearchProviderKind::Simulated => None,
        };

        Ok(agent)
    }

    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SearchProvider>) -> Self {
        self.search = Some(search);
        self
    }

    /// Results requested per search, capped at 10.
    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results.clamp(1, MAX_GOOGLE_RESULTS);
        self
    }

    /// Search with the configured provider, falling back to simulated hits on
    /// error or an empty result set.
    pub async fn perform_web_search(&self, query: &str) -> Vec<SearchHit> {
        if let Some(provider) = &self.search {
            match provider.search(query, self.num_results).await {
                Ok(hits) if !hits.is_empty() => {
                    info!("Got {} results from {}", hits.len(), provider.name());
                    return hits;
                }
                Ok(_) => warn!("{} returned no results for '{}'", provider.name(), query),
                Err(e) => warn!("{} search failed: {}", provider.name(), e),
            }
        }

        info!("Using simulated search results for '{}'", query);
        simulated_results(query)
    }

    /// Fetch up to `max_sources` hits with at most `fetch_concurrency` in
    /// flight. Failed, timed-out and too-short pages are dropped. The result is
    /// sorted by relevance, highest first.
    pub async fn extract_content(&self, hits: &[SearchHit]) -> Vec<ExtractedSource> {
        if hits.is_empty() {
            warn!("No search results to extract content from");
            return Vec::new();
        }

        let gate = Semaphore::new(self.config.fetch_concurrency.max(1));
        let gate = &gate;
        let timeout = self.config.fetch_timeout();

        let fetches = hits.iter().take(self.config.max_sources).map(|hit| async move {
            let _permit = gate.acquire().await.ok()?;
            match tokio::time::timeout(timeout, self.fetcher.fetch_text(&hit.url)).await {
                Ok(Ok(content)) if content.chars().count() >= MIN_CONTENT_CHARS => {
                    Some(ExtractedSource::new(hit, content))
                }
                Ok(Ok(_)) => {
                    debug!("Too little content at {}", hit.url);
                    None
                }
                Ok(Err(e)) => {
                    debug!("Failed to extract from {}: {}", hit.url, e);
                    None
                }
                Err(_) => {
                    debug!("Timed out fetching {}", hit.url);
                    None
                }
            }
        });

        let mut sources: Vec<ExtractedSource> =
            join_all(fetches).await.into_iter().flatten().collect();
        sources.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        info!(
            "Extracted content from {} of {} sources",
            sources.len(),
            hits.len().min(self.config.max_sources)
        );
        sources
    }

    /// Ask the LLM to synthesize the top sources into findings.
    pub async fn synthesize_findings(
        &self,
        query: &str,
        description: &str,
        context: &str,
        sources: &[ExtractedSource],
    ) -> String {
        if sources.is_empty() {
            return format!(
                "Unable to find substantial information about '{}'. No reliable sources were accessible.",
                query
            );
        }

        let prompt = format!(
            r#"Synthesize what the web sources below say about one research question.

Research Query: "{query}"
Research Description: "{description}"
Research Context: "{context}"

Extracted sources:
{sources}

Provide:
1. A direct answer to the research question
2. Key findings and insights
3. Notable data points or statistics, if any
4. Differing perspectives, if present
5. Current trends or developments
6. Gaps or limitations in the available information

Stay on the research query, be objective, cite source domains for specific claims,
flag uncertainty, and keep it to roughly 300-500 words."#,
            sources = format_sources_for_synthesis(sources),
        );

        let request = ChatRequest::with_system(SYNTHESIS_SYSTEM_PROMPT, prompt)
            .model(self.config.model.clone())
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens);

        match self.llm.complete(request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Empty synthesis for '{}', using fallback summary", query);
                fallback_summary(query, sources)
            }
            Err(e) => {
                warn!("Synthesis failed for '{}': {}", query, e);
                fallback_summary(query, sources)
            }
        }
    }
}

#[async_trait]
impl WorkerAgent for WebResearcher {
    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    fn capabilities(&self) -> &[&'static str] {
        &CAPABILITIES
    }

    fn can_handle_task(&self, task_type: &str) -> bool {
        HANDLED_TASK_TYPES.contains(&task_type)
    }

    async fn execute_task(&self, task: &TaskSpec) -> Result<TaskResult> {
        let description = if task.description.trim().is_empty() {
            "No description provided"
        } else {
            task.description.as_str()
        };

        let query = task.query.trim();
        if query.is_empty() {
            return Ok(TaskResult::failed(
                &task.task_id,
                description,
                "No query provided for web search",
            ));
        }

        info!(task_id = %task.task_id, "Starting web research on: {}", query);

        let hits = self.perform_web_search(query).await;
        let sources = self.extract_content(&hits).await;
        let findings = self
            .synthesize_findings(query, description, &task.context, &sources)
            .await;
        let reliable = reliable_sources(&sources);
        let confidence = confidence_score(&sources, reliable.len());

        Ok(TaskResult::completed(
            &task.task_id,
            description,
            findings,
            reliable,
            confidence,
        ))
    }
}

/// Heuristic source quality in `[0, 1]` from domain trust, content length and
/// title length.
pub fn relevance_score(domain: &str, title: &str, content: &str) -> f64 {
    let mut score: f64 = 0.0;

    if TRUSTED_DOMAIN_MARKERS.iter().any(|m| domain.contains(m)) {
        score += 0.3;
    } else if NEWS_DOMAIN_MARKERS.iter().any(|m| domain.contains(m)) {
        score += 0.2;
    }

    let content_len = content.chars().count();
    if content_len > 1000 {
        score += 0.2;
    } else if content_len > 500 {
        score += 0.1;
    }

    if title.chars().count() > 10 {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

/// URLs of sources whose relevance exceeds the reliability threshold.
pub fn reliable_sources(sources: &[ExtractedSource]) -> Vec<String> {
    sources
        .iter()
        .filter(|s| s.relevance_score > RELIABLE_RELEVANCE)
        .map(|s| s.url.clone())
        .collect()
}

/// Source-count term (0.2 per reliable source, at most 0.6) plus 0.4 times
/// the mean relevance, capped at 0.95. Zero when nothing was extracted.
pub fn confidence_score(sources: &[ExtractedSource], reliable_count: usize) -> f64 {
    if sources.is_empty() {
        return 0.0;
    }

    let source_score = (reliable_count as f64 * 0.2).min(0.6);
    let mean_relevance =
        sources.iter().map(|s| s.relevance_score).sum::<f64>() / sources.len() as f64;

    (source_score + mean_relevance * 0.4).min(0.95)
}

fn format_sources_for_synthesis(sources: &[ExtractedSource]) -> String {
    sources
        .iter()
        .take(SYNTHESIS_SOURCES)
        .enumerate()
        .map(|(i, s)| {
            format!(
                "Source {} - {}:\nTitle: {}\nRelevance Score: {:.2}\nContent: {}...\n",
                i + 1,
                s.domain,
                s.title,
                s.relevance_score,
                truncate_chars(&s.content, SYNTHESIS_EXCERPT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Deterministic summary used when synthesis is unavailable.
pub fn fallback_summary(query: &str, sources: &[ExtractedSource]) -> String {
    let mut parts = vec![format!("Research findings for '{}':\n", query)];
    parts.extend(sources.iter().take(FALLBACK_SOURCES).enumerate().map(|(i, s)| {
        format!(
            "{}. From {}: {}...",
            i + 1,
            s.domain,
            truncate_chars(&s.content, FALLBACK_EXCERPT_CHARS)
        )
    }));
    parts.join("\n")
}
