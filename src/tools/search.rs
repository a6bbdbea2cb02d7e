//! Web search providers
//!
//! The researcher asks a [`SearchProvider`] for candidate pages. Two real
//! backends are available:
//! - **Google** Custom Search JSON API (needs an API key and engine id)
//! - **DuckDuckGo** through the daedra crate (no credentials)
//!
//! When neither is usable, [`simulated_results`] produces deterministic
//! placeholder hits so the pipeline still runs end to end.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Google Custom Search never returns more than this per request.
pub const MAX_GOOGLE_RESULTS: usize = 10;

const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Where a hit came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitOrigin {
    Google,
    DuckDuckGo,
    Simulated,
}

/// One search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub domain: String,
    pub origin: HitOrigin,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

// ============= Google Custom Search =============

#[derive(Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    items: Vec<GoogleItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
    display_link: Option<String>,
}

pub struct GoogleSearch {
    http: reqwest::Client,
    api_key: String,
    engine_id: String,
    endpoint: String,
}

impl GoogleSearch {
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            engine_id: engine_id.into(),
            endpoint: GOOGLE_SEARCH_URL.to_string(),
        }
    }

    /// Point requests at a different endpoint (used against a local mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    fn name(&self) -> &str {
        "google"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let num = max_results.clamp(1, MAX_GOOGLE_RESULTS).to_string();
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
                ("safe", "active"),
                ("fields", "items(title,link,snippet,displayLink)"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Google search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::Search(format!(
                "Google search API error {}: {}",
                status, text
            )));
        }

        let body: GoogleResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Invalid Google search response: {}", e)))?;

        let hits: Vec<SearchHit> = body
            .items
            .into_iter()
            .filter_map(|item| {
                let url = item.link.filter(|link| is_http_url(link))?;
                let domain = item
                    .display_link
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| extract_domain(&url));
                Some(SearchHit {
                    title: item.title.unwrap_or_else(|| "No title".to_string()),
                    snippet: item
                        .snippet
                        .unwrap_or_else(|| "No snippet available".to_string()),
                    url,
                    domain,
                    origin: HitOrigin::Google,
                })
            })
            .take(max_results)
            .collect();

        debug!("Google returned {} usable results for '{}'", hits.len(), query);
        Ok(hits)
    }
}

// ============= DuckDuckGo (daedra) =============

#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDuckGoSearch;

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: max_results,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| AppError::Search(format!("DuckDuckGo search failed: {}", e)))?;

        Ok(response
            .data
            .iter()
            .filter(|r| is_http_url(&r.url))
            .take(max_results)
            .map(|r| SearchHit {
                title: r.title.clone(),
                url: r.url.clone(),
                snippet: r.description.clone(),
                domain: extract_domain(&r.url),
                origin: HitOrigin::DuckDuckGo,
            })
            .collect())
    }
}

// ============= Simulated =============

/// Deterministic placeholder hits for a query.
pub fn simulated_results(query: &str) -> Vec<SearchHit> {
    vec![
        SearchHit {
            title: format!("Research on {}", query),
            url: format!("https://example.com/research/{}", query.replace(' ', "-")),
            snippet: format!("Comprehensive information about {}", query),
            domain: "example.com".to_string(),
            origin: HitOrigin::Simulated,
        },
        SearchHit {
            title: format!("{} - Academic Study", query),
            url: format!("https://academic.edu/study/{}", query.replace(' ', "_")),
            snippet: format!("Academic research on {}", query),
            domain: "academic.edu".to_string(),
            origin: HitOrigin::Simulated,
        },
    ]
}

/// Provider that always answers with [`simulated_results`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedSearch;

#[async_trait]
impl SearchProvider for SimulatedSearch {
    fn name(&self) -> &str {
        "simulated"
    }

    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        Ok(simulated_results(query)
            .into_iter()
            .take(max_results)
            .collect())
    }
}

// ============= Helpers =============

pub fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Lowercased host of a URL, or `"unknown-domain"` when it has none.
pub fn extract_domain(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| "unknown-domain".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_simulated_results_shape() {
        let hits = simulated_results("quantum computing");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url, "https://example.com/research/quantum-computing");
        assert_eq!(hits[0].title, "Research on quantum computing");
        assert_eq!(hits[0].domain, "example.com");
        assert_eq!(hits[1].url, "https://academic.edu/study/quantum_computing");
        assert_eq!(hits[1].title, "quantum computing - Academic Study");
        assert_eq!(hits[1].snippet, "Academic research on quantum computing");
        assert!(hits.iter().all(|h| h.origin == HitOrigin::Simulated));
    }

    #[rstest]
    #[case("https://www.bbc.co.uk/news/1", "www.bbc.co.uk")]
    #[case("http://Example.org:8080/a?b=c", "example.org")]
    #[case("https://user@host.gov#frag", "host.gov")]
    #[case("http://[2001:db8::1]/page", "[2001:db8::1]")]
    #[case("https://example.com\\evil/path", "example.com")]
    #[case("https://a.com%2Fb/x", "unknown-domain")]
    #[case("mailto:someone@example.com", "unknown-domain")]
    #[case("not a url", "unknown-domain")]
    fn test_extract_domain(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(extract_domain(url), expected);
    }

    #[test]
    fn test_is_http_url() {
        assert!(is_http_url("https://a.com"));
        assert!(is_http_url("http://a.com"));
        assert!(!is_http_url("ftp://a.com"));
        assert!(!is_http_url("javascript:void(0)"));
    }

    #[tokio::test]
    async fn test_simulated_provider_respects_limit() {
        let hits = SimulatedSearch.search("solar", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].domain, "example.com");
    }
}
