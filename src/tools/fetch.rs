//! Page fetching and main-text extraction
//!
//! Pages are downloaded with reqwest and parsed with scraper. The first of
//! `article`, `main`, `.content`, `.article-body` or `body` that exists is
//! treated as the content root; text inside `script`, `style`, `nav`,
//! `header` and `footer` is skipped.

use crate::types::{AppError, Result};
use async_trait::async_trait;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const CONTENT_SELECTORS: [&str; 5] = ["article", "main", ".content", ".article-body", "body"];
const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "nav", "header", "footer"];

/// Extracted text shorter than this is discarded by the researcher.
pub const MIN_CONTENT_CHARS: usize = 100;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

static BOILERPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(cookie policy|privacy policy|terms of service|subscribe to|follow us)\W*")
        .expect("valid regex")
});

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Download `url` and return its cleaned main text. Callers drop results
    /// shorter than [`MIN_CONTENT_CHARS`].
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

pub struct HttpPageFetcher {
    http: reqwest::Client,
    max_chars: usize,
}

impl HttpPageFetcher {
    pub fn new(timeout: Duration, max_chars: usize) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Fetch(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, max_chars })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::Fetch(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Fetch(format!("{} returned status {}", url, status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::Fetch(format!("Failed to read body of {}: {}", url, e)))?;

        Ok(extract_page_text(&html, self.max_chars))
    }
}

/// Extract, clean and truncate the main text of an HTML document.
pub fn extract_page_text(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let Some(root) = CONTENT_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document.select(&selector).next()
    }) else {
        return String::new();
    };

    let mut fragments = Vec::new();
    collect_text(root, &mut fragments);
    clean_extracted_content(&fragments.join(" "), max_chars)
}

fn collect_text(element: ElementRef<'_>, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Node::Element(el) if !SKIPPED_ELEMENTS.contains(&el.name()) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

/// Collapse whitespace, drop common boilerplate phrases and truncate to
/// `max_chars` characters.
pub fn clean_extracted_content(text: &str, max_chars: usize) -> String {
    let without_boilerplate = BOILERPLATE.replace_all(text, "");
    let collapsed = WHITESPACE.replace_all(&without_boilerplate, " ");
    collapsed.trim().chars().take(max_chars).collect()
}
