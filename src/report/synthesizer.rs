use crate::llm::{ChatRequest, LLMClient};
use crate::tools::search::extract_domain;
use crate::types::TaskResult;
use crate::utils::text::truncate_chars;
use crate::utils::toml_config::ReportConfig;
use std::sync::Arc;

const REPORT_SYSTEM_PROMPT: &str = "You are an expert research analyst who synthesizes complex \
information into clear, actionable reports. You are thorough, objective, and evidence-based in \
your analysis.";

const DEFAULT_BRIEF: &str = "Provide a comprehensive analysis of the given topic.";

const MAX_LISTED_SOURCES: usize = 5;
const FALLBACK_LISTED_SOURCES: usize = 3;
const SUMMARY_FINDINGS: usize = 3;
const SUMMARY_EXCERPT_CHARS: usize = 100;

/// Turns task results into a final report.
pub struct ReportSynthesizer {
    llm: Arc<dyn LLMClient>,
    config: ReportConfig,
}

impl ReportSynthesizer {
    pub fn new(llm: Arc<dyn LLMClient>, config: ReportConfig) -> Self {
        Self { llm, config }
    }

    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    /// Produce the full report. Always ends with the metadata footer; an LLM
    /// failure yields the deterministic structured report instead.
    pub async fn generate_report(
        &self,
        topic: &str,
        results: &[TaskResult],
        brief: Option<&str>,
    ) -> String {
        if results.is_empty() {
            return empty_report(topic, brief);
        }

        let metrics = ReportMetrics::from_results(results);
        let prompt = format!(
            r#"Write a comprehensive research report.

RESEARCH TOPIC: "{topic}"

RESEARCH BRIEF: {brief}

RESEARCH FINDINGS FROM SUB-AGENTS:
{findings}

RESEARCH QUALITY METRICS:
- Average Confidence Score: {confidence:.2}/1.0
- Total Sources Consulted: {sources}
- Research Tasks Completed: {completed}/{total}

Structure the report as:
1. EXECUTIVE SUMMARY: two or three paragraphs covering the key findings
2. DETAILED ANALYSIS: synthesize the findings, address the brief, present differing perspectives, highlight data points and trends
3. KEY FINDINGS: the most important discoveries
4. IMPLICATIONS & RECOMMENDATIONS: what the findings mean and what to do next
5. RESEARCH LIMITATIONS: gaps, conflicting or thin information
6. SOURCES & METHODOLOGY: how the research was done and how reliable the sources are

Use clear headings, a professional tone and citations to source domains. Aim for 800-1200 words.
Base the analysis strictly on the findings above and say so explicitly where information is limited."#,
            brief = brief.filter(|b| !b.trim().is_empty()).unwrap_or(DEFAULT_BRIEF),
            findings = format_findings(results),
            confidence = metrics.average_confidence,
            sources = metrics.total_sources,
            completed = metrics.completed,
            total = metrics.total,
        );

        let request = ChatRequest::with_system(REPORT_SYSTEM_PROMPT, prompt)
            .model(self.config.model.clone())
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens);

        match self.llm.complete(request).await {
            Ok(text) if !text.trim().is_empty() => {
                tracing::info!("Report synthesized ({} chars)", text.len());
                format!("{}\n\n{}", text.trim_end(), metadata_footer(results))
            }
            Ok(_) => {
                tracing::warn!("Empty report from provider, using structured fallback");
                fallback_report(topic, results)
            }
            Err(e) => {
                tracing::warn!("Report synthesis failed, using structured fallback: {}", e);
                fallback_report(topic, results)
            }
        }
    }

    /// Short progress summary without any provider call.
    pub fn generate_quick_summary(&self, topic: &str, results: &[TaskResult]) -> String {
        quick_summary(topic, results)
    }
}

/// Aggregate metrics shown in prompts and footers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportMetrics {
    pub completed: usize,
    pub total: usize,
    pub total_sources: usize,
    pub average_confidence: f64,
}

impl ReportMetrics {
    pub fn from_results(results: &[TaskResult]) -> Self {
        Self {
            completed: results.iter().filter(|r| r.is_completed()).count(),
            total: results.len(),
            total_sources: results.iter().map(|r| r.sources.len()).sum(),
            average_confidence: average_confidence(results),
        }
    }
}

/// Mean confidence, ignoring non-finite scores. Zero for an empty slice.
pub fn average_confidence(results: &[TaskResult]) -> f64 {
    let scores: Vec<f64> = results
        .iter()
        .map(|r| r.confidence_score)
        .filter(|s| s.is_finite())
        .collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

pub fn metadata_footer(results: &[TaskResult]) -> String {
    let metrics = ReportMetrics::from_results(results);
    format!(
        "---\n**Research Metadata**\n\
         - Research Tasks Completed: {}/{}\n\
         - Total Sources Analyzed: {}\n\
         - Average Confidence Score: {:.2}/1.0\n\
         - Report Generated: {}\n",
        metrics.completed,
        metrics.total,
        metrics.total_sources,
        metrics.average_confidence,
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Report used when no task produced a result.
pub fn empty_report(topic: &str, brief: Option<&str>) -> String {
    format!(
        "# Research Report: {topic}\n\n\
         ## Executive Summary\n\
         Unfortunately, no research findings were available to analyze for the topic \"{topic}\".\n\n\
         ## Research Brief\n\
         {brief}\n\n\
         ## Status\n\
         The research process was unable to gather sufficient information to provide meaningful insights on this topic.\n\n\
         ## Recommendations\n\
         - Verify that research agents are configured for the planned task types\n\
         - Consider refining the research query or approach\n\
         - Check whether the topic needs specialized research methods\n\n\
         {footer}",
        brief = brief
            .filter(|b| !b.trim().is_empty())
            .unwrap_or("No specific research brief provided."),
        footer = metadata_footer(&[]),
    )
}

/// Deterministic report built from completed results only.
pub fn fallback_report(topic: &str, results: &[TaskResult]) -> String {
    let mut sections = vec![
        format!("# Research Report: {}\n", topic),
        "## Executive Summary".to_string(),
        format!(
            "This report presents research findings on '{}' gathered from {} research tasks.\n",
            topic,
            results.len()
        ),
        "## Research Findings\n".to_string(),
    ];

    for (i, result) in results.iter().enumerate() {
        if !result.is_completed() {
            continue;
        }
        let sources = if result.sources.is_empty() {
            "No sources available".to_string()
        } else {
            result
                .sources
                .iter()
                .take(FALLBACK_LISTED_SOURCES)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };
        sections.push(format!(
            "### Finding #{}: {}\n**Confidence Score:** {:.2}\n\n{}\n\n**Sources:** {}\n\n---\n",
            i + 1,
            result.task_description,
            result.confidence_score,
            result.findings,
            sources
        ));
    }

    sections.push(metadata_footer(results));
    sections.join("\n")
}

pub fn quick_summary(topic: &str, results: &[TaskResult]) -> String {
    if results.is_empty() {
        return format!("No research findings available for '{}' yet.", topic);
    }

    let completed: Vec<TaskResult> = results.iter().filter(|r| r.is_completed()).cloned().collect();
    let mut parts = vec![
        format!("Research Progress for '{}':", topic),
        format!("• Completed Tasks: {}/{}", completed.len(), results.len()),
        format!("• Average Confidence: {:.2}", average_confidence(&completed)),
        format!(
            "• Total Sources: {}",
            completed.iter().map(|r| r.sources.len()).sum::<usize>()
        ),
        "\nKey Findings:".to_string(),
    ];
    parts.extend(completed.iter().take(SUMMARY_FINDINGS).map(|r| {
        format!(
            "• {}: {}...",
            r.task_description,
            truncate_chars(&r.findings, SUMMARY_EXCERPT_CHARS)
        )
    }));
    parts.join("\n")
}

fn format_findings(results: &[TaskResult]) -> String {
    let sections: Vec<String> = results
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_completed() && !r.findings.trim().is_empty())
        .map(|(i, r)| {
            format!(
                "Research Finding #{}:\nFocus Area: {}\nConfidence Level: {:.2}\n\nKey Insights:\n{}\n\nSources Referenced:\n{}\n\n---\n",
                i + 1,
                r.task_description,
                r.confidence_score,
                r.findings,
                format_sources(&r.sources)
            )
        })
        .collect();

    if sections.is_empty() {
        "No substantial research findings were collected from sub-agents.".to_string()
    } else {
        sections.join("\n")
    }
}

fn format_sources(sources: &[String]) -> String {
    if sources.is_empty() {
        return "• No sources provided".to_string();
    }
    sources
        .iter()
        .take(MAX_LISTED_SOURCES)
        .map(|url| match extract_domain(url).as_str() {
            "unknown-domain" => format!("• {}", url),
            domain => format!("• [{}]({})", domain, url),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
