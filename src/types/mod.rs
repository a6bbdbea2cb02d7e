use serde::{Deserialize, Serialize};
use std::fmt;

// ============= Task Types =============

/// Default routing category for planned research tasks.
pub const WEB_SEARCH_TASK: &str = "web_search";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Lenient conversion from a provider-supplied label. Unknown labels map to `Medium`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "high" | "critical" | "urgent" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A unit of work dispatched to exactly one worker agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub task_id: String,
    /// Routing category matched against `WorkerAgent::can_handle_task`.
    #[serde(rename = "type")]
    pub task_type: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub priority: Priority,
}

impl TaskSpec {
    pub fn new(
        task_id: impl Into<String>,
        task_type: impl Into<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            task_type: task_type.into(),
            query: query.into(),
            description: String::new(),
            context: String::new(),
            priority: Priority::default(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
    Failed,
    Unsupported,
    Partial,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
            TaskStatus::Unsupported => write!(f, "unsupported"),
            TaskStatus::Partial => write!(f, "partial"),
        }
    }
}

/// Outcome of executing one [`TaskSpec`].
///
/// Constructors clamp `confidence_score` into `[0, 1]`, and the failure
/// constructor always carries a zero score with no sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub task_description: String,
    pub findings: String,
    #[serde(default)]
    pub sources: Vec<String>,
    pub confidence_score: f64,
    pub status: TaskStatus,
}

impl TaskResult {
    pub fn new(
        task_id: impl Into<String>,
        task_description: impl Into<String>,
        findings: impl Into<String>,
        sources: Vec<String>,
        confidence_score: f64,
        status: TaskStatus,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            task_description: task_description.into(),
            findings: findings.into(),
            sources,
            confidence_score: clamp_unit(confidence_score),
            status,
        }
    }

    pub fn completed(
        task_id: impl Into<String>,
        task_description: impl Into<String>,
        findings: impl Into<String>,
        sources: Vec<String>,
        confidence_score: f64,
    ) -> Self {
        Self::new(
            task_id,
            task_description,
            findings,
            sources,
            confidence_score,
            TaskStatus::Completed,
        )
    }

    pub fn failed(
        task_id: impl Into<String>,
        task_description: impl Into<String>,
        findings: impl Into<String>,
    ) -> Self {
        Self::new(
            task_id,
            task_description,
            findings,
            Vec::new(),
            0.0,
            TaskStatus::Failed,
        )
    }

    pub fn unsupported(
        task_id: impl Into<String>,
        task_description: impl Into<String>,
        findings: impl Into<String>,
    ) -> Self {
        Self::new(
            task_id,
            task_description,
            findings,
            Vec::new(),
            0.0,
            TaskStatus::Unsupported,
        )
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

/// Clamp a score into `[0, 1]`, mapping NaN to zero.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

// ============= Planning Types =============

/// Upper bound on sub-topics requested from or accepted by the planner.
pub const MAX_SUBTOPICS: usize = 10;

/// The planner's decision on how to split a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityAssessment {
    pub is_complex: bool,
    #[serde(default)]
    pub main_aspects: Vec<String>,
    #[serde(
        default = "default_recommended_subtopics",
        deserialize_with = "deserialize_count"
    )]
    pub recommended_subtopics: usize,
    #[serde(default = "default_research_approach")]
    pub research_approach: String,
    #[serde(default)]
    pub reasoning: String,
}

fn default_recommended_subtopics() -> usize {
    1
}

/// Accepts `3`, `3.0`, `"3"` and `null`. Negative values become 0; anything
/// unreadable becomes the default.
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let as_count = |value: f64| {
        if value.is_finite() {
            value.round().max(0.0) as usize
        } else {
            default_recommended_subtopics()
        }
    };

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Int(n)) => usize::try_from(n).unwrap_or(0),
        Some(Count::Float(f)) => as_count(f),
        Some(Count::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(as_count)
            .unwrap_or_else(|_| default_recommended_subtopics()),
        None => default_recommended_subtopics(),
    })
}

fn default_research_approach() -> String {
    "comprehensive".to_string()
}

impl ComplexityAssessment {
    /// Heuristic used when the provider cannot be consulted: a topic is complex
    /// when it has more than three words.
    pub fn heuristic(topic: &str) -> Self {
        Self {
            is_complex: topic.split_whitespace().count() > 3,
            main_aspects: vec![topic.to_string()],
            recommended_subtopics: 1,
            research_approach: "exploratory".to_string(),
            reasoning: "Fallback analysis due to LLM error".to_string(),
        }
    }

    /// Bring provider-supplied values back into their documented ranges.
    pub fn normalized(mut self) -> Self {
        self.recommended_subtopics = self.recommended_subtopics.clamp(1, MAX_SUBTOPICS);
        self
    }
}

/// A sub-research area proposed by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtopic {
    pub query: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub rationale: String,
}

impl Subtopic {
    pub fn priority(&self) -> Priority {
        self.priority
            .as_deref()
            .map(Priority::from_label)
            .unwrap_or_default()
    }
}

/// Clarifying questions together with the message shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowUpQuestions {
    pub questions: Vec<String>,
    pub message: String,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    LLM(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_result_clamps_confidence() {
        let high = TaskResult::completed("t", "d", "f", vec![], 1.7);
        assert_eq!(high.confidence_score, 1.0);

        let low = TaskResult::completed("t", "d", "f", vec![], -0.3);
        assert_eq!(low.confidence_score, 0.0);

        let nan = TaskResult::completed("t", "d", "f", vec![], f64::NAN);
        assert_eq!(nan.confidence_score, 0.0);
    }

    #[test]
    fn test_failed_result_has_no_sources_and_zero_confidence() {
        let result = TaskResult::failed("task_1", "desc", "boom");
        assert_eq!(result.status, TaskStatus::Failed);
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.sources.is_empty());
    }

    #[test]
    fn test_task_spec_serializes_type_field() {
        let spec = TaskSpec::new("research_task_1", WEB_SEARCH_TASK, "solar power")
            .with_priority(Priority::High);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["type"], "web_search");
        assert_eq!(json["priority"], "high");
    }

    #[test]
    fn test_status_display_matches_wire_names() {
        assert_eq!(TaskStatus::Completed.to_string(), "completed");
        assert_eq!(TaskStatus::Unsupported.to_string(), "unsupported");
        let json = serde_json::to_string(&TaskStatus::Partial).unwrap();
        assert_eq!(json, "\"partial\"");
    }

    #[test]
    fn test_heuristic_complexity() {
        let simple = ComplexityAssessment::heuristic("Renewable energy");
        assert!(!simple.is_complex);
        assert_eq!(simple.main_aspects, vec!["Renewable energy".to_string()]);
        assert_eq!(simple.recommended_subtopics, 1);

        let complex = ComplexityAssessment::heuristic("impact of AI on rural healthcare");
        assert!(complex.is_complex);
    }

    #[test]
    fn test_assessment_normalization() {
        let assessment: ComplexityAssessment =
            serde_json::from_str(r#"{"is_complex": true, "recommended_subtopics": 42}"#).unwrap();
        assert_eq!(assessment.normalized().recommended_subtopics, MAX_SUBTOPICS);

        let assessment: ComplexityAssessment =
            serde_json::from_str(r#"{"is_complex": true, "recommended_subtopics": 0}"#).unwrap();
        assert_eq!(assessment.normalized().recommended_subtopics, 1);
    }

    #[test]
    fn test_assessment_accepts_loose_subtopic_counts() {
        let parse = |json: &str| serde_json::from_str::<ComplexityAssessment>(json).unwrap();

        let assessment = parse(r#"{"is_complex": true, "recommended_subtopics": "3"}"#);
        assert!(assessment.is_complex);
        assert_eq!(assessment.recommended_subtopics, 3);

        let assessment = parse(r#"{"is_complex": true, "recommended_subtopics": 3.0}"#);
        assert!(assessment.is_complex);
        assert_eq!(assessment.recommended_subtopics, 3);

        assert_eq!(parse(r#"{"is_complex": true, "recommended_subtopics": 2.6}"#).recommended_subtopics, 3);
        assert_eq!(parse(r#"{"is_complex": true, "recommended_subtopics": " 4 "}"#).recommended_subtopics, 4);
        assert_eq!(parse(r#"{"is_complex": true, "recommended_subtopics": "several"}"#).recommended_subtopics, 1);
        assert_eq!(parse(r#"{"is_complex": true, "recommended_subtopics": null}"#).recommended_subtopics, 1);
        assert_eq!(parse(r#"{"is_complex": true, "recommended_subtopics": -2}"#).normalized().recommended_subtopics, 1);
        assert_eq!(parse(r#"{"is_complex": false}"#).recommended_subtopics, 1);
    }

    #[test]
    fn test_priority_from_label() {
        assert_eq!(Priority::from_label("HIGH"), Priority::High);
        assert_eq!(Priority::from_label("low "), Priority::Low);
        assert_eq!(Priority::from_label("whenever"), Priority::Medium);
    }
}
