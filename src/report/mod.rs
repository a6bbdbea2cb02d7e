//! Report synthesis
//!
//! [`ReportSynthesizer`] turns the flat list of task results from a research
//! run into the final report text. Prose comes from the LLM; the metadata
//! footer, the empty-run report and the fallback report are built
//! deterministically so a report is always produced.

/// LLM-backed report synthesis with deterministic fallbacks.
pub mod synthesizer;

pub use synthesizer::{
    average_confidence, empty_report, fallback_report, metadata_footer, quick_summary,
    ReportMetrics, ReportSynthesizer,
};
