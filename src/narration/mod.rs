//! Report narration
//!
//! Optional downstream step of a research run: the report is rewritten into
//! a conversational script and synthesized to numbered MP3 segments under a
//! per-run directory.

/// Script writing, segmentation and speech synthesis.
pub mod converter;

pub use converter::{split_into_segments, NarrationConverter};
