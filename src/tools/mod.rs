//! External capabilities used by the research agents
//!
//! # Module Structure
//!
//! - [`search`](crate::tools::search) - Web search (Google Custom Search, DuckDuckGo, simulated)
//! - [`fetch`](crate::tools::fetch) - Page download and main-text extraction
//! - [`speech`](crate::tools::speech) - Text-to-speech synthesis
//!
//! Each capability sits behind a trait ([`SearchProvider`], [`PageFetcher`],
//! [`SpeechSynthesizer`]) so agents can be exercised against in-memory fakes.
//!
//! ```ignore
//! let hits = DuckDuckGoSearch::new().search("rust async runtimes", 5).await?;
//! for hit in hits {
//!     println!("{} ({})", hit.title, hit.domain);
//! }
//! ```

/// Page fetching and text extraction.
pub mod fetch;
/// Web search providers.
pub mod search;
/// Text-to-speech.
pub mod speech;

pub use fetch::{HttpPageFetcher, PageFetcher};
pub use search::{
    simulated_results, DuckDuckGoSearch, GoogleSearch, HitOrigin, SearchHit, SearchProvider,
    SimulatedSearch,
};
pub use speech::{OpenAISpeech, SpeechSynthesizer};
