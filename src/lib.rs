//! AI-assisted enrichment for tasks and notes.
//!
//! The crate turns free-form task and note text into structured metadata:
//! category, priority, time estimates, summaries, and suggestions. Two
//! cooperating paths produce every result. The external path talks to
//! hosted generative and inference endpoints through the [`provider`]
//! adapter; the local path is a set of deterministic keyword heuristics.
//! The external path is best-effort only: any failure there degrades to
//! the heuristics, and every result carries a source tag saying which
//! path produced it.
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskwise::{EnrichConfig, Enricher, EnrichmentRequest, HostedTextModel};
//!
//! # async fn run() -> Result<(), taskwise::EnrichError> {
//! let config = EnrichConfig::from_env();
//! let provider = Arc::new(HostedTextModel::from_config(&config));
//! let enricher = Enricher::new(provider, config);
//!
//! let request = EnrichmentRequest::new("Emergency dentist appointment ASAP");
//! let result = enricher.enrich_task(&request, chrono::Utc::now()).await?;
//! println!("{} / {:?}", result.category.as_str(), result.priority);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod enrich;
pub mod error;
pub mod heuristics;
pub mod insights;
pub mod notes;
pub mod patterns;
pub mod prompts;
pub mod provider;
pub mod response;
pub mod suggestions;
pub mod types;
pub mod voice;

pub use config::{EnrichConfig, PriorityWeights};
pub use enrich::{Assessment, Enricher, PriorityScores};
pub use error::EnrichError;
pub use insights::BatchInsights;
pub use notes::{search_notes, Complexity, Note, NoteAnalysis, NoteRef};
pub use patterns::{analyze_patterns, average_completion_minutes};
pub use provider::{
    ClassifyOutcome, GenerativeClient, HostedTextModel, InferenceClient, ProviderError,
    RetryPolicy, SentimentScore, TextModel,
};
pub use response::{extract_json, validate_required_fields, ResponseError};
pub use suggestions::Suggestion;
pub use types::{
    Category, DraftKind, EnrichmentRequest, EnrichmentResult, ParsedTaskDraft, Priority, Source,
    Task, UserPatternSummary,
};
pub use voice::VoiceNoteResult;
