//! Note analysis and keyword note search.
//!
//! Same degradation contract as task enrichment: the AI path is attempted
//! when the adapter is available, and any failure lands on a deterministic
//! local analysis tagged `heuristic-fallback`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enrich::Enricher;
use crate::error::EnrichError;
use crate::heuristics;
use crate::prompts;
use crate::response::{extract_json, validate_required_fields};
use crate::types::{Category, Source};

/// Reading speed used for the time estimate, words per minute.
const READING_WPM: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

impl Complexity {
    fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "complex" => Self::Complex,
            "medium" => Self::Medium,
            _ => Self::Simple,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteAnalysis {
    pub summary: String,
    pub sentiment: String,
    pub mood: String,
    pub suggested_category: Category,
    pub suggested_tags: Vec<String>,
    pub key_points: Vec<String>,
    pub reading_time_minutes: u32,
    pub complexity: Complexity,
    pub source: Source,
    pub processed_at: DateTime<Utc>,
}

/// A stored note, as provided by the persistence collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A search hit with its relevance weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRef {
    pub title: String,
    pub relevance: f64,
}

impl Enricher {
    /// Analyze a note's content. Never fails on usable input; an empty
    /// title and content together are the only rejected case.
    pub async fn analyze_note(
        &self,
        title: &str,
        content: &str,
        now: DateTime<Utc>,
    ) -> Result<NoteAnalysis, EnrichError> {
        if title.trim().is_empty() && content.trim().is_empty() {
            return Err(EnrichError::EmptyInput { field: "content" });
        }

        if self.provider().is_available() {
            let prompt = prompts::analyze_note(title, content);
            match self.provider().generate(&prompt).await {
                Ok(raw) => match parse_note_analysis(&raw, now) {
                    Ok(analysis) => return Ok(analysis),
                    Err(err) => {
                        log::warn!("note analysis response unusable, using fallback: {}", err);
                    }
                },
                Err(err) => {
                    log::warn!("note analysis call failed, using fallback: {}", err);
                }
            }
        }

        Ok(fallback_analysis(title, content, now))
    }
}

fn parse_note_analysis(raw: &str, now: DateTime<Utc>) -> Result<NoteAnalysis, crate::response::ResponseError> {
    let parsed = extract_json(raw)?;
    validate_required_fields(&parsed, &["summary", "sentiment"])?;

    let string_list = |key: &str| -> Vec<String> {
        parsed[key]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    };

    Ok(NoteAnalysis {
        summary: parsed["summary"].as_str().unwrap_or_default().to_string(),
        sentiment: parsed["sentiment"].as_str().unwrap_or("neutral").to_string(),
        mood: parsed["mood"].as_str().unwrap_or("calm").to_string(),
        suggested_category: parsed["suggestedCategory"]
            .as_str()
            .map(Category::from_str_lossy)
            .unwrap_or(Category::General),
        suggested_tags: string_list("suggestedTags"),
        key_points: string_list("keyPoints"),
        reading_time_minutes: parsed["readingTimeMinutes"].as_u64().unwrap_or(1) as u32,
        complexity: parsed["complexity"]
            .as_str()
            .map(Complexity::from_str_lossy)
            .unwrap_or(Complexity::Simple),
        source: Source::ExternalAi,
        processed_at: now,
    })
}

/// Deterministic local analysis: truncated summary, neutral affect, word
/// count driven reading time and complexity.
fn fallback_analysis(title: &str, content: &str, now: DateTime<Utc>) -> NoteAnalysis {
    let text = if content.trim().is_empty() { title } else { content };
    let trimmed = text.trim();

    let truncated = prompts::truncate_at_boundary(trimmed, 100);
    let summary = if truncated.len() < trimmed.len() {
        format!("{}...", truncated.trim_end())
    } else {
        trimmed.to_string()
    };

    let words = trimmed.split_whitespace().count();
    let reading_time_minutes = words.div_ceil(READING_WPM).max(1) as u32;
    let complexity = if words > 500 {
        Complexity::Complex
    } else if words > 200 {
        Complexity::Medium
    } else {
        Complexity::Simple
    };

    let category = heuristics::categorize(&format!("{} {}", title, content)).category;

    NoteAnalysis {
        summary,
        sentiment: "neutral".to_string(),
        mood: "calm".to_string(),
        suggested_category: category,
        suggested_tags: vec![category.as_str().to_string()],
        key_points: Vec::new(),
        reading_time_minutes,
        complexity,
        source: Source::HeuristicFallback,
        processed_at: now,
    }
}

/// Keyword relevance search over a note snapshot. A title hit weighs 0.8,
/// a content hit 0.6, a tag hit 0.4; a note scores its strongest match.
/// Results come back sorted by relevance, title as a stable tiebreak.
pub fn search_notes(notes: &[Note], query: &str) -> Vec<NoteRef> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<NoteRef> = notes
        .iter()
        .filter_map(|note| {
            let relevance = if note.title.to_lowercase().contains(&needle) {
                0.8
            } else if note.content.to_lowercase().contains(&needle) {
                0.6
            } else if note
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(&needle))
            {
                0.4
            } else {
                return None;
            };
            Some(NoteRef {
                title: note.title.clone(),
                relevance,
            })
        })
        .collect();

    hits.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.title.cmp(&b.title))
    });
    hits
}
