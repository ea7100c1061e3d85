//! Voice-note transcript cleanup.
//!
//! The generative path rewrites the transcript for grammar and structure;
//! the local path is a conservative filler-word scrub that never invents
//! content.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::enrich::Enricher;
use crate::error::EnrichError;
use crate::prompts;
use crate::response::{extract_json, validate_required_fields};
use crate::types::Source;

fn filler_pattern() -> &'static Regex {
    static FILLERS: OnceLock<Regex> = OnceLock::new();
    FILLERS.get_or_init(|| {
        Regex::new(r"(?i)\b(um|uh|like|you know|actually)\b").expect("filler pattern")
    })
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceNoteResult {
    pub cleaned_text: String,
    pub suggested_title: String,
    #[serde(default)]
    pub detected_topics: Vec<String>,
    pub source: Source,
    pub processed_at: DateTime<Utc>,
}

impl Enricher {
    /// Clean a transcribed voice note. `language` is a hint passed through
    /// to the generative prompt; the local path ignores it.
    pub async fn process_voice_note(
        &self,
        transcript: &str,
        language: &str,
        now: DateTime<Utc>,
    ) -> Result<VoiceNoteResult, EnrichError> {
        if transcript.trim().is_empty() {
            return Err(EnrichError::EmptyInput { field: "transcript" });
        }

        if self.provider().is_available() {
            let prompt = prompts::clean_voice_note(transcript, language);
            match self.provider().generate(&prompt).await {
                Ok(raw) => match parse_voice_response(&raw, now) {
                    Ok(result) => return Ok(result),
                    Err(err) => {
                        log::warn!("voice cleanup response unusable, using fallback: {}", err);
                    }
                },
                Err(err) => {
                    log::warn!("voice cleanup call failed, using fallback: {}", err);
                }
            }
        }

        Ok(fallback_cleanup(transcript, now))
    }
}

fn parse_voice_response(
    raw: &str,
    now: DateTime<Utc>,
) -> Result<VoiceNoteResult, crate::response::ResponseError> {
    let parsed = extract_json(raw)?;
    validate_required_fields(&parsed, &["cleanedText", "suggestedTitle"])?;
    Ok(VoiceNoteResult {
        cleaned_text: parsed["cleanedText"].as_str().unwrap_or_default().to_string(),
        suggested_title: parsed["suggestedTitle"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        detected_topics: parsed["detectedTopics"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default(),
        source: Source::ExternalAi,
        processed_at: now,
    })
}

/// Local scrub: drop filler words, collapse whitespace, capitalize the
/// first letter, and close with a period when no terminal punctuation
/// survived the transcription.
fn fallback_cleanup(transcript: &str, now: DateTime<Utc>) -> VoiceNoteResult {
    let stripped = filler_pattern().replace_all(transcript, "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut cleaned = capitalize_first(&collapsed);
    if !cleaned.is_empty() && !cleaned.ends_with(['.', '!', '?']) {
        cleaned.push('.');
    }

    let truncated = prompts::truncate_at_boundary(&cleaned, 50);
    let suggested_title = if truncated.len() < cleaned.len() {
        format!("{}...", truncated.trim_end())
    } else {
        cleaned.trim_end_matches(['.', '!', '?']).to_string()
    };

    VoiceNoteResult {
        cleaned_text: cleaned,
        suggested_title,
        detected_topics: Vec::new(),
        source: Source::HeuristicFallback,
        processed_at: now,
    }
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
