//! Enrichment orchestrator.
//!
//! Owns the decision between the external AI path and the keyword
//! heuristics, merges sub-results, and emits normalized records. The
//! guiding rule: no enrichment-path failure ever escapes to the caller.
//! Adapter errors, exhausted retries, and unparseable model output all
//! degrade to a heuristic result tagged with its source. Only genuinely
//! invalid input (an empty title or text) is a caller-visible error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EnrichConfig;
use crate::error::EnrichError;
use crate::heuristics;
use crate::prompts;
use crate::provider::{ProviderError, SentimentScore, TextModel};
use crate::response::{extract_json, validate_required_fields, ResponseError};
use crate::types::{
    Category, DraftKind, EnrichmentRequest, EnrichmentResult, ParsedTaskDraft, Priority, Source,
    UserPatternSummary,
};

/// Candidate phrases sent to the zero-shot classifier, paired with the
/// category each maps back to. Phrases carry more context than bare
/// category names, which measurably helps zero-shot ranking.
const CLASSIFY_LABELS: &[(&str, Category)] = &[
    ("work and professional tasks", Category::Work),
    ("personal and family matters", Category::Personal),
    ("health and medical", Category::Health),
    ("finance and money", Category::Finance),
    ("education and learning", Category::Education),
    ("shopping and errands", Category::Shopping),
    ("travel and transportation", Category::Travel),
    ("entertainment and leisure", Category::Entertainment),
    ("household and maintenance", Category::Household),
    ("emergency and urgent matters", Category::Emergency),
];

/// Breakdown of the combined priority score, surfaced for transparency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityScores {
    pub sentiment: f64,
    pub keyword: f64,
    pub due_date: f64,
    pub combined: f64,
}

/// Output of [`Enricher::categorize_and_prioritize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub category: Category,
    pub category_confidence: f64,
    pub priority: Priority,
    pub priority_confidence: f64,
    pub scores: PriorityScores,
    pub source: Source,
}

/// Failures internal to the AI path. Never leave this module; every
/// variant routes to the heuristic fallback.
#[derive(Debug, thiserror::Error)]
enum AiPathError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// The enrichment orchestrator. Holds the provider and tuning constants;
/// no other state; each call is independent and the result is discarded
/// after being returned.
pub struct Enricher {
    provider: Arc<dyn TextModel>,
    config: EnrichConfig,
}

impl Enricher {
    pub fn new(provider: Arc<dyn TextModel>, config: EnrichConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EnrichConfig {
        &self.config
    }

    pub(crate) fn provider(&self) -> &Arc<dyn TextModel> {
        &self.provider
    }

    /// Enrich a task draft with category, priority, and time estimate.
    ///
    /// When the adapter reports unavailable the network attempt is skipped
    /// entirely; no retry budget is spent on a known-unusable adapter.
    pub async fn enrich_task(
        &self,
        request: &EnrichmentRequest,
        now: DateTime<Utc>,
    ) -> Result<EnrichmentResult, EnrichError> {
        if request.title.trim().is_empty() {
            return Err(EnrichError::EmptyInput { field: "title" });
        }

        if self.provider.is_available() {
            match self.enrich_with_ai(request, now).await {
                Ok(result) => {
                    log::info!("enriched '{}' via external AI", request.title);
                    return Ok(result);
                }
                Err(err) => {
                    log::warn!(
                        "AI enrichment failed for '{}', falling back to heuristics: {}",
                        request.title,
                        err
                    );
                }
            }
        }

        Ok(self.enrich_with_heuristics(request, now))
    }

    /// Parse free-form text into a structured task draft.
    ///
    /// The fallback truncates the text into the title, so the draft's title
    /// is non-empty whenever the input is.
    pub async fn parse_task(
        &self,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ParsedTaskDraft, EnrichError> {
        if text.trim().is_empty() {
            return Err(EnrichError::EmptyInput { field: "text" });
        }

        if self.provider.is_available() {
            match self.parse_with_ai(text).await {
                Ok(draft) => return Ok(draft),
                Err(err) => {
                    log::warn!("AI task parse failed, using fallback: {}", err);
                }
            }
        }

        Ok(fallback_draft(text, now, self.config.fallback_parse_confidence))
    }

    /// Classification and sentiment run concurrently; they are independent
    /// and write to disjoint fields, so any interleaving merges the same.
    /// A failing sub-call substitutes its keyword heuristic score instead
    /// of aborting the whole assessment.
    pub async fn categorize_and_prioritize(
        &self,
        title: &str,
        description: &str,
        due_date: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Assessment {
        let text = if description.is_empty() {
            title.to_string()
        } else {
            format!("{} {}", title, description)
        };

        let labels: Vec<String> = CLASSIFY_LABELS
            .iter()
            .map(|(phrase, _)| phrase.to_string())
            .collect();

        let (class_result, sentiment_result) = tokio::join!(
            self.provider.classify(&text, &labels),
            self.provider.sentiment(&text)
        );

        let keyword = heuristics::urgency_keyword_score(&text);
        let due = heuristics::due_date_urgency(due_date, now);

        let mut any_external = false;

        let (category, category_confidence) = match class_result {
            Ok(outcome) => match outcome.top() {
                Some((label, score)) => {
                    any_external = true;
                    (category_for_label(label), score)
                }
                None => heuristic_category(&text),
            },
            Err(err) => {
                if !matches!(err, ProviderError::CredentialsMissing) {
                    log::warn!("classification failed, substituting keywords: {}", err);
                }
                heuristic_category(&text)
            }
        };

        let sentiment = match sentiment_result {
            Ok(score) => {
                any_external = true;
                sentiment_urgency(&score)
            }
            Err(err) => {
                if !matches!(err, ProviderError::CredentialsMissing) {
                    log::warn!("sentiment failed, substituting keywords: {}", err);
                }
                // Substitute the keyword score for the missing term.
                keyword
            }
        };

        let weights = &self.config.weights;
        let combined =
            sentiment * weights.sentiment + keyword * weights.keyword + due * weights.due_date;

        let priority = if combined > self.config.high_threshold {
            Priority::High
        } else if combined < self.config.low_threshold {
            Priority::Low
        } else {
            Priority::Medium
        };

        let margin = (combined - self.config.high_threshold)
            .abs()
            .min((combined - self.config.low_threshold).abs());
        let priority_confidence = (0.5 + margin).min(0.85);

        Assessment {
            category,
            category_confidence,
            priority,
            priority_confidence,
            scores: PriorityScores {
                sentiment,
                keyword,
                due_date: due,
                combined,
            },
            source: if any_external {
                Source::ExternalAi
            } else {
                Source::HeuristicFallback
            },
        }
    }

    /// Duration estimate in minutes. Prefers the user's historical average
    /// for the category (any completed task counts); otherwise the
    /// three-tier keyword table; otherwise the 30-minute default.
    pub fn estimate_duration(
        &self,
        title: &str,
        description: &str,
        category: Category,
        patterns: &UserPatternSummary,
    ) -> u32 {
        if let Some(avg) = crate::patterns::average_completion_minutes(patterns, category) {
            return avg;
        }
        let text = format!("{} {}", title, description);
        heuristics::duration_by_keyword(&text)
    }

    // -----------------------------------------------------------------------
    // AI path
    // -----------------------------------------------------------------------

    /// Run the structured-parse prompt and read out category, urgency, and
    /// duration. The generative service returns no calibrated confidence,
    /// so the configured constant is attached as a documented placeholder.
    async fn enrich_with_ai(
        &self,
        request: &EnrichmentRequest,
        now: DateTime<Utc>,
    ) -> Result<EnrichmentResult, AiPathError> {
        let parsed = self.generate_parsed(&request.combined_text()).await?;
        validate_required_fields(&parsed, &["title", "category", "urgency"])?;

        let category = parsed["category"]
            .as_str()
            .map(Category::from_str_lossy)
            .unwrap_or(Category::General);
        let priority = parsed["urgency"]
            .as_str()
            .map(Priority::from_str_lossy)
            .unwrap_or(Priority::Medium);
        let estimated_minutes = parsed["estimatedMinutes"]
            .as_u64()
            .map(|m| m as u32)
            .unwrap_or_else(|| heuristics::duration_by_keyword(&request.combined_text()));

        Ok(EnrichmentResult {
            category,
            category_confidence: self.config.ai_parse_confidence,
            priority,
            priority_confidence: self.config.ai_parse_confidence,
            estimated_minutes,
            reasoning: parsed["reasoning"].as_str().map(String::from),
            source: Source::ExternalAi,
            processed_at: now,
        })
    }

    async fn parse_with_ai(&self, text: &str) -> Result<ParsedTaskDraft, AiPathError> {
        let parsed = self.generate_parsed(text).await?;
        validate_required_fields(&parsed, &["title"])?;

        // Truthiness alone is not enough here: the draft title must be a
        // non-empty string, or the fallback produces a better one.
        let title = parsed["title"]
            .as_str()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ResponseError::IncompleteResponse("title".to_string()))?;

        let due_date = parsed["dueDate"]
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        Ok(ParsedTaskDraft {
            title: title.to_string(),
            description: parsed["description"]
                .as_str()
                .unwrap_or_default()
                .to_string(),
            due_date,
            kind: parsed["type"]
                .as_str()
                .map(DraftKind::from_str_lossy)
                .unwrap_or(DraftKind::Task),
            estimated_minutes: parsed["estimatedMinutes"].as_u64().unwrap_or(30) as u32,
            confidence: self.config.ai_parse_confidence,
            source: Source::ExternalAi,
        })
    }

    /// Run the task-parsing prompt and extract its JSON object.
    ///
    /// The provider may deliver the completion as a finite chunk sequence;
    /// chunks are accumulated into one string and parsed exactly once at
    /// the end; no incremental parsing of partial output.
    async fn generate_parsed(&self, text: &str) -> Result<serde_json::Value, AiPathError> {
        let prompt = prompts::parse_task(text);
        let chunks = self.provider.generate_chunks(&prompt).await?;
        let raw = chunks.concat();
        Ok(extract_json(&raw)?)
    }

    // -----------------------------------------------------------------------
    // Heuristic path
    // -----------------------------------------------------------------------

    fn enrich_with_heuristics(
        &self,
        request: &EnrichmentRequest,
        now: DateTime<Utc>,
    ) -> EnrichmentResult {
        let text = request.combined_text();
        let category = heuristics::categorize(&text);

        // Same weighted combination as the AI-assisted path, with the
        // keyword score standing in for the unavailable sentiment term.
        let keyword = heuristics::urgency_keyword_score(&text);
        let due = heuristics::due_date_urgency(request.due_date, now);
        let weights = &self.config.weights;
        let combined = keyword * weights.sentiment + keyword * weights.keyword + due * weights.due_date;

        let priority = if combined > self.config.high_threshold {
            Priority::High
        } else if combined < self.config.low_threshold {
            Priority::Low
        } else {
            Priority::Medium
        };

        let margin = (combined - self.config.high_threshold)
            .abs()
            .min((combined - self.config.low_threshold).abs());
        let priority_confidence = (0.5 + margin).min(0.85);

        EnrichmentResult {
            category: category.category,
            category_confidence: category.confidence,
            priority,
            priority_confidence,
            estimated_minutes: heuristics::duration_by_keyword(&text),
            reasoning: None,
            source: Source::HeuristicFallback,
            processed_at: now,
        }
    }
}

/// Map a classifier phrase back to its category; unknown phrases fall
/// through to `General`.
fn category_for_label(label: &str) -> Category {
    CLASSIFY_LABELS
        .iter()
        .find(|(phrase, _)| *phrase == label)
        .map(|(_, category)| *category)
        .unwrap_or(Category::General)
}

fn heuristic_category(text: &str) -> (Category, f64) {
    let guess = heuristics::categorize(text);
    (guess.category, guess.confidence)
}

/// Map the top sentiment onto an urgency sub-score. Negative sentiment
/// reads as stress/urgency, positive as relaxed:
/// negative → 0.5 + 0.4·score, neutral → 0.5, positive → 0.5 − 0.4·score.
fn sentiment_urgency(sentiment: &SentimentScore) -> f64 {
    match sentiment.label.as_str() {
        "negative" => 0.5 + 0.4 * sentiment.score.clamp(0.0, 1.0),
        "positive" => 0.5 - 0.4 * sentiment.score.clamp(0.0, 1.0),
        _ => 0.5,
    }
}

/// Non-AI draft: truncated title, naive date-word detection, defaults.
fn fallback_draft(text: &str, now: DateTime<Utc>, confidence: f64) -> ParsedTaskDraft {
    let trimmed = text.trim();
    let truncated = prompts::truncate_at_boundary(trimmed, 50);
    let (title, description) = if truncated.len() < trimmed.len() {
        (format!("{}...", truncated.trim_end()), trimmed.to_string())
    } else {
        (trimmed.to_string(), String::new())
    };

    let lowered = trimmed.to_lowercase();
    let due_date = if lowered.contains("tomorrow") {
        Some(now + chrono::Duration::days(1))
    } else if lowered.contains("today") {
        Some(now)
    } else {
        None
    };

    ParsedTaskDraft {
        title,
        description,
        due_date,
        kind: DraftKind::Task,
        estimated_minutes: 30,
        confidence,
        source: Source::HeuristicFallback,
    }
}
