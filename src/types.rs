//! Core domain types shared across the enrichment pipeline.
//!
//! Everything here is transient: constructed per request, returned to the
//! caller, discarded. Persisted entities (users, stored tasks, notes) belong
//! to the storage collaborator; we only read the fields declared on [`Task`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Closed category set for tasks and notes.
///
/// `General` is the catch-all for text that matches nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Personal,
    Health,
    Finance,
    Education,
    Shopping,
    Travel,
    Entertainment,
    Household,
    Emergency,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Personal => "personal",
            Self::Health => "health",
            Self::Finance => "finance",
            Self::Education => "education",
            Self::Shopping => "shopping",
            Self::Travel => "travel",
            Self::Entertainment => "entertainment",
            Self::Household => "household",
            Self::Emergency => "emergency",
            Self::General => "general",
        }
    }

    /// Parse a category name leniently; unknown strings map to `General`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "work" => Self::Work,
            "personal" => Self::Personal,
            "health" => Self::Health,
            "finance" => Self::Finance,
            "education" => Self::Education,
            "shopping" => Self::Shopping,
            "travel" => Self::Travel,
            "entertainment" => Self::Entertainment,
            "household" => Self::Household,
            "emergency" => Self::Emergency,
            _ => Self::General,
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "high" | "urgent" => Self::High,
            "low" => Self::Low,
            _ => Self::Medium,
        }
    }
}

/// What kind of item a parsed draft represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftKind {
    Task,
    Event,
    Reminder,
}

impl DraftKind {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "event" => Self::Event,
            "reminder" => Self::Reminder,
            _ => Self::Task,
        }
    }
}

/// Which path produced an enrichment result.
///
/// Surfaced to the UI so it can indicate AI-enhanced vs heuristic output.
/// AI degradation is never an error state, only a different source tag
/// with lower confidence values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "external-ai")]
    ExternalAi,
    #[serde(rename = "heuristic-fallback")]
    HeuristicFallback,
}

/// Immutable input for a single enrichment call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

impl EnrichmentRequest {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            due_date: None,
        }
    }

    /// Title and description joined for keyword/classification input.
    pub fn combined_text(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.description)
        }
    }
}

/// Normalized enrichment record. Produced once per request, never mutated;
/// a fresh call yields a fresh result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub category: Category,
    pub category_confidence: f64,
    pub priority: Priority,
    pub priority_confidence: f64,
    pub estimated_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub source: Source,
    pub processed_at: DateTime<Utc>,
}

/// Output of natural-language task parsing.
///
/// Invariant: `title` is always non-empty; the fallback path truncates the
/// original text to populate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedTaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: DraftKind,
    pub estimated_minutes: u32,
    pub confidence: f64,
    pub source: Source,
}

/// Read-only view of a stored task, as returned by the persistence
/// collaborator. Status is the collaborator's string ("pending",
/// "completed", ...); we only ever compare it, never define it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub priority: Option<Priority>,
    pub status: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub estimated_minutes: Option<u32>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }
}

/// Aggregated view of a user's task history. Derived read-only from a task
/// collection snapshot; recomputed on demand, never persisted.
///
/// BTreeMap keys keep iteration order deterministic so two runs over the
/// same snapshot serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatternSummary {
    /// Weekday (0 = Sunday … 6 = Saturday) → categories seen on that day.
    pub weekly_category_presence: BTreeMap<u8, BTreeSet<Category>>,
    pub category_frequency: BTreeMap<Category, u32>,
    /// Completion durations in milliseconds, per category, in input order.
    pub completion_durations: BTreeMap<Category, Vec<i64>>,
}
