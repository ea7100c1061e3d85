//! Static keyword heuristics, the non-AI path.
//!
//! Pure functions over the input text plus an injected `now` for due-date
//! deltas; no I/O. These always return a defaulted category/priority rather
//! than failing; a heuristic that cannot answer is a programming defect,
//! not a runtime condition.

use chrono::{DateTime, Utc};

use crate::types::{Category, Priority};

/// Ordered category table. First category with any substring match wins,
/// so order matters: "emergency dentist appointment" should land on health
/// via "dentist", not on an urgency bucket. Confidence is a per-category
/// static constant in the 0.5–0.7 band.
const CATEGORY_KEYWORDS: &[(Category, f64, &[&str])] = &[
    (
        Category::Work,
        0.7,
        &[
            "meeting",
            "project",
            "deadline",
            "client",
            "report",
            "presentation",
            "email",
            "office",
            "business",
        ],
    ),
    (
        Category::Health,
        0.7,
        &[
            "doctor",
            "dentist",
            "gym",
            "exercise",
            "appointment",
            "medicine",
            "checkup",
            "therapy",
            "hospital",
        ],
    ),
    (
        Category::Finance,
        0.65,
        &[
            "bank", "payment", "bill", "invoice", "budget", "money", "tax", "insurance",
        ],
    ),
    (
        Category::Education,
        0.65,
        &["study", "course", "learn", "homework", "exam", "research"],
    ),
    (
        Category::Shopping,
        0.7,
        &[
            "buy", "purchase", "store", "groceries", "grocery", "market", "order", "shop",
        ],
    ),
    (
        Category::Household,
        0.6,
        &["clean", "repair", "maintenance", "organize", "laundry", "dishes"],
    ),
    (
        Category::Travel,
        0.6,
        &["flight", "hotel", "vacation", "trip", "booking"],
    ),
    (
        Category::Entertainment,
        0.5,
        &["movie", "game", "party", "concert", "show"],
    ),
];

/// Confidence when nothing in the table matches.
const NO_MATCH_CONFIDENCE: f64 = 0.4;

const URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "asap",
    "emergency",
    "critical",
    "deadline",
    "important",
    "rush",
    "immediately",
];
const MODERATE_KEYWORDS: &[&str] = &["soon", "priority", "needed", "required", "must"];
const RELAXED_KEYWORDS: &[&str] = &[
    "maybe",
    "eventually",
    "sometime",
    "when possible",
    "optional",
];

/// Category guess with a static confidence constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryGuess {
    pub category: Category,
    pub confidence: f64,
}

/// Priority guess. `score` is the raw [0,1] urgency score before
/// thresholding, kept so callers can report a breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriorityGuess {
    pub priority: Priority,
    pub confidence: f64,
    pub score: f64,
}

/// First-match categorization over the keyword table.
pub fn categorize(text: &str) -> CategoryGuess {
    let lowered = text.to_lowercase();
    for (category, confidence, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return CategoryGuess {
                category: *category,
                confidence: *confidence,
            };
        }
    }
    CategoryGuess {
        category: Category::General,
        confidence: NO_MATCH_CONFIDENCE,
    }
}

/// Score-based priority: 0.5 base, +0.3 for an urgent keyword, +0.4 for a
/// due date within 1 day, +0.2 within 3 days. Thresholds: >0.7 high,
/// <0.4 low, else medium.
///
/// Confidence scales with the score's margin from the nearest threshold
/// (0.5 + margin, clamped to 0.9); a score sitting right on a band edge
/// is a weak signal, one deep inside a band is a strong one.
pub fn priority(text: &str, due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> PriorityGuess {
    let lowered = text.to_lowercase();
    let mut score: f64 = 0.5;

    if URGENT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        score += 0.3;
    }

    if let Some(due) = due_date {
        let days = (due - now).num_seconds() as f64 / 86_400.0;
        if days <= 1.0 {
            score += 0.4;
        } else if days <= 3.0 {
            score += 0.2;
        }
    }
    score = score.min(1.0);

    let priority = if score > 0.7 {
        Priority::High
    } else if score < 0.4 {
        Priority::Low
    } else {
        Priority::Medium
    };

    let margin = (score - 0.7).abs().min((score - 0.4).abs());
    let confidence = (0.5 + margin).min(0.9);

    PriorityGuess {
        priority,
        confidence,
        score,
    }
}

/// Keyword urgency as a [0,1] sub-score for the weighted combination:
/// urgent 0.9, moderate 0.6, explicitly relaxed 0.2, otherwise neutral 0.5.
pub fn urgency_keyword_score(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    if URGENT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return 0.9;
    }
    if MODERATE_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return 0.6;
    }
    if RELAXED_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        return 0.2;
    }
    0.5
}

/// Due-date urgency as a [0,1] sub-score. No due date reads as relaxed.
pub fn due_date_urgency(due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(due) = due_date else {
        return 0.3;
    };
    let hours = (due - now).num_seconds() as f64 / 3_600.0;
    if hours < 0.0 {
        1.0 // overdue
    } else if hours < 24.0 {
        0.9
    } else if hours < 72.0 {
        0.7
    } else if hours < 168.0 {
        0.5
    } else {
        0.3
    }
}

/// Three-tier verb table for duration fallback, in minutes.
pub fn duration_by_keyword(text: &str) -> u32 {
    let lowered = text.to_lowercase();
    const QUICK: &[&str] = &["call", "email", "text", "quick", "check", "send"];
    const MEDIUM: &[&str] = &["meeting", "review", "plan", "write", "create", "update"];
    const LONG: &[&str] = &["research", "develop", "design", "analyze", "report", "study"];

    if QUICK.iter().any(|k| lowered.contains(k)) {
        return 15;
    }
    if MEDIUM.iter().any(|k| lowered.contains(k)) {
        return 60;
    }
    if LONG.iter().any(|k| lowered.contains(k)) {
        return 180;
    }
    30
}
