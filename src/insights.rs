//! Batch insights over a task snapshot.
//!
//! Distribution arithmetic is always local and deterministic; only the
//! prose insight lines go through the generative adapter, with a small
//! rule-based generator as the fallback.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enrich::Enricher;
use crate::prompts;
use crate::response::extract_json;
use crate::types::{Category, Priority, Source, Task};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInsights {
    pub total_tasks: usize,
    pub category_distribution: BTreeMap<Category, u32>,
    pub priority_distribution: BTreeMap<Priority, u32>,
    pub average_estimated_minutes: f64,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
    pub source: Source,
    pub processed_at: DateTime<Utc>,
}

impl Enricher {
    /// Summarize a task batch: distributions plus prose insight lines.
    /// An empty snapshot yields an empty summary rather than an error.
    pub async fn summarize_batch(&self, tasks: &[Task], now: DateTime<Utc>) -> BatchInsights {
        let mut category_distribution: BTreeMap<Category, u32> = BTreeMap::new();
        let mut priority_distribution: BTreeMap<Priority, u32> = BTreeMap::new();
        let mut minutes_total: u64 = 0;
        let mut minutes_count: u64 = 0;

        for task in tasks {
            *category_distribution
                .entry(task.category.unwrap_or(Category::General))
                .or_insert(0) += 1;
            *priority_distribution
                .entry(task.priority.unwrap_or(Priority::Medium))
                .or_insert(0) += 1;
            if let Some(minutes) = task.estimated_minutes {
                minutes_total += u64::from(minutes);
                minutes_count += 1;
            }
        }

        let average_estimated_minutes = if minutes_count > 0 {
            minutes_total as f64 / minutes_count as f64
        } else {
            0.0
        };

        let mut result = BatchInsights {
            total_tasks: tasks.len(),
            category_distribution,
            priority_distribution,
            average_estimated_minutes,
            insights: Vec::new(),
            recommendations: Vec::new(),
            source: Source::HeuristicFallback,
            processed_at: now,
        };

        if tasks.is_empty() {
            return result;
        }

        if self.provider().is_available() {
            let prompt = insight_prompt(tasks, &result);
            match self.provider().generate(&prompt).await {
                Ok(raw) => match parse_insight_lines(&raw) {
                    Ok((insights, recommendations)) => {
                        result.insights = insights;
                        result.recommendations = recommendations;
                        result.source = Source::ExternalAi;
                        return result;
                    }
                    Err(err) => {
                        log::warn!("batch insight response unusable, using rule-based lines: {}", err);
                    }
                },
                Err(err) => {
                    log::warn!("batch insight call failed, using rule-based lines: {}", err);
                }
            }
        }

        result.insights = simple_insights(&result);
        result
    }
}

fn insight_prompt(tasks: &[Task], stats: &BatchInsights) -> String {
    let categories = join_distribution(
        stats
            .category_distribution
            .iter()
            .map(|(c, n)| (c.as_str(), *n)),
    );
    let priorities = join_distribution(
        stats
            .priority_distribution
            .iter()
            .map(|(p, n)| (p.as_str(), *n)),
    );

    let mut samples = String::new();
    for task in tasks.iter().take(5) {
        let _ = writeln!(samples, "- {}", task.title);
    }

    prompts::batch_insights(
        stats.total_tasks,
        &categories,
        &priorities,
        stats.average_estimated_minutes,
        samples.trim_end(),
    )
}

fn parse_insight_lines(
    raw: &str,
) -> Result<(Vec<String>, Vec<String>), crate::response::ResponseError> {
    let parsed = extract_json(raw)?;
    let lines = |key: &str| -> Vec<String> {
        parsed[key]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    };
    Ok((lines("insights"), lines("recommendations")))
}

fn join_distribution<'a>(pairs: impl Iterator<Item = (&'a str, u32)>) -> String {
    pairs
        .map(|(name, count)| format!("{}: {}", name, count))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rule-based insight lines from the distribution stats.
fn simple_insights(stats: &BatchInsights) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some((category, count)) = stats
        .category_distribution
        .iter()
        .max_by_key(|(_, count)| **count)
    {
        insights.push(format!(
            "Most of your tasks are {} ({} of {}).",
            category.as_str(),
            count,
            stats.total_tasks
        ));
    }

    let high = stats
        .priority_distribution
        .get(&Priority::High)
        .copied()
        .unwrap_or(0);
    if stats.total_tasks > 0 && f64::from(high) / stats.total_tasks as f64 > 0.3 {
        insights.push(format!(
            "{} of {} tasks are high priority; consider spreading deadlines out.",
            high, stats.total_tasks
        ));
    }

    if stats.average_estimated_minutes > 60.0 {
        insights.push(format!(
            "Tasks average {:.0} minutes; breaking large ones down may help.",
            stats.average_estimated_minutes
        ));
    }

    insights
}
