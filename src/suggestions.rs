//! Proactive task suggestions.
//!
//! Combines per-task urgency assessment with the aggregated pattern
//! summary and the overdue backlog. External calls are walked sequentially
//! with a fixed pause between tasks to stay under upstream rate limits.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::enrich::Enricher;
use crate::types::{Category, Priority, Task, UserPatternSummary};

/// Only this many open tasks get an external assessment per call.
const MAX_ASSESSED_TASKS: usize = 3;

/// Overall category count below which a weekday habit is noise.
const MIN_HABIT_FREQUENCY: u32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Suggestion {
    /// A specific open task assessed as high priority.
    #[serde(rename_all = "camelCase")]
    UrgentTask { title: String, confidence: f64 },
    /// The user habitually works on this category on this weekday.
    #[serde(rename_all = "camelCase")]
    WeekdayPattern { day: String, category: Category },
    /// Open tasks whose due date has already passed.
    #[serde(rename_all = "camelCase")]
    OverdueBacklog { count: usize },
}

impl Enricher {
    /// Build suggestions from the current task snapshot and pattern
    /// summary. Urgent-task assessment covers at most the first three
    /// open tasks; pattern and backlog suggestions are pure aggregation.
    pub async fn generate_suggestions(
        &self,
        tasks: &[Task],
        patterns: &UserPatternSummary,
        now: DateTime<Utc>,
    ) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        let open: Vec<&Task> = tasks.iter().filter(|t| !t.is_completed()).collect();

        for (i, task) in open.iter().take(MAX_ASSESSED_TASKS).enumerate() {
            if i > 0 && self.provider().is_available() {
                tokio::time::sleep(self.config().batch_call_delay).await;
            }
            let assessment = self
                .categorize_and_prioritize(&task.title, &task.description, task.due_date, now)
                .await;
            if assessment.priority == Priority::High
                && assessment.priority_confidence >= self.config().urgent_suggestion_confidence
            {
                suggestions.push(Suggestion::UrgentTask {
                    title: task.title.clone(),
                    confidence: assessment.priority_confidence,
                });
            }
        }

        let weekday = now.weekday().num_days_from_sunday() as u8;
        if let Some(categories) = patterns.weekly_category_presence.get(&weekday) {
            for category in categories {
                let frequency = patterns.category_frequency.get(category).copied().unwrap_or(0);
                if frequency >= MIN_HABIT_FREQUENCY {
                    suggestions.push(Suggestion::WeekdayPattern {
                        day: day_name(weekday).to_string(),
                        category: *category,
                    });
                }
            }
        }

        let overdue = open
            .iter()
            .filter(|t| t.due_date.is_some_and(|due| due < now))
            .count();
        if overdue > 0 {
            suggestions.push(Suggestion::OverdueBacklog { count: overdue });
        }

        suggestions
    }
}

pub(crate) fn day_name(weekday: u8) -> &'static str {
    match weekday {
        0 => "Sunday",
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnrichConfig;
    use crate::patterns::analyze_patterns;
    use crate::provider::{ClassifyOutcome, ProviderError, SentimentScore, TextModel};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Arc;

    struct Offline;

    #[async_trait]
    impl TextModel for Offline {
        fn is_available(&self) -> bool {
            false
        }
        async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
            Err(ProviderError::CredentialsMissing)
        }
        async fn classify(
            &self,
            _text: &str,
            _labels: &[String],
        ) -> Result<ClassifyOutcome, ProviderError> {
            Err(ProviderError::CredentialsMissing)
        }
        async fn sentiment(&self, _text: &str) -> Result<SentimentScore, ProviderError> {
            Err(ProviderError::CredentialsMissing)
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        // A Monday.
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    fn enricher() -> Enricher {
        Enricher::new(Arc::new(Offline), EnrichConfig::default())
    }

    fn open_task(title: &str, due: Option<DateTime<Utc>>) -> Task {
        Task {
            title: title.to_string(),
            description: String::new(),
            category: None,
            priority: None,
            status: "pending".to_string(),
            due_date: due,
            created_at: Some(fixed_now()),
            updated_at: None,
            estimated_minutes: None,
        }
    }

    #[tokio::test]
    async fn urgent_open_task_is_surfaced() {
        let e = enricher();
        let now = fixed_now();
        let tasks = vec![open_task(
            "urgent dentist appointment asap",
            Some(now + chrono::Duration::hours(2)),
        )];
        let suggestions = e.generate_suggestions(&tasks, &Default::default(), now).await;
        assert!(suggestions.iter().any(
            |s| matches!(s, Suggestion::UrgentTask { title, .. } if title.contains("dentist"))
        ));
    }

    #[tokio::test]
    async fn calm_tasks_produce_no_urgent_suggestion() {
        let e = enricher();
        let now = fixed_now();
        let tasks = vec![open_task("maybe reorganize the bookshelf sometime", None)];
        let suggestions = e.generate_suggestions(&tasks, &Default::default(), now).await;
        assert!(!suggestions
            .iter()
            .any(|s| matches!(s, Suggestion::UrgentTask { .. })));
    }

    #[tokio::test]
    async fn weekday_habit_needs_minimum_frequency() {
        let e = enricher();
        let now = fixed_now();

        // Two completed work tasks created on Mondays.
        let monday = |title: &str| Task {
            status: "completed".to_string(),
            category: Some(Category::Work),
            ..open_task(title, None)
        };
        let history = vec![monday("weekly report"), monday("sprint planning")];
        let patterns = analyze_patterns(&history);

        let suggestions = e.generate_suggestions(&[], &patterns, now).await;
        assert!(suggestions.contains(&Suggestion::WeekdayPattern {
            day: "Monday".to_string(),
            category: Category::Work,
        }));
    }

    #[tokio::test]
    async fn overdue_backlog_counts_open_tasks_only() {
        let e = enricher();
        let now = fixed_now();
        let overdue = now - chrono::Duration::days(2);
        let mut done = open_task("already handled", Some(overdue));
        done.status = "completed".to_string();
        let tasks = vec![
            open_task("maybe file expenses sometime", Some(overdue)),
            open_task("maybe renew passport sometime", Some(overdue)),
            done,
        ];
        let suggestions = e.generate_suggestions(&tasks, &Default::default(), now).await;
        assert!(suggestions.contains(&Suggestion::OverdueBacklog { count: 2 }));
    }

    #[tokio::test]
    async fn assessment_is_capped_at_three_tasks() {
        // Five urgent open tasks, only the first three assessed.
        let e = enricher();
        let now = fixed_now();
        let tasks: Vec<Task> = (0..5)
            .map(|i| {
                open_task(
                    &format!("urgent task {}", i),
                    Some(now + chrono::Duration::hours(1)),
                )
            })
            .collect();
        let suggestions = e.generate_suggestions(&tasks, &Default::default(), now).await;
        let urgent = suggestions
            .iter()
            .filter(|s| matches!(s, Suggestion::UrgentTask { .. }))
            .count();
        assert_eq!(urgent, 3);
    }

    #[test]
    fn day_names_cover_the_week() {
        assert_eq!(day_name(0), "Sunday");
        assert_eq!(day_name(6), "Saturday");
    }
}
