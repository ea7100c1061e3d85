//! Pattern analysis over a user's task history.
//!
//! Single pass, pure aggregation: same input snapshot, same summary,
//! regardless of task ordering. Used to phrase suggestions and to seed
//! duration estimates from real completion times.

use chrono::Datelike;

use crate::types::{Category, Task, UserPatternSummary};

/// Aggregate a task collection snapshot into a [`UserPatternSummary`].
///
/// Per task: record the creation weekday against its category (deduplicated
/// per day), bump the category frequency counter, and, only for completed
/// tasks with both creation and update timestamps, append the
/// `updated - created` delta to that category's duration list.
pub fn analyze_patterns(tasks: &[Task]) -> UserPatternSummary {
    let mut summary = UserPatternSummary::default();

    for task in tasks {
        let category = task.category.unwrap_or(Category::General);

        if let Some(created) = task.created_at {
            let weekday = created.weekday().num_days_from_sunday() as u8;
            summary
                .weekly_category_presence
                .entry(weekday)
                .or_default()
                .insert(category);
        }

        *summary.category_frequency.entry(category).or_insert(0) += 1;

        if task.is_completed() {
            if let (Some(created), Some(updated)) = (task.created_at, task.updated_at) {
                let millis = (updated - created).num_milliseconds();
                summary
                    .completion_durations
                    .entry(category)
                    .or_default()
                    .push(millis);
            }
        }
    }

    summary
}

/// Mean completion time for a category, in whole minutes. None when the
/// user has no completed tasks in that category.
pub fn average_completion_minutes(
    summary: &UserPatternSummary,
    category: Category,
) -> Option<u32> {
    let durations = summary.completion_durations.get(&category)?;
    if durations.is_empty() {
        return None;
    }
    let total: i64 = durations.iter().sum();
    let avg_ms = total as f64 / durations.len() as f64;
    Some((avg_ms / 60_000.0).round().max(0.0) as u32)
}
