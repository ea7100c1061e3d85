//! End-to-end exercises of the public enrichment API with a scripted
//! provider: the full heuristic pipeline, the AI path, and degradation
//! between them.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use taskwise::{
    analyze_patterns, Category, ClassifyOutcome, DraftKind, EnrichConfig, Enricher,
    EnrichmentRequest, Priority, ProviderError, SentimentScore, Source, Task, TextModel,
};

/// Scripted provider: optional canned responses, call counting.
struct Scripted {
    available: bool,
    generate_response: Option<String>,
    classify_response: Option<ClassifyOutcome>,
    sentiment_response: Option<SentimentScore>,
    generate_calls: AtomicU32,
}

impl Scripted {
    fn offline() -> Self {
        Self {
            available: false,
            generate_response: None,
            classify_response: None,
            sentiment_response: None,
            generate_calls: AtomicU32::new(0),
        }
    }

    fn broken() -> Self {
        Self {
            available: true,
            ..Self::offline()
        }
    }
}

#[async_trait]
impl TextModel for Scripted {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.generate_response
            .clone()
            .ok_or(ProviderError::Exhausted { attempts: 3 })
    }

    async fn classify(
        &self,
        _text: &str,
        _labels: &[String],
    ) -> Result<ClassifyOutcome, ProviderError> {
        self.classify_response
            .clone()
            .ok_or(ProviderError::CredentialsMissing)
    }

    async fn sentiment(&self, _text: &str) -> Result<SentimentScore, ProviderError> {
        self.sentiment_response
            .clone()
            .ok_or(ProviderError::CredentialsMissing)
    }
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
}

fn enricher(provider: Scripted) -> Enricher {
    Enricher::new(Arc::new(provider), EnrichConfig::default())
}

#[tokio::test]
async fn offline_pipeline_enriches_parses_and_assesses() {
    let e = enricher(Scripted::offline());
    let now = fixed_now();

    let request = EnrichmentRequest {
        due_date: Some(now + chrono::Duration::hours(20)),
        ..EnrichmentRequest::new("Buy groceries tomorrow")
    };
    let result = e.enrich_task(&request, now).await.unwrap();
    assert_eq!(result.category, Category::Shopping);
    assert_eq!(result.priority, Priority::Medium);
    assert_eq!(result.source, Source::HeuristicFallback);

    let draft = e.parse_task("call the bank about the invoice today", now).await.unwrap();
    assert_eq!(draft.kind, DraftKind::Task);
    assert_eq!(draft.source, Source::HeuristicFallback);
    assert!(draft.due_date.is_some());

    let assessment = e
        .categorize_and_prioritize("urgent dentist appointment", "", None, now)
        .await;
    assert_eq!(assessment.category, Category::Health);
    assert_eq!(assessment.priority, Priority::High);
    assert_eq!(assessment.source, Source::HeuristicFallback);
}

#[tokio::test]
async fn broken_provider_never_surfaces_an_error() {
    // Available but failing on every call: each operation still answers.
    let e = enricher(Scripted::broken());
    let now = fixed_now();

    let request = EnrichmentRequest::new("plan the sprint review");
    let result = e.enrich_task(&request, now).await.unwrap();
    assert_eq!(result.source, Source::HeuristicFallback);

    let draft = e.parse_task("book flights for the offsite", now).await.unwrap();
    assert_eq!(draft.source, Source::HeuristicFallback);
    assert!(!draft.title.is_empty());

    let analysis = e.analyze_note("Standup", "notes from the standup", now).await.unwrap();
    assert_eq!(analysis.source, Source::HeuristicFallback);

    let voice = e.process_voice_note("um remind me to stretch", "en", now).await.unwrap();
    assert_eq!(voice.source, Source::HeuristicFallback);
    assert_eq!(voice.cleaned_text, "Remind me to stretch.");
}

#[tokio::test]
async fn ai_responses_flow_through_to_results() {
    let mut provider = Scripted::broken();
    provider.generate_response = Some(
        r#"Sure, here is the parsed task:
{"title": "Renew car insurance", "description": "policy expires Friday",
 "dueDate": "2026-03-06T17:00:00Z", "type": "task", "estimatedMinutes": 20,
 "urgency": "high", "category": "finance", "reasoning": "hard deadline"}"#
            .to_string(),
    );
    let e = enricher(provider);
    let now = fixed_now();

    let request = EnrichmentRequest::new("renew insurance before friday");
    let result = e.enrich_task(&request, now).await.unwrap();
    assert_eq!(result.source, Source::ExternalAi);
    assert_eq!(result.category, Category::Finance);
    assert_eq!(result.priority, Priority::High);
    assert_eq!(result.estimated_minutes, 20);
    assert_eq!(result.reasoning.as_deref(), Some("hard deadline"));

    let draft = e.parse_task("renew insurance before friday", now).await.unwrap();
    assert_eq!(draft.title, "Renew car insurance");
    assert_eq!(draft.source, Source::ExternalAi);
    assert_eq!(
        draft.due_date,
        Some(Utc.with_ymd_and_hms(2026, 3, 6, 17, 0, 0).unwrap())
    );
}

#[tokio::test]
async fn unavailable_provider_is_never_called() {
    let provider = Arc::new(Scripted::offline());
    let counter = Arc::clone(&provider);
    let e = Enricher::new(provider, EnrichConfig::default());
    let now = fixed_now();

    let _ = e.enrich_task(&EnrichmentRequest::new("anything"), now).await;
    let _ = e.parse_task("anything else", now).await;

    assert_eq!(counter.generate_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn patterns_feed_duration_estimates() {
    let now = fixed_now();
    let completed = |title: &str, minutes: i64| Task {
        title: title.to_string(),
        description: String::new(),
        category: Some(Category::Work),
        priority: None,
        status: "completed".to_string(),
        due_date: None,
        created_at: Some(now),
        updated_at: Some(now + chrono::Duration::minutes(minutes)),
        estimated_minutes: None,
    };
    let history = vec![completed("draft report", 90), completed("review doc", 30)];
    let patterns = analyze_patterns(&history);

    let e = enricher(Scripted::offline());
    // Work has history: averaged 60 minutes, keyword tiers not consulted.
    assert_eq!(e.estimate_duration("new thing", "", Category::Work, &patterns), 60);
    // No history for travel: keyword tier applies.
    assert_eq!(
        e.estimate_duration("research hotels", "", Category::Travel, &patterns),
        180
    );
}

#[tokio::test]
async fn suggestions_combine_urgency_patterns_and_backlog() {
    let now = fixed_now(); // a Monday
    let monday_work = |title: &str| Task {
        title: title.to_string(),
        description: String::new(),
        category: Some(Category::Work),
        priority: None,
        status: "completed".to_string(),
        due_date: None,
        created_at: Some(now),
        updated_at: Some(now),
        estimated_minutes: None,
    };
    let history = vec![monday_work("weekly report"), monday_work("planning")];
    let patterns = analyze_patterns(&history);

    let open = vec![Task {
        title: "urgent: submit the tax filing asap".to_string(),
        description: String::new(),
        category: None,
        priority: None,
        status: "pending".to_string(),
        due_date: Some(now - chrono::Duration::days(1)),
        created_at: Some(now),
        updated_at: None,
        estimated_minutes: None,
    }];

    let e = enricher(Scripted::offline());
    let suggestions = e.generate_suggestions(&open, &patterns, now).await;

    use taskwise::Suggestion;
    assert!(suggestions
        .iter()
        .any(|s| matches!(s, Suggestion::UrgentTask { .. })));
    assert!(suggestions.iter().any(|s| matches!(
        s,
        Suggestion::WeekdayPattern { day, category }
            if day == "Monday" && *category == Category::Work
    )));
    assert!(suggestions
        .iter()
        .any(|s| matches!(s, Suggestion::OverdueBacklog { count: 1 })));
}
