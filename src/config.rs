//! Explicit configuration for the enrichment engine.
//!
//! No global state: credentials and tuning constants are read by the host
//! once and passed in at construction, which is also what lets tests swap
//! in a fake provider. The score weights and confidence constants mirror
//! the values wired into the active service; none of them are empirically
//! calibrated, so they are exposed as plain tunable fields rather than
//! baked-in magic numbers.

use std::time::Duration;

use crate::provider::RetryPolicy;

/// Weights for combining priority sub-scores:
/// final = sentiment·w_sentiment + keyword·w_keyword + due_date·w_due_date.
#[derive(Debug, Clone)]
pub struct PriorityWeights {
    pub sentiment: f64,
    pub keyword: f64,
    pub due_date: f64,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            sentiment: 0.4,
            keyword: 0.4,
            due_date: 0.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichConfig {
    /// API key for the generative-text endpoint. None = unavailable,
    /// enrichment runs heuristics-only.
    pub generative_api_key: Option<String>,
    /// Token for the classification/sentiment endpoint. None = those
    /// sub-calls substitute their keyword heuristic scores.
    pub inference_api_key: Option<String>,

    /// Per-call HTTP timeout. A timeout triggers the retry path, not a
    /// separate state.
    pub request_timeout: Duration,
    pub retry: RetryPolicy,

    pub weights: PriorityWeights,
    /// Combined score above this → high priority.
    pub high_threshold: f64,
    /// Combined score below this → low priority.
    pub low_threshold: f64,

    /// Confidence attached to a successful generative parse. The upstream
    /// service returns no calibrated confidence for generative output, so
    /// this is a documented placeholder constant, not a measured value.
    pub ai_parse_confidence: f64,
    /// Confidence attached to the plain-text fallback parse.
    pub fallback_parse_confidence: f64,

    /// Fixed pause between external calls when walking a task batch.
    /// A deliberate throttle for upstream rate limits, not a correctness
    /// requirement.
    pub batch_call_delay: Duration,
    /// Minimum confidence for an urgent-task suggestion to surface.
    pub urgent_suggestion_confidence: f64,
}

impl Default for EnrichConfig {
    fn default() -> Self {
        Self {
            generative_api_key: None,
            inference_api_key: None,
            request_timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            weights: PriorityWeights::default(),
            high_threshold: 0.7,
            low_threshold: 0.3,
            ai_parse_confidence: 0.9,
            fallback_parse_confidence: 0.3,
            batch_call_delay: Duration::from_millis(500),
            urgent_suggestion_confidence: 0.7,
        }
    }
}

impl EnrichConfig {
    /// Convenience: read both API keys from the process environment
    /// (`TASKWISE_GENERATIVE_API_KEY`, `TASKWISE_INFERENCE_API_KEY`).
    /// Missing variables leave the adapter unavailable rather than failing.
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            generative_api_key: read("TASKWISE_GENERATIVE_API_KEY"),
            inference_api_key: read("TASKWISE_INFERENCE_API_KEY"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let w = PriorityWeights::default();
        assert!((w.sentiment + w.keyword + w.due_date - 1.0).abs() < 1e-9);
    }

    #[test]
    fn default_config_has_no_credentials() {
        let cfg = EnrichConfig::default();
        assert!(cfg.generative_api_key.is_none());
        assert!(cfg.inference_api_key.is_none());
        assert_eq!(cfg.request_timeout, Duration::from_secs(10));
    }
}
