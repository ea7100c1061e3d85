//! External AI client adapter.
//!
//! Wraps two upstream contracts behind one trait:
//! - a generative-text completion endpoint (prompt in, free text out)
//! - a zero-shot classification / sentiment inference endpoint
//!
//! The orchestrator depends only on [`TextModel`]; any compliant provider can
//! substitute. An adapter is always constructible without credentials; it
//! reports unavailability via [`TextModel::is_available`] instead of failing
//! at construction, so the orchestrator can route straight to heuristics.

pub mod generative;
pub mod hosted;
pub mod inference;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use generative::GenerativeClient;
pub use hosted::HostedTextModel;
pub use inference::InferenceClient;

/// Errors from upstream AI calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No API key configured. Expected state, routed to fallback, never
    /// surfaced to the end caller as a failure.
    #[error("no credentials configured for this provider")]
    CredentialsMissing,
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
    #[error("request exhausted {attempts} attempts")]
    Exhausted { attempts: u32 },
}

impl ProviderError {
    /// Transient failures worth another attempt. Credential and shape
    /// problems will not improve by retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(err) => err.is_timeout() || err.is_connect(),
            Self::Api { status, .. } => *status == 429 || *status == 408 || *status >= 500,
            _ => false,
        }
    }
}

/// Retry policy for upstream calls: exponential backoff, capped.
///
/// delay(attempt) = initial_backoff_ms * 2^(attempt-1), capped at
/// max_backoff_ms. The final failed attempt propagates to the caller.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = 2u64.saturating_pow(attempt.saturating_sub(1));
        let ms = self
            .initial_backoff_ms
            .saturating_mul(exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

/// Ranked labels with parallel scores from zero-shot classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifyOutcome {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl ClassifyOutcome {
    /// Top-ranked label and score, if the provider returned any.
    pub fn top(&self) -> Option<(&str, f64)> {
        match (self.labels.first(), self.scores.first()) {
            (Some(label), Some(score)) => Some((label.as_str(), *score)),
            _ => None,
        }
    }
}

/// Top sentiment label ("negative" / "neutral" / "positive") and its score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentScore {
    pub label: String,
    pub score: f64,
}

/// Abstract contract for the external AI provider pair.
///
/// `generate_chunks` exists for providers that stream partial responses:
/// the orchestrator accumulates the finite chunk sequence and parses the
/// concatenation once. The default implementation returns the whole
/// completion as a single chunk.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Whether this adapter has usable credentials. When false the
    /// orchestrator skips the network path entirely; no retry budget is
    /// spent on a known-unusable adapter.
    fn is_available(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;

    async fn generate_chunks(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        Ok(vec![self.generate(prompt).await?])
    }

    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ClassifyOutcome, ProviderError>;

    async fn sentiment(&self, text: &str) -> Result<SentimentScore, ProviderError>;
}

/// Send a request with retry on transient failure.
///
/// Retries 429/408/5xx responses and timeout/connect errors, sleeping the
/// policy's capped exponential delay between attempts. Anything else, and
/// the last attempt, is returned to the caller as-is.
pub async fn send_with_retry(
    request: reqwest::RequestBuilder,
    policy: &RetryPolicy,
) -> Result<reqwest::Response, ProviderError> {
    let attempts = policy.max_attempts.max(1);
    for attempt in 1..=attempts {
        let Some(cloned) = request.try_clone() else {
            return request.send().await.map_err(ProviderError::Http);
        };

        match cloned.send().await {
            Ok(response) => {
                let status = response.status();
                let retryable = status == reqwest::StatusCode::TOO_MANY_REQUESTS
                    || status == reqwest::StatusCode::REQUEST_TIMEOUT
                    || status.is_server_error();
                if retryable && attempt < attempts {
                    let delay = policy.delay_for(attempt);
                    log::warn!(
                        "provider retry {}/{} after status {} (sleep {:?})",
                        attempt,
                        attempts,
                        status,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Ok(response);
            }
            Err(err) => {
                let retryable = err.is_timeout() || err.is_connect();
                if retryable && attempt < attempts {
                    let delay = policy.delay_for(attempt);
                    log::warn!(
                        "provider retry {}/{} after transport error: {} (sleep {:?})",
                        attempt,
                        attempts,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
                return Err(ProviderError::Http(err));
            }
        }
    }

    Err(ProviderError::Exhausted { attempts })
}

/// Turn a non-success response into `ProviderError::Api` with body text.
pub(crate) async fn error_for_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ProviderError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_exponential_and_capped() {
        let policy = RetryPolicy {
            max_attempts: 5,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 8_000,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4_000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(8_000));
        // Capped from here on
        assert_eq!(policy.delay_for(5), Duration::from_millis(8_000));
    }

    #[test]
    fn api_errors_classify_retryable() {
        let rate_limited = ProviderError::Api {
            status: 429,
            message: String::new(),
        };
        assert!(rate_limited.is_retryable());

        let server = ProviderError::Api {
            status: 503,
            message: String::new(),
        };
        assert!(server.is_retryable());

        let bad_request = ProviderError::Api {
            status: 400,
            message: String::new(),
        };
        assert!(!bad_request.is_retryable());

        assert!(!ProviderError::CredentialsMissing.is_retryable());
    }

    #[test]
    fn classify_outcome_top_pairs_label_with_score() {
        let outcome = ClassifyOutcome {
            labels: vec!["work".to_string(), "health".to_string()],
            scores: vec![0.8, 0.2],
        };
        assert_eq!(outcome.top(), Some(("work", 0.8)));

        let empty = ClassifyOutcome {
            labels: vec![],
            scores: vec![],
        };
        assert!(empty.top().is_none());
    }
}
