//! Reqwest client for a hosted-inference endpoint (zero-shot classification
//! and sentiment), bearer-token auth.
//!
//! Request/response shapes follow the Hugging Face inference API: zero-shot
//! returns parallel `labels`/`scores` arrays, sentiment returns a ranked
//! list of `{label, score}` pairs (sometimes nested one level). Some
//! sentiment models emit positional labels (`LABEL_0`/`LABEL_1`/`LABEL_2`);
//! those are normalized to negative/neutral/positive.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{error_for_status, send_with_retry, ClassifyOutcome, ProviderError, RetryPolicy, SentimentScore};

const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co/models";
const DEFAULT_CLASSIFY_MODEL: &str = "facebook/bart-large-mnli";
const DEFAULT_SENTIMENT_MODEL: &str = "cardiffnlp/twitter-roberta-base-sentiment-latest";

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [String],
    multi_class: bool,
}

#[derive(Debug, Deserialize)]
struct ZeroShotResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct SentimentRequest<'a> {
    inputs: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct LabelScore {
    label: String,
    score: f64,
}

/// The sentiment endpoint returns either `[{label, score}, …]` or the same
/// list nested one level deeper.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SentimentResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Client for the classification/sentiment endpoint. Constructible without
/// a token; calls then fail with `CredentialsMissing`.
pub struct InferenceClient {
    client: reqwest::Client,
    base_url: String,
    classify_model: String,
    sentiment_model: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl InferenceClient {
    pub fn new(api_key: Option<String>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            classify_model: DEFAULT_CLASSIFY_MODEL.to_string(),
            sentiment_model: DEFAULT_SENTIMENT_MODEL.to_string(),
            api_key,
            retry,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    fn token(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::CredentialsMissing)
    }

    /// Zero-shot classification: rank `candidate_labels` against `text`.
    pub async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ClassifyOutcome, ProviderError> {
        let token = self.token()?;
        let url = format!("{}/{}", self.base_url, self.classify_model);
        let body = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels,
                multi_class: false,
            },
        };

        let request = self.client.post(&url).bearer_auth(token).json(&body);
        let response = send_with_retry(request, &self.retry).await?;
        let response = error_for_status(response).await?;

        let parsed: ZeroShotResponse = response.json().await?;
        if parsed.labels.is_empty() || parsed.labels.len() != parsed.scores.len() {
            return Err(ProviderError::UnexpectedShape(
                "zero-shot labels/scores mismatch".to_string(),
            ));
        }
        Ok(ClassifyOutcome {
            labels: parsed.labels,
            scores: parsed.scores,
        })
    }

    /// Sentiment: top-ranked label (negative/neutral/positive) and score.
    pub async fn sentiment(&self, text: &str) -> Result<SentimentScore, ProviderError> {
        let token = self.token()?;
        let url = format!("{}/{}", self.base_url, self.sentiment_model);
        let body = SentimentRequest { inputs: text };

        let request = self.client.post(&url).bearer_auth(token).json(&body);
        let response = send_with_retry(request, &self.retry).await?;
        let response = error_for_status(response).await?;

        let parsed: SentimentResponse = response.json().await?;
        let mut ranked = match parsed {
            SentimentResponse::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            SentimentResponse::Flat(list) => list,
        };

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        let top = ranked.into_iter().next().ok_or_else(|| {
            ProviderError::UnexpectedShape("empty sentiment response".to_string())
        })?;

        Ok(SentimentScore {
            label: normalize_sentiment_label(&top.label),
            score: top.score,
        })
    }
}

/// Map positional model labels to the canonical negative/neutral/positive.
fn normalize_sentiment_label(label: &str) -> String {
    match label.to_uppercase().as_str() {
        "LABEL_0" => "negative".to_string(),
        "LABEL_1" => "neutral".to_string(),
        "LABEL_2" => "positive".to_string(),
        _ => label.to_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_labels_normalize() {
        assert_eq!(normalize_sentiment_label("LABEL_0"), "negative");
        assert_eq!(normalize_sentiment_label("LABEL_1"), "neutral");
        assert_eq!(normalize_sentiment_label("LABEL_2"), "positive");
        assert_eq!(normalize_sentiment_label("Negative"), "negative");
    }

    #[test]
    fn sentiment_response_accepts_both_nestings() {
        let nested = r#"[[{"label":"negative","score":0.9},{"label":"neutral","score":0.1}]]"#;
        let parsed: SentimentResponse = serde_json::from_str(nested).unwrap();
        assert!(matches!(parsed, SentimentResponse::Nested(_)));

        let flat = r#"[{"label":"LABEL_2","score":0.7}]"#;
        let parsed: SentimentResponse = serde_json::from_str(flat).unwrap();
        assert!(matches!(parsed, SentimentResponse::Flat(_)));
    }

    #[tokio::test]
    async fn classify_without_token_is_credentials_missing() {
        let client =
            InferenceClient::new(None, Duration::from_secs(10), RetryPolicy::default());
        assert!(!client.is_available());
        let err = client
            .classify("text", &["work".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::CredentialsMissing));
    }

    #[test]
    fn zero_shot_response_deserializes() {
        let json = r#"{"sequence":"x","labels":["work","health"],"scores":[0.8,0.2]}"#;
        let parsed: ZeroShotResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.labels[0], "work");
        assert!((parsed.scores[0] - 0.8).abs() < 1e-9);
    }
}
