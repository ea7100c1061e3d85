//! Reqwest client for a Gemini-style generative-text endpoint.
//!
//! POSTs a prompt to `{base}/models/{model}:generateContent?key={api_key}`
//! and returns the first candidate's text. Streamed responses arrive as a
//! JSON array of the same candidate shape; each element's text becomes one
//! chunk for the caller to accumulate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{error_for_status, send_with_retry, ProviderError, RetryPolicy};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Client for the generative-text endpoint. Constructible without an API
/// key; calls then fail with `CredentialsMissing` and the caller falls back.
pub struct GenerativeClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    retry: RetryPolicy,
}

impl GenerativeClient {
    pub fn new(api_key: Option<String>, timeout: Duration, retry: RetryPolicy) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key,
            retry,
        }
    }

    /// Override endpoint base URL (tests, alternate providers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn is_available(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Run a prompt, returning the concatenated candidate text.
    pub async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let chunks = self.generate_chunks(prompt).await?;
        Ok(chunks.concat())
    }

    /// Run a prompt, returning the finite sequence of text chunks.
    pub async fn generate_chunks(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ProviderError::CredentialsMissing)?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let request = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body);

        let response = send_with_retry(request, &self.retry).await?;
        let response = error_for_status(response).await?;

        let parsed: GenerateResponse = response.json().await?;
        let chunks: Vec<String> = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .collect();

        if chunks.is_empty() {
            return Err(ProviderError::UnexpectedShape(
                "no candidate text in generate response".to_string(),
            ));
        }
        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reports_unavailable_without_erroring() {
        let client = GenerativeClient::new(None, Duration::from_secs(10), RetryPolicy::default());
        assert!(!client.is_available());

        let client = GenerativeClient::new(
            Some(String::new()),
            Duration::from_secs(10),
            RetryPolicy::default(),
        );
        assert!(!client.is_available());

        let client = GenerativeClient::new(
            Some("key".to_string()),
            Duration::from_secs(10),
            RetryPolicy::default(),
        );
        assert!(client.is_available());
    }

    #[tokio::test]
    async fn generate_without_key_is_credentials_missing() {
        let client = GenerativeClient::new(None, Duration::from_secs(10), RetryPolicy::default());
        let err = client.generate("hello").await.unwrap_err();
        assert!(matches!(err, ProviderError::CredentialsMissing));
    }

    #[test]
    fn response_shape_deserializes() {
        let json = r#"{
            "candidates": [
                { "content": { "parts": [ { "text": "hello " }, { "text": "world" } ] } }
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        let text: String = parsed
            .candidates
            .into_iter()
            .flat_map(|c| c.content.parts)
            .map(|p| p.text)
            .collect();
        assert_eq!(text, "hello world");
    }
}
