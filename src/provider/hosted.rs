//! Production [`TextModel`] backed by the two hosted endpoint clients.

use async_trait::async_trait;

use crate::config::EnrichConfig;

use super::{
    ClassifyOutcome, GenerativeClient, InferenceClient, ProviderError, SentimentScore, TextModel,
};

/// Pairs the generative client with the inference client behind the single
/// [`TextModel`] contract the orchestrator consumes.
pub struct HostedTextModel {
    generative: GenerativeClient,
    inference: InferenceClient,
}

impl HostedTextModel {
    pub fn from_config(config: &EnrichConfig) -> Self {
        Self {
            generative: GenerativeClient::new(
                config.generative_api_key.clone(),
                config.request_timeout,
                config.retry.clone(),
            ),
            inference: InferenceClient::new(
                config.inference_api_key.clone(),
                config.request_timeout,
                config.retry.clone(),
            ),
        }
    }
}

#[async_trait]
impl TextModel for HostedTextModel {
    /// Availability tracks the generative endpoint, the call the
    /// orchestrator gates on. Classification/sentiment report their own
    /// `CredentialsMissing` per call and degrade individually.
    fn is_available(&self) -> bool {
        self.generative.is_available()
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.generative.generate(prompt).await
    }

    async fn generate_chunks(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        self.generative.generate_chunks(prompt).await
    }

    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
    ) -> Result<ClassifyOutcome, ProviderError> {
        self.inference.classify(text, candidate_labels).await
    }

    async fn sentiment(&self, text: &str) -> Result<SentimentScore, ProviderError> {
        self.inference.sentiment(text).await
    }
}
