//! Response generation: one bounded language-model call per turn.

use std::sync::Arc;
use std::time::Duration;
use stellar_core::error::ProviderError;
use stellar_core::provider::{Provider, ProviderRequest};
use tracing::debug;

use crate::context::AssembledPrompt;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    #[error("{0}")]
    Provider(#[from] ProviderError),

    #[error("Model call timed out after {0}s")]
    Timeout(u64),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

pub struct ResponseGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    timeout: Duration,
}

impl ResponseGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: stellar_core::provider::default_temperature(),
            max_tokens: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Send the prompt to the model and return the answer text.
    pub async fn generate(&self, prompt: &AssembledPrompt) -> Result<String, GenerationError> {
        let mut request = ProviderRequest::new(self.model.clone(), prompt.messages.clone());
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        debug!(
            provider = self.provider.name(),
            model = %self.model,
            messages = request.messages.len(),
            "Generating response"
        );

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout.as_secs()))??;

        if let Some(usage) = &response.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Model usage"
            );
        }

        let text = response.message.content();
        if text.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AssemblyMetadata;
    use crate::test_helpers::{ScriptedProvider, SlowProvider};
    use stellar_core::message::Message;
    use stellar_core::retrieval::Retrieval;

    fn prompt(question: &str) -> AssembledPrompt {
        AssembledPrompt {
            messages: vec![Message::system("Be helpful."), Message::user(question)],
            context: None,
            metadata: AssemblyMetadata {
                knowledge: Retrieval::Empty,
                web: Retrieval::Skipped,
                history_included: 0,
                history_total: 0,
            },
        }
    }

    #[tokio::test]
    async fn returns_model_text() {
        let provider = Arc::new(ScriptedProvider::text("Refunds take 5-7 days.\n\n- Start in Billing.\n"));
        let generator = ResponseGenerator::new(provider.clone(), "test-model");
        let answer = generator.generate(&prompt("refund?")).await.unwrap();
        assert_eq!(answer, "Refunds take 5-7 days.\n\n- Start in Billing.\n");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn request_carries_settings() {
        let provider = Arc::new(ScriptedProvider::text("ok"));
        let generator = ResponseGenerator::new(provider.clone(), "test-model")
            .with_temperature(0.2)
            .with_max_tokens(256);
        generator.generate(&prompt("hi")).await.unwrap();

        let request = &provider.requests()[0];
        assert_eq!(request.model, "test-model");
        assert!((request.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn default_temperature_applies() {
        let provider = Arc::new(ScriptedProvider::text("ok"));
        ResponseGenerator::new(provider.clone(), DEFAULT_MODEL)
            .generate(&prompt("hi"))
            .await
            .unwrap();
        assert!((provider.requests()[0].temperature - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn provider_error_is_surfaced() {
        let generator = ResponseGenerator::new(Arc::new(ScriptedProvider::failing()), "m");
        let err = generator.generate(&prompt("hi")).await.unwrap_err();
        assert!(matches!(err, GenerationError::Provider(ProviderError::Network(_))));
    }

    #[tokio::test]
    async fn blank_answer_is_an_error() {
        let generator = ResponseGenerator::new(Arc::new(ScriptedProvider::text("   ")), "m");
        let err = generator.generate(&prompt("hi")).await.unwrap_err();
        assert!(matches!(err, GenerationError::EmptyResponse));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_times_out() {
        let provider = Arc::new(SlowProvider { delay: Duration::from_secs(120) });
        let generator =
            ResponseGenerator::new(provider, "m").with_timeout(Duration::from_secs(60));
        let err = generator.generate(&prompt("hi")).await.unwrap_err();
        assert!(matches!(err, GenerationError::Timeout(60)));
        assert_eq!(err.to_string(), "Model call timed out after 60s");
    }
}
