//! Gemini text generation through rig.

use std::sync::Arc;

use bucketscope_core::summary::{SummaryService, TextGenerator};
use rig::completion::{AssistantContent, CompletionError, CompletionModel as RigCompletionModel};
use rig::one_or_many::OneOrMany;
use rig::prelude::CompletionClient;
use rig::providers::gemini;

use crate::{Error, GeminiConfig, TRACING_TARGET};

const PROVIDER: &str = "gemini";

struct GeminiGeneratorInner {
    model: gemini::completion::CompletionModel,
    model_name: String,
}

/// [`TextGenerator`] backed by a Gemini completion model.
///
/// This is a cheaply cloneable wrapper around an `Arc`.
#[derive(Clone)]
pub struct GeminiGenerator {
    inner: Arc<GeminiGeneratorInner>,
}

impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerator")
            .field("model", &self.inner.model_name)
            .finish_non_exhaustive()
    }
}

impl GeminiGenerator {
    /// Creates a generator from configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no API key is configured, or if the
    /// rig client cannot be created.
    pub fn new(config: &GeminiConfig) -> bucketscope_core::Result<Self> {
        let api_key = config
            .effective_api_key()
            .ok_or_else(|| Error::config("GEMINI_API_KEY is not set"))?;
        let model_name = config.effective_model().to_owned();

        let client = gemini::Client::new(api_key)
            .map_err(|e| Error::config(format!("{PROVIDER}: {e}")))?;

        tracing::debug!(
            target: TRACING_TARGET,
            provider = PROVIDER,
            model = %model_name,
            "Created completion model"
        );

        Ok(Self {
            inner: Arc::new(GeminiGeneratorInner {
                model: client.completion_model(&model_name),
                model_name,
            }),
        })
    }

    /// Converts this generator into a [`SummaryService`].
    pub fn into_service(self) -> SummaryService {
        SummaryService::new(self)
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> bucketscope_core::Result<String> {
        let map_err =
            |e: CompletionError| bucketscope_core::Error::from(Error::provider(PROVIDER, e));

        self.inner
            .model
            .completion_request(prompt)
            .send()
            .await
            .map(|r| extract_text_content(&r.choice))
            .map_err(map_err)
    }

    fn model_name(&self) -> &str {
        &self.inner.model_name
    }
}

/// Extracts text content from assistant content choices.
fn extract_text_content(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

#[cfg(test)]
mod tests {
    use bucketscope_core::ErrorKind;

    use super::*;

    #[test]
    fn test_missing_key_is_configuration_error() {
        let error = GeminiGenerator::new(&GeminiConfig::default()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Configuration);
        assert_eq!(error.display_message(), "GEMINI_API_KEY is not set");
    }

    #[test]
    fn test_generator_uses_configured_model() {
        let config = GeminiConfig::default()
            .with_api_key("test-key")
            .with_model("gemini-2.5-flash");
        let generator = GeminiGenerator::new(&config).unwrap();
        assert_eq!(generator.model_name(), "gemini-2.5-flash");

        let service = generator.into_service();
        assert_eq!(service.model_name(), "gemini-2.5-flash");
    }

    #[test]
    fn test_extract_text_joins_text_parts() {
        let choice = OneOrMany::one(AssistantContent::text("## Summary"));
        assert_eq!(extract_text_content(&choice), "## Summary");
    }
}
