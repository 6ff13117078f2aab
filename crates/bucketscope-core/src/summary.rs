//! Scene summaries from a text-generation model.
//!
//! [`SummaryService::summarize`] never fails: any error from the prompt
//! serialization or the model call is logged and replaced by
//! [`SUMMARY_FAILURE_MESSAGE`].

use std::sync::Arc;
use std::time::Instant;

use crate::scenes::SceneRecord;
use crate::{Error, Result};

/// Tracing target for summary generation.
pub const TRACING_TARGET: &str = "bucketscope_core::summary";

/// Text shown in place of a summary when generation fails.
pub const SUMMARY_FAILURE_MESSAGE: &str = "Could not generate analysis at this time.";

/// Core trait for single-prompt text generation.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Sends `prompt` to the model and returns its text answer.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Identifier of the model in use.
    fn model_name(&self) -> &str;
}

/// Builds the instructional prompt around the full scene set.
///
/// # Errors
///
/// Returns a serialization error if the records cannot be rendered as JSON.
pub fn build_prompt(records: &[SceneRecord]) -> Result<String> {
    let data = serde_json::to_string_pretty(records)?;
    Ok(format!(
        "Analyze the following scenes JSON data and provide a concise summary of the content, \
         patterns, and highlights.\n\
         Data: {data}\n\
         \n\
         Format your response as markdown. Focus on:\n\
         - Total number of scenes\n\
         - Recurring themes or characters\n\
         - Notable timestamps or events\n"
    ))
}

/// Summary generator wrapper with observability.
#[derive(Clone)]
pub struct SummaryService {
    inner: Arc<dyn TextGenerator>,
}

impl std::fmt::Debug for SummaryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SummaryService")
            .field("model", &self.inner.model_name())
            .finish()
    }
}

impl SummaryService {
    pub fn new<G>(generator: G) -> Self
    where
        G: TextGenerator + 'static,
    {
        Self {
            inner: Arc::new(generator),
        }
    }

    pub fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    /// Summarizes the records, always returning displayable text.
    pub async fn summarize(&self, records: &[SceneRecord]) -> String {
        match self.try_summarize(records).await {
            Ok(text) => text,
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    model = self.model_name(),
                    error = %error,
                    "Summary generation failed"
                );
                SUMMARY_FAILURE_MESSAGE.to_owned()
            }
        }
    }

    async fn try_summarize(&self, records: &[SceneRecord]) -> Result<String> {
        let start = Instant::now();
        let prompt = build_prompt(records)?;

        tracing::debug!(
            target: TRACING_TARGET,
            model = self.model_name(),
            scenes = records.len(),
            prompt_len = prompt.len(),
            "Requesting scene summary"
        );

        let text = self
            .inner
            .generate(&prompt)
            .await
            .map_err(|error| match error.kind() {
                crate::ErrorKind::Summary => error,
                _ => Error::summary()
                    .with_message(error.display_message())
                    .with_source(error),
            })?;

        tracing::debug!(
            target: TRACING_TARGET,
            model = self.model_name(),
            elapsed_ms = start.elapsed().as_millis(),
            response_len = text.len(),
            "Scene summary generated"
        );

        Ok(text)
    }
}
