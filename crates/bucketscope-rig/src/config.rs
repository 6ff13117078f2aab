//! Gemini configuration.

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};

/// Model used when none is configured.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Configuration for the Gemini text generator.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct GeminiConfig {
    /// API key for the Gemini API
    #[cfg_attr(feature = "config", arg(long = "gemini-api-key", env = "GEMINI_API_KEY"))]
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier
    #[cfg_attr(
        feature = "config",
        arg(long = "gemini-model", env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)
    )]
    #[serde(default = "default_model")]
    pub model: String,
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_owned()
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("model", &self.model)
            .finish()
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
        }
    }
}

impl GeminiConfig {
    /// Returns the API key if one is set and not blank.
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Returns the model, using the default if blank.
    pub fn effective_model(&self) -> &str {
        match self.model.trim() {
            "" => DEFAULT_GEMINI_MODEL,
            model => model,
        }
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the model.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeminiConfig::default();
        assert_eq!(config.effective_model(), "gemini-3-flash-preview");
        assert!(config.effective_api_key().is_none());
    }

    #[test]
    fn test_blank_values() {
        let config = GeminiConfig::default().with_api_key("  ").with_model("");
        assert!(config.effective_api_key().is_none());
        assert_eq!(config.effective_model(), DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = GeminiConfig::default().with_api_key("sk-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: GeminiConfig = serde_json::from_str(r#"{"api_key":"k"}"#).unwrap();
        assert_eq!(config.effective_api_key(), Some("k"));
        assert_eq!(config.model, DEFAULT_GEMINI_MODEL);
    }
}
