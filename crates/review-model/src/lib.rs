//! # review-model
//!
//! Language-model adapters used by the organization review engine.
//!
//! Every backend implements [`LanguageModel`]: one tool-aware chat turn per
//! call. Higher-level behavior is layered on top:
//!
//! - [`structured::generate_structured`] forces a single tool call and
//!   deserializes its arguments into a typed value
//! - [`pricing`] turns token counts into an estimated USD cost
//! - [`ScriptedModel`] replays canned turns for tests and offline runs

#![deny(unsafe_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod anthropic;
pub mod error;
mod http;
pub mod openai;
pub mod pricing;
pub mod scripted;
pub mod structured;
pub mod types;

pub use anthropic::AnthropicModel;
pub use error::ModelError;
pub use openai::OpenAiModel;
pub use scripted::ScriptedModel;
pub use structured::{generate_structured, OutputSchema, Structured};
pub use types::{ChatMessage, ChatRequest, ChatResponse, TokenUsage, ToolCall, ToolChoice, ToolSpec};

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelBackend {
    #[default]
    Anthropic,
    OpenAi,
    /// In-process scripted model.
    Scripted,
}

impl std::fmt::Display for ModelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModelBackend::Anthropic => "anthropic",
            ModelBackend::OpenAi => "open_ai",
            ModelBackend::Scripted => "scripted",
        };
        write!(f, "{}", name)
    }
}

/// A chat-capable model with tool calling.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn backend(&self) -> ModelBackend;

    /// Provider model identifier, recorded on every review result.
    fn model_name(&self) -> &str;

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ModelError>;
}

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";
const DEFAULT_MAX_TOKENS: u32 = 4096;

fn default_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

fn default_request_timeout() -> u64 {
    120
}

/// Provider selection and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default)]
    pub backend: ModelBackend,

    #[serde(default = "default_model")]
    pub model: String,

    /// Override of the provider endpoint.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Falls back to the provider's conventional environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default)]
    pub temperature: Option<f32>,

    /// HTTP-level timeout. Callers apply their own, tighter budgets.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            backend: ModelBackend::default(),
            model: default_model(),
            endpoint: None,
            api_key: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ModelSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Build the configured backend.
pub fn build_model(settings: &ModelSettings) -> Result<Arc<dyn LanguageModel>, ModelError> {
    match settings.backend {
        ModelBackend::Anthropic => Ok(Arc::new(AnthropicModel::from_settings(settings)?)),
        ModelBackend::OpenAi => Ok(Arc::new(OpenAiModel::from_settings(settings)?)),
        ModelBackend::Scripted => Err(ModelError::Config {
            backend: ModelBackend::Scripted,
            message: "scripted models are constructed in code, not from settings".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults() {
        let settings = ModelSettings::default();
        assert_eq!(settings.backend, ModelBackend::Anthropic);
        assert_eq!(settings.max_tokens, 4096);
        assert_eq!(settings.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn scripted_backend_cannot_be_built_from_settings() {
        let settings = ModelSettings {
            backend: ModelBackend::Scripted,
            ..Default::default()
        };
        assert!(matches!(
            build_model(&settings),
            Err(ModelError::Config { .. })
        ));
    }

    #[test]
    fn settings_deserialize_partial() {
        let settings: ModelSettings =
            serde_json::from_str(r#"{"backend":"open_ai","model":"gpt-4o-mini"}"#).unwrap();
        assert_eq!(settings.backend, ModelBackend::OpenAi);
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.max_tokens, 4096);
    }
}
