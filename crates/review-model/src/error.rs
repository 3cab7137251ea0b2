use thiserror::Error;

use crate::ModelBackend;

/// Errors raised by language-model adapters.
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("{backend} backend is not configured: {message}")]
    Config {
        backend: ModelBackend,
        message: String,
    },

    #[error("{backend} request failed: {message}")]
    Transport {
        backend: ModelBackend,
        message: String,
    },

    #[error("{backend} error {status}: {body}")]
    Api {
        backend: ModelBackend,
        status: u16,
        body: String,
    },

    #[error("invalid {backend} response: {message}")]
    InvalidResponse {
        backend: ModelBackend,
        message: String,
    },

    #[error("model did not return structured output for '{tool}': {message}")]
    StructuredOutput { tool: String, message: String },
}

impl ModelError {
    pub fn transport(backend: ModelBackend, message: impl Into<String>) -> Self {
        Self::Transport {
            backend,
            message: message.into(),
        }
    }

    pub fn invalid_response(backend: ModelBackend, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            backend,
            message: message.into(),
        }
    }
}
