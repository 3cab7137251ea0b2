//! Error types for the review pipeline.
//!
//! Only [`ReviewError`] and [`ReportError`] ever reach callers. Provider,
//! policy and browser errors are absorbed where they occur.

use thiserror::Error;

/// Failures of the repository layer that supplies domain records.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record not found: {0}")]
    NotFound(String),

    #[error("repository backend error: {0}")]
    Backend(String),
}

/// Failures talking to the payments provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("provider is not configured: {0}")]
    NotConfigured(String),
}

/// Failures fetching the acceptable-use policy document.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("policy request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("policy endpoint returned HTTP {0}")]
    HttpStatus(u16),

    #[error("policy document is empty")]
    Empty,
}

/// Failures of the headless browser driver.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("navigation to {url} timed out after {seconds}s")]
    NavigationTimeout { url: String, seconds: u64 },

    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("{url} is not an HTML page ({content_type})")]
    NotHtml { url: String, content_type: String },
}

/// Orchestrator-level failure. There is no safe default for a missing snapshot.
#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Failures reading or writing persisted report envelopes.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("unsupported report version: {0}")]
    UnsupportedVersion(u64),

    #[error("report version is not an integer: {0}")]
    InvalidVersion(String),

    #[error("malformed report payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("report store error: {0}")]
    Store(String),
}

pub type ReviewResult<T> = Result<T, ReviewError>;
