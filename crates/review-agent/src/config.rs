//! Configuration for the review agent

use std::time::Duration;

use review_model::ModelSettings;
use serde::{Deserialize, Serialize};

/// Main review agent configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ReviewAgentConfig {
    /// Language model backend
    #[serde(default)]
    pub model: ModelSettings,

    /// Risk analyzer settings
    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    /// Website sub-agent settings
    #[serde(default)]
    pub website: WebsiteConfig,

    /// Acceptable-use policy document
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Payments provider API
    #[serde(default)]
    pub payments: PaymentsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Risk analyzer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Wall-clock budget for the model call
    #[serde(default = "default_analyzer_timeout")]
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_analyzer_timeout(),
        }
    }
}

impl AnalyzerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Website sub-agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteConfig {
    /// Collect website content at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Budget for the whole browsing run
    #[serde(default = "default_website_timeout")]
    pub overall_timeout_secs: u64,

    /// Budget for a single page navigation
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_secs: u64,

    /// Maximum page visits per run
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Characters of main content kept per page
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Same-domain links returned with each page
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// Target length of the final summary
    #[serde(default = "default_max_summary_words")]
    pub max_summary_words: usize,

    /// Upper bound on model turns, including the final answer
    #[serde(default = "default_max_turns")]
    pub max_turns: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            overall_timeout_secs: default_website_timeout(),
            navigation_timeout_secs: default_navigation_timeout(),
            max_pages: default_max_pages(),
            max_content_chars: default_max_content_chars(),
            max_links: default_max_links(),
            max_summary_words: default_max_summary_words(),
            max_turns: default_max_turns(),
            user_agent: default_user_agent(),
        }
    }
}

impl WebsiteConfig {
    pub fn overall_timeout(&self) -> Duration {
        Duration::from_secs(self.overall_timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

/// Policy document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Markdown acceptable-use policy
    #[serde(default = "default_policy_url")]
    pub url: String,

    #[serde(default = "default_policy_timeout")]
    pub timeout_secs: u64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            url: default_policy_url(),
            timeout_secs: default_policy_timeout(),
        }
    }
}

/// Payments provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default = "default_payments_api_base")]
    pub api_base: String,

    /// Secret key. Falls back to `STRIPE_SECRET_KEY`.
    #[serde(default)]
    pub secret_key: Option<String>,

    #[serde(default = "default_payments_timeout")]
    pub timeout_secs: u64,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            api_base: default_payments_api_base(),
            secret_key: None,
            timeout_secs: default_payments_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_analyzer_timeout() -> u64 {
    60
}

fn default_website_timeout() -> u64 {
    90
}

fn default_navigation_timeout() -> u64 {
    10
}

fn default_max_pages() -> usize {
    5
}

fn default_max_content_chars() -> usize {
    3_000
}

fn default_max_links() -> usize {
    20
}

fn default_max_summary_words() -> usize {
    500
}

fn default_max_turns() -> usize {
    10
}

fn default_user_agent() -> String {
    format!("review-agent/{} (+merchant review)", env!("CARGO_PKG_VERSION"))
}

fn default_policy_url() -> String {
    "https://policies.example.com/acceptable-use.md".to_string()
}

fn default_policy_timeout() -> u64 {
    10
}

fn default_payments_api_base() -> String {
    "https://api.stripe.com".to_string()
}

fn default_payments_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ReviewAgentConfig {
    /// Load configuration from defaults, an optional file and `REVIEW_AGENT__*` variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&ReviewAgentConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("REVIEW_AGENT")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReviewAgentConfig::default();
        assert_eq!(config.analyzer.timeout(), Duration::from_secs(60));
        assert_eq!(config.website.max_pages, 5);
        assert_eq!(config.website.navigation_timeout(), Duration::from_secs(10));
        assert_eq!(config.website.overall_timeout(), Duration::from_secs(90));
        assert_eq!(config.website.max_content_chars, 3_000);
        assert_eq!(config.website.max_links, 20);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ReviewAgentConfig =
            serde_json::from_str(r#"{"website": {"max_pages": 3}, "logging": {"json": true}}"#)
                .unwrap();
        assert_eq!(config.website.max_pages, 3);
        assert!(config.website.enabled);
        assert_eq!(config.website.max_links, 20);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_without_file() {
        let config = ReviewAgentConfig::load(None).unwrap();
        assert_eq!(config.policy.timeout_secs, 10);
        assert_eq!(config.payments.api_base, "https://api.stripe.com");
    }
}
