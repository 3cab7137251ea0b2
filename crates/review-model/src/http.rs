use std::time::Duration;

use reqwest::Client;

use crate::{ModelBackend, ModelError};

pub(crate) fn build_http_client(
    backend: ModelBackend,
    timeout: Duration,
) -> Result<Client, ModelError> {
    let mut builder = Client::builder().timeout(timeout);
    let allow_system_proxy = std::env::var("REVIEW_AGENT_USE_SYSTEM_PROXY")
        .map(|value| matches!(value.as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    if !allow_system_proxy {
        builder = builder.no_proxy();
    }

    builder.build().map_err(|e| ModelError::Config {
        backend,
        message: format!("failed to build HTTP client: {}", e),
    })
}

pub(crate) fn resolve_api_key(
    backend: ModelBackend,
    configured: Option<&str>,
    env_var: &str,
) -> Result<String, ModelError> {
    if let Some(key) = configured.filter(|key| !key.trim().is_empty()) {
        return Ok(key.to_string());
    }
    std::env::var(env_var)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| ModelError::Config {
            backend,
            message: format!("missing api key (set {} or model.api_key)", env_var),
        })
}

pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    let mut chars = value.chars();
    let truncated: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", truncated)
    } else {
        truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }

    #[test]
    fn configured_key_wins() {
        let key = resolve_api_key(ModelBackend::Anthropic, Some("sk-test"), "UNSET_FOR_TEST_XYZ")
            .expect("configured key");
        assert_eq!(key, "sk-test");
        assert!(resolve_api_key(ModelBackend::Anthropic, Some("  "), "UNSET_FOR_TEST_XYZ").is_err());
    }
}
