//! Payments provider lookups used by the identity and account collectors.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::config::PaymentsConfig;
use crate::error::ProviderError;
use crate::text::truncate;

pub const SECRET_KEY_ENV_VAR: &str = "STRIPE_SECRET_KEY";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerificationError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerifiedAddress {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerifiedOutputs {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address: Option<VerifiedAddress>,
}

/// Identity verification session as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerificationSession {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub last_error: Option<VerificationError>,
    #[serde(default)]
    pub verified_outputs: Option<VerifiedOutputs>,
    /// Either a report id or the expanded report object.
    #[serde(default)]
    pub last_verification_report: Option<Value>,
}

impl VerificationSession {
    fn document_field(&self, field: &str) -> Option<String> {
        self.last_verification_report
            .as_ref()?
            .get("document")?
            .get(field)?
            .as_str()
            .map(str::to_string)
    }

    pub fn document_type(&self) -> Option<String> {
        self.document_field("type")
    }

    pub fn document_issuing_country(&self) -> Option<String> {
        self.document_field("issuing_country")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderRequirementError {
    #[serde(default)]
    pub requirement: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountRequirements {
    #[serde(default)]
    pub currently_due: Vec<String>,
    #[serde(default)]
    pub past_due: Vec<String>,
    #[serde(default)]
    pub disabled_reason: Option<String>,
    #[serde(default)]
    pub errors: Vec<ProviderRequirementError>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SupportAddress {
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BusinessProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub support_email: Option<String>,
    #[serde(default)]
    pub support_address: Option<SupportAddress>,
    #[serde(default)]
    pub mcc: Option<String>,
}

/// Connected payout account as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderAccount {
    pub id: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub default_currency: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    #[serde(default)]
    pub charges_enabled: bool,
    #[serde(default)]
    pub payouts_enabled: bool,
    #[serde(default)]
    pub details_submitted: bool,
    #[serde(default)]
    pub requirements: Option<AccountRequirements>,
    #[serde(default)]
    pub capabilities: BTreeMap<String, String>,
    #[serde(default)]
    pub business_profile: Option<BusinessProfile>,
}

/// Secondary lookups against the payments provider.
#[async_trait]
pub trait PaymentsProvider: Send + Sync {
    async fn verification_session(&self, id: &str) -> Result<VerificationSession, ProviderError>;

    async fn account(&self, id: &str) -> Result<ProviderAccount, ProviderError>;
}

/// Stripe REST client.
pub struct StripeProvider {
    client: Client,
    api_base: String,
    secret_key: String,
}

impl std::fmt::Debug for StripeProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeProvider")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl StripeProvider {
    pub fn from_config(config: &PaymentsConfig) -> Result<Self, ProviderError> {
        let secret_key = config
            .secret_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(SECRET_KEY_ENV_VAR).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "no secret key configured and {} is not set",
                    SECRET_KEY_ENV_VAR
                ))
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let response = self
            .client
            .get(format!("{}{}", self.api_base, path))
            .bearer_auth(&self.secret_key)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| truncate(body, 320))
}

#[async_trait]
impl PaymentsProvider for StripeProvider {
    async fn verification_session(&self, id: &str) -> Result<VerificationSession, ProviderError> {
        self.get(
            &format!("/v1/identity/verification_sessions/{}", id),
            &[
                ("expand[]", "verified_outputs"),
                ("expand[]", "last_verification_report"),
            ],
        )
        .await
    }

    async fn account(&self, id: &str) -> Result<ProviderAccount, ProviderError> {
        self.get(&format!("/v1/accounts/{}", id), &[]).await
    }
}

/// Provider answering from canned responses. Unknown ids are 404s.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticProvider {
    #[serde(default)]
    pub verification_sessions: HashMap<String, VerificationSession>,
    #[serde(default)]
    pub accounts: HashMap<String, ProviderAccount>,
    /// Every call fails with a transport error.
    #[serde(default)]
    pub unavailable: bool,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_session(mut self, session: VerificationSession) -> Self {
        self.verification_sessions.insert(session.id.clone(), session);
        self
    }

    pub fn with_account(mut self, account: ProviderAccount) -> Self {
        self.accounts.insert(account.id.clone(), account);
        self
    }

    fn lookup<T: Clone>(&self, map: &HashMap<String, T>, id: &str) -> Result<T, ProviderError> {
        if self.unavailable {
            return Err(ProviderError::Transport("provider unavailable".to_string()));
        }
        map.get(id).cloned().ok_or_else(|| ProviderError::Api {
            status: 404,
            message: format!("No such object: '{}'", id),
        })
    }
}

#[async_trait]
impl PaymentsProvider for StaticProvider {
    async fn verification_session(&self, id: &str) -> Result<VerificationSession, ProviderError> {
        self.lookup(&self.verification_sessions, id)
    }

    async fn account(&self, id: &str) -> Result<ProviderAccount, ProviderError> {
        self.lookup(&self.accounts, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> StripeProvider {
        StripeProvider::from_config(&PaymentsConfig {
            api_base: server.uri(),
            secret_key: Some("sk_test_123".to_string()),
            timeout_secs: 2,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_verification_session_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/identity/verification_sessions/vs_1"))
            .and(header("authorization", "Bearer sk_test_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "vs_1",
                "status": "verified",
                "verified_outputs": {
                    "first_name": "Ada",
                    "last_name": "Lovelace",
                    "address": {"country": "GB"}
                },
                "last_verification_report": {
                    "id": "vr_1",
                    "document": {"type": "passport", "issuing_country": "GB"}
                }
            })))
            .mount(&server)
            .await;

        let session = provider_for(&server).verification_session("vs_1").await.unwrap();
        assert_eq!(session.status, "verified");
        assert_eq!(session.document_type().as_deref(), Some("passport"));
        assert_eq!(session.document_issuing_country().as_deref(), Some("GB"));
        assert_eq!(
            session.verified_outputs.unwrap().first_name.as_deref(),
            Some("Ada")
        );
    }

    #[test]
    fn test_unexpanded_report_has_no_document() {
        let session: VerificationSession = serde_json::from_value(json!({
            "id": "vs_2",
            "status": "requires_input",
            "last_error": {"code": "document_expired", "reason": "The document is expired."},
            "last_verification_report": "vr_2"
        }))
        .unwrap();
        assert!(session.document_type().is_none());
        assert_eq!(
            session.last_error.unwrap().code.as_deref(),
            Some("document_expired")
        );
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/accounts/acct_missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"message": "No such account: 'acct_missing'", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = provider_for(&server).account("acct_missing").await.unwrap_err();
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("No such account"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticProvider::new().with_account(ProviderAccount {
            id: "acct_1".to_string(),
            charges_enabled: true,
            ..Default::default()
        });
        assert!(provider.account("acct_1").await.unwrap().charges_enabled);
        assert!(matches!(
            provider.account("acct_2").await,
            Err(ProviderError::Api { status: 404, .. })
        ));
        assert!(matches!(
            StaticProvider::unavailable().verification_session("vs_1").await,
            Err(ProviderError::Transport(_))
        ));
    }

    #[test]
    fn test_missing_secret_key_is_not_configured() {
        if std::env::var(SECRET_KEY_ENV_VAR).is_ok() {
            return;
        }
        let result = StripeProvider::from_config(&PaymentsConfig::default());
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }
}
