//! Payout account state.
//!
//! Local account rows carry only what onboarding stored. The provider is the
//! source of truth for capabilities, requirements and verification errors,
//! so its view wins wherever both exist.

use review_types::{AccountData, AccountRecord, RequirementError};

use crate::providers::{PaymentsProvider, ProviderAccount};

pub async fn collect_account_data(
    account: Option<&AccountRecord>,
    provider: Option<&dyn PaymentsProvider>,
) -> AccountData {
    let Some(account) = account else {
        return AccountData::default();
    };

    let mut data = AccountData {
        has_account: true,
        status: Some(account.status.clone()).filter(|status| !status.is_empty()),
        country: account.country.clone(),
        currency: account.currency.clone(),
        business_type: account.business_type.clone(),
        billing_name: account.billing_name.clone(),
        details_submitted: account.is_details_submitted,
        charges_enabled: account.is_charges_enabled,
        payouts_enabled: account.is_payouts_enabled,
        ..Default::default()
    };

    let (Some(provider), Some(provider_id)) = (provider, account.provider_id.as_deref()) else {
        return data;
    };

    match provider.account(provider_id).await {
        Ok(remote) => merge_provider_account(&mut data, remote),
        Err(e) => {
            tracing::warn!(
                account_id = %account.id,
                provider_id = %provider_id,
                error = %e,
                "Account lookup failed, using local account state"
            );
            data.provider_lookup_failed = true;
        }
    }

    data
}

fn merge_provider_account(data: &mut AccountData, remote: ProviderAccount) {
    data.charges_enabled = remote.charges_enabled;
    data.payouts_enabled = remote.payouts_enabled;
    data.details_submitted = remote.details_submitted;
    data.country = remote.country.or(data.country.take());
    data.currency = remote.default_currency.or(data.currency.take());
    data.business_type = remote.business_type.or(data.business_type.take());
    data.capabilities = remote.capabilities;

    if let Some(requirements) = remote.requirements {
        data.disabled_reason = requirements.disabled_reason;
        data.requirements_currently_due = requirements.currently_due;
        data.requirements_past_due = requirements.past_due;
        data.requirement_errors = requirements
            .errors
            .into_iter()
            .map(|error| RequirementError {
                requirement: error.requirement,
                code: error.code,
                reason: error.reason,
            })
            .collect();
    }

    if let Some(profile) = remote.business_profile {
        data.business_url = profile.url;
        data.business_name = profile.name;
        data.support_email = profile.support_email;
        data.support_country = profile.support_address.and_then(|address| address.country);
        data.merchant_category_code = profile.mcc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        AccountRequirements, BusinessProfile, ProviderRequirementError, StaticProvider,
        SupportAddress,
    };
    use uuid::Uuid;

    fn local_account(provider_id: Option<&str>) -> AccountRecord {
        AccountRecord {
            id: Uuid::new_v4(),
            status: "onboarding_started".to_string(),
            country: Some("US".to_string()),
            currency: Some("usd".to_string()),
            business_type: Some("individual".to_string()),
            provider_id: provider_id.map(str::to_string),
            is_details_submitted: true,
            is_charges_enabled: true,
            is_payouts_enabled: true,
            billing_name: Some("Ada Lovelace".to_string()),
        }
    }

    #[tokio::test]
    async fn test_no_account_is_all_defaults() {
        let provider = StaticProvider::unavailable();
        let data = collect_account_data(None, Some(&provider)).await;
        assert_eq!(data, AccountData::default());
        assert!(!data.has_account);
    }

    #[tokio::test]
    async fn test_local_only_without_provider() {
        let account = local_account(Some("acct_1"));
        let data = collect_account_data(Some(&account), None).await;
        assert!(data.has_account);
        assert!(data.charges_enabled);
        assert!(!data.provider_lookup_failed);
        assert_eq!(data.billing_name.as_deref(), Some("Ada Lovelace"));
    }

    #[tokio::test]
    async fn test_provider_state_wins() {
        let provider = StaticProvider::new().with_account(ProviderAccount {
            id: "acct_1".to_string(),
            country: Some("DE".to_string()),
            charges_enabled: false,
            payouts_enabled: false,
            details_submitted: true,
            requirements: Some(AccountRequirements {
                past_due: vec!["individual.verification.document".to_string()],
                disabled_reason: Some("requirements.past_due".to_string()),
                errors: vec![ProviderRequirementError {
                    requirement: "individual.verification.document".to_string(),
                    code: "verification_document_name_mismatch".to_string(),
                    reason: "Name does not match".to_string(),
                }],
                ..Default::default()
            }),
            business_profile: Some(BusinessProfile {
                url: Some("https://acme.dev".to_string()),
                support_address: Some(SupportAddress {
                    country: Some("NG".to_string()),
                }),
                ..Default::default()
            }),
            ..Default::default()
        });

        let account = local_account(Some("acct_1"));
        let data = collect_account_data(Some(&account), Some(&provider)).await;
        assert!(!data.charges_enabled);
        assert_eq!(data.country.as_deref(), Some("DE"));
        assert_eq!(data.currency.as_deref(), Some("usd"));
        assert_eq!(data.disabled_reason.as_deref(), Some("requirements.past_due"));
        assert_eq!(data.requirement_errors[0].code, "verification_document_name_mismatch");
        assert_eq!(data.support_country.as_deref(), Some("NG"));
    }

    #[tokio::test]
    async fn test_provider_failure_degrades() {
        let provider = StaticProvider::unavailable();
        let account = local_account(Some("acct_1"));
        let data = collect_account_data(Some(&account), Some(&provider)).await;
        assert!(data.has_account);
        assert!(data.provider_lookup_failed);
        assert!(data.charges_enabled);
    }
}
