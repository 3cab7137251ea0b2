//! Identity verification of the admin user.

use review_types::{IdentityData, UserRecord};

use crate::providers::PaymentsProvider;

pub async fn collect_identity_data(
    user: Option<&UserRecord>,
    provider: Option<&dyn PaymentsProvider>,
) -> IdentityData {
    let Some(user) = user else {
        return IdentityData::default();
    };

    let mut data = IdentityData {
        verification_status: user.identity_verification_status,
        ..Default::default()
    };

    let (Some(provider), Some(session_id)) = (provider, user.identity_verification_id.as_deref())
    else {
        return data;
    };

    match provider.verification_session(session_id).await {
        Ok(session) => {
            data.document_type = session.document_type();
            data.document_issuing_country = session.document_issuing_country();
            data.session_status = Some(session.status);
            if let Some(error) = session.last_error {
                data.error_code = error.code;
                data.error_reason = error.reason;
            }
            if let Some(outputs) = session.verified_outputs {
                data.verified_first_name = outputs.first_name;
                data.verified_last_name = outputs.last_name;
                data.verified_address_country = outputs.address.and_then(|address| address.country);
            }
        }
        Err(e) => {
            tracing::warn!(
                user_id = %user.id,
                session_id = %session_id,
                error = %e,
                "Identity verification lookup failed, using local status"
            );
            data.lookup_failed = true;
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{StaticProvider, VerificationError, VerificationSession};
    use chrono::Utc;
    use review_types::IdentityVerificationStatus;
    use uuid::Uuid;

    fn user(session_id: Option<&str>) -> UserRecord {
        UserRecord {
            id: Uuid::new_v4(),
            email: "founder@acme.dev".to_string(),
            email_verified: true,
            identity_verification_status: IdentityVerificationStatus::Failed,
            identity_verification_id: session_id.map(str::to_string),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_no_user_is_default() {
        assert_eq!(collect_identity_data(None, None).await, IdentityData::default());
    }

    #[tokio::test]
    async fn test_session_details_are_copied() {
        let provider = StaticProvider::new().with_session(VerificationSession {
            id: "vs_1".to_string(),
            status: "requires_input".to_string(),
            last_error: Some(VerificationError {
                code: Some("selfie_face_mismatch".to_string()),
                reason: Some("The selfie does not match the document.".to_string()),
            }),
            ..Default::default()
        });

        let data = collect_identity_data(Some(&user(Some("vs_1"))), Some(&provider)).await;
        assert_eq!(data.verification_status, IdentityVerificationStatus::Failed);
        assert_eq!(data.session_status.as_deref(), Some("requires_input"));
        assert_eq!(data.error_code.as_deref(), Some("selfie_face_mismatch"));
        assert!(!data.lookup_failed);
    }

    #[tokio::test]
    async fn test_lookup_failure_keeps_local_status() {
        let provider = StaticProvider::unavailable();
        let data = collect_identity_data(Some(&user(Some("vs_1"))), Some(&provider)).await;
        assert_eq!(data.verification_status, IdentityVerificationStatus::Failed);
        assert!(data.lookup_failed);
        assert!(data.session_status.is_none());
    }

    #[tokio::test]
    async fn test_no_attempt_skips_lookup() {
        let provider = StaticProvider::unavailable();
        let data = collect_identity_data(Some(&user(None)), Some(&provider)).await;
        assert!(!data.lookup_failed);
    }
}
