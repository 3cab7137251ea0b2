//! Other organizations owned by the same admin user.

use review_types::{
    HistoryData, OrganizationStatus, PriorOrganization, PriorOrganizationRecord, UserRecord,
};
use uuid::Uuid;

fn is_denial(record: &PriorOrganizationRecord) -> bool {
    record.status == OrganizationStatus::Denied
        || record
            .review_verdict
            .as_deref()
            .is_some_and(|verdict| verdict.eq_ignore_ascii_case("DENY"))
}

pub fn collect_history_data(
    user: Option<&UserRecord>,
    organizations: &[PriorOrganizationRecord],
    current_organization_id: Uuid,
) -> HistoryData {
    let Some(user) = user else {
        return HistoryData::default();
    };

    let mut prior: Vec<&PriorOrganizationRecord> = organizations
        .iter()
        .filter(|record| record.id != current_organization_id)
        .collect();
    prior.sort_by_key(|record| record.created_at);

    HistoryData {
        user_id: Some(user.id),
        user_email: Some(user.email.clone()),
        user_created_at: Some(user.created_at),
        email_verified: user.email_verified,
        has_prior_denials: prior.iter().any(|record| is_denial(record)),
        has_blocked_organizations: prior.iter().any(|record| {
            record.status == OrganizationStatus::Blocked || record.blocked_at.is_some()
        }),
        prior_organizations: prior
            .into_iter()
            .map(|record| PriorOrganization {
                slug: record.slug.clone(),
                status: record.status.as_str().to_string(),
                review_verdict: record.review_verdict.clone(),
                appeal_decision: record.appeal_decision.clone(),
                blocked_at: record.blocked_at,
            })
            .collect(),
    }
}
