//! Shared fixtures for unit tests.

use chrono::{TimeZone, Utc};
use review_types::{
    AccountData, DataSnapshot, HistoryData, OrganizationData, OrganizationDetails,
    OrganizationRecord, OrganizationStatus, PaymentMetrics, ProductsData, ReviewContext,
};
use uuid::Uuid;

pub(crate) fn organization_record() -> OrganizationRecord {
    OrganizationRecord {
        id: Uuid::new_v4(),
        slug: "acme".to_string(),
        name: "Acme Tools".to_string(),
        status: OrganizationStatus::UnderReview,
        website: Some("https://acme.dev".to_string()),
        email: Some("support@acme.dev".to_string()),
        details: OrganizationDetails {
            about: Some("We build developer tooling.".to_string()),
            product_description: Some("Licenses for a CLI profiler.".to_string()),
            intended_use: Some("Sell yearly licenses.".to_string()),
            ..Default::default()
        },
        socials: Vec::new(),
        account_id: None,
        created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        blocked_at: None,
    }
}

pub(crate) fn snapshot(context: ReviewContext) -> DataSnapshot {
    DataSnapshot {
        context,
        organization: OrganizationData {
            name: "Acme Tools".to_string(),
            slug: "acme".to_string(),
            status: "under_review".to_string(),
            website: Some("https://acme.dev".to_string()),
            email: Some("support@acme.dev".to_string()),
            about: Some("We build developer tooling.".to_string()),
            product_description: Some("Licenses for a CLI profiler.".to_string()),
            intended_use: Some("Sell yearly licenses.".to_string()),
            customer_acquisition: vec!["website".to_string()],
            future_annual_revenue: Some(50_000),
            switching: false,
            switching_from: None,
            previous_annual_revenue: None,
            socials: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        },
        products: ProductsData::default(),
        account: AccountData::default(),
        identity: None,
        metrics: PaymentMetrics::default(),
        history: HistoryData::default(),
        website: None,
        setup: None,
        collected_at: Utc.with_ymd_and_hms(2025, 3, 2, 9, 0, 0).unwrap(),
    }
}
