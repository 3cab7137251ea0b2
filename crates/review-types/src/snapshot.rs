//! Snapshot fragments and the snapshot container fed to the analyzer.
//!
//! Each fragment is produced by exactly one collector. Fragments never refer
//! to each other; the [`DataSnapshot`] is the only place they meet.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::context::ReviewContext;
use crate::records::{IdentityVerificationStatus, SocialLink};
use crate::report::UsageInfo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationData {
    pub name: String,
    pub slug: String,
    pub status: String,
    pub website: Option<String>,
    pub email: Option<String>,
    pub about: Option<String>,
    pub product_description: Option<String>,
    pub intended_use: Option<String>,
    #[serde(default)]
    pub customer_acquisition: Vec<String>,
    pub future_annual_revenue: Option<i64>,
    #[serde(default)]
    pub switching: bool,
    pub switching_from: Option<String>,
    pub previous_annual_revenue: Option<i64>,
    #[serde(default)]
    pub socials: Vec<SocialLink>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
    pub description: Option<String>,
    /// `one_time`, `monthly`, `yearly`, ...
    pub billing: String,
    #[serde(default)]
    pub prices: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub archived: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductsData {
    pub total_count: usize,
    pub active_count: usize,
    #[serde(default)]
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementError {
    pub requirement: String,
    pub code: String,
    pub reason: String,
}

/// Payout account state, merged from the local record and the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountData {
    pub has_account: bool,
    pub status: Option<String>,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub business_type: Option<String>,
    pub billing_name: Option<String>,
    pub details_submitted: bool,
    pub charges_enabled: bool,
    pub payouts_enabled: bool,
    pub disabled_reason: Option<String>,
    #[serde(default)]
    pub requirements_currently_due: Vec<String>,
    #[serde(default)]
    pub requirements_past_due: Vec<String>,
    #[serde(default)]
    pub requirement_errors: Vec<RequirementError>,
    #[serde(default)]
    pub capabilities: BTreeMap<String, String>,
    pub business_url: Option<String>,
    pub business_name: Option<String>,
    pub support_email: Option<String>,
    pub support_country: Option<String>,
    pub merchant_category_code: Option<String>,
    /// Provider lookup was attempted and failed; only local state is present.
    #[serde(default)]
    pub provider_lookup_failed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityData {
    pub verification_status: IdentityVerificationStatus,
    pub session_status: Option<String>,
    pub error_code: Option<String>,
    pub error_reason: Option<String>,
    pub verified_first_name: Option<String>,
    pub verified_last_name: Option<String>,
    pub verified_address_country: Option<String>,
    pub document_type: Option<String>,
    pub document_issuing_country: Option<String>,
    #[serde(default)]
    pub lookup_failed: bool,
}

/// Tri-state classification of a metric against its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdStatus {
    Ok,
    Warn,
    Crit,
}

impl ThresholdStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ThresholdStatus::Ok => "ok",
            ThresholdStatus::Warn => "warn",
            ThresholdStatus::Crit => "crit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricFlag {
    pub threshold: String,
    pub value: f64,
    pub status: ThresholdStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentMetrics {
    pub total_payments: usize,
    pub succeeded_payments: usize,
    pub failed_payments: usize,
    pub total_amount_cents: i64,
    pub refund_count: usize,
    pub refund_amount_cents: i64,
    pub dispute_count: usize,
    pub chargeback_count: usize,
    pub dispute_amount_cents: i64,
    /// Percentages in [0, 100]; `None` when there is no denominator.
    pub authorization_rate: Option<f64>,
    pub refund_rate: Option<f64>,
    pub dispute_rate: Option<f64>,
    pub chargeback_rate: Option<f64>,
    pub risk_scored_payments: usize,
    pub p50_risk_score: Option<f64>,
    pub p90_risk_score: Option<f64>,
    /// Every metric that is not `ok` against the threshold table.
    #[serde(default)]
    pub flags: Vec<MetricFlag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorOrganization {
    pub slug: String,
    pub status: String,
    pub review_verdict: Option<String>,
    pub appeal_decision: Option<String>,
    pub blocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryData {
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub user_created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub prior_organizations: Vec<PriorOrganization>,
    #[serde(default)]
    pub has_prior_denials: bool,
    #[serde(default)]
    pub has_blocked_organizations: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutLinkSummary {
    pub label: Option<String>,
    pub success_url_domain: Option<String>,
    #[serde(default)]
    pub product_names: Vec<String>,
    pub benefit_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupData {
    #[serde(default)]
    pub checkout_links: Vec<CheckoutLinkSummary>,
    #[serde(default)]
    pub checkout_success_domains: Vec<String>,
    pub checkout_links_without_benefits: usize,
    pub webhook_endpoint_count: usize,
    #[serde(default)]
    pub webhook_domains: Vec<String>,
    pub api_token_count: u32,
    pub has_integration: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebsitePage {
    pub url: String,
    pub title: Option<String>,
    pub content: String,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebsiteData {
    pub base_url: String,
    #[serde(default)]
    pub pages: Vec<WebsitePage>,
    pub summary: Option<String>,
    pub scrape_error: Option<String>,
    #[serde(default)]
    pub usage: UsageInfo,
}

/// Everything collected for one review run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSnapshot {
    pub context: ReviewContext,
    pub organization: OrganizationData,
    pub products: ProductsData,
    pub account: AccountData,
    pub identity: Option<IdentityData>,
    pub metrics: PaymentMetrics,
    pub history: HistoryData,
    pub website: Option<WebsiteData>,
    pub setup: Option<SetupData>,
    pub collected_at: DateTime<Utc>,
}
