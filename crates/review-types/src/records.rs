//! Domain records supplied by the repository layer.
//!
//! These mirror the rows the platform database already holds. Collectors read
//! them and never mutate them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of an organization on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrganizationStatus {
    #[default]
    Created,
    Onboarding,
    UnderReview,
    Denied,
    Active,
    Blocked,
}

impl OrganizationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrganizationStatus::Created => "created",
            OrganizationStatus::Onboarding => "onboarding",
            OrganizationStatus::UnderReview => "under_review",
            OrganizationStatus::Denied => "denied",
            OrganizationStatus::Active => "active",
            OrganizationStatus::Blocked => "blocked",
        }
    }
}

/// Self-reported business details captured during onboarding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationDetails {
    #[serde(default)]
    pub about: Option<String>,
    #[serde(default)]
    pub product_description: Option<String>,
    #[serde(default)]
    pub intended_use: Option<String>,
    #[serde(default)]
    pub customer_acquisition: Vec<String>,
    #[serde(default)]
    pub future_annual_revenue: Option<i64>,
    #[serde(default)]
    pub switching: bool,
    #[serde(default)]
    pub switching_from: Option<String>,
    #[serde(default)]
    pub previous_annual_revenue: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub status: OrganizationStatus,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub details: OrganizationDetails,
    #[serde(default)]
    pub socials: Vec<SocialLink>,
    #[serde(default)]
    pub account_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub blocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdentityVerificationStatus {
    #[default]
    Unverified,
    Pending,
    Verified,
    Failed,
}

impl IdentityVerificationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IdentityVerificationStatus::Unverified => "unverified",
            IdentityVerificationStatus::Pending => "pending",
            IdentityVerificationStatus::Verified => "verified",
            IdentityVerificationStatus::Failed => "failed",
        }
    }
}

/// The organization's admin user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub identity_verification_status: IdentityVerificationStatus,
    /// Payments provider verification session id, if an attempt was started.
    #[serde(default)]
    pub identity_verification_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringInterval {
    Day,
    Week,
    Month,
    Year,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "amount_type", rename_all = "snake_case")]
pub enum PriceRecord {
    Fixed { amount_cents: i64, currency: String },
    Custom {
        #[serde(default)]
        minimum_amount_cents: Option<i64>,
        currency: String,
    },
    Free,
    Metered {
        unit_amount_cents: f64,
        currency: String,
        meter_name: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitKind {
    Custom,
    Discord,
    GithubRepository,
    Downloadables,
    LicenseKeys,
    MeterCredit,
}

impl BenefitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BenefitKind::Custom => "custom",
            BenefitKind::Discord => "discord",
            BenefitKind::GithubRepository => "github_repository",
            BenefitKind::Downloadables => "downloadables",
            BenefitKind::LicenseKeys => "license_keys",
            BenefitKind::MeterCredit => "meter_credit",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenefitRecord {
    pub id: Uuid,
    pub kind: BenefitKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub recurring_interval: Option<RecurringInterval>,
    #[serde(default)]
    pub prices: Vec<PriceRecord>,
    #[serde(default)]
    pub benefits: Vec<BenefitRecord>,
}

/// Linked payout account as stored locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: Uuid,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub business_type: Option<String>,
    /// Account id at the payments provider.
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub is_details_submitted: bool,
    #[serde(default)]
    pub is_charges_enabled: bool,
    #[serde(default)]
    pub is_payouts_enabled: bool,
    #[serde(default)]
    pub billing_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub status: PaymentStatus,
    pub amount_cents: i64,
    #[serde(default)]
    pub currency: Option<String>,
    /// Processor fraud score in [0, 100].
    #[serde(default)]
    pub risk_score: Option<u8>,
    #[serde(default)]
    pub decline_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundRecord {
    pub id: Uuid,
    pub amount_cents: i64,
    #[serde(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    Open,
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisputeRecord {
    pub id: Uuid,
    pub amount_cents: i64,
    pub status: DisputeStatus,
    #[serde(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// All payment-side activity for one organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentActivity {
    #[serde(default)]
    pub payments: Vec<PaymentRecord>,
    #[serde(default)]
    pub refunds: Vec<RefundRecord>,
    #[serde(default)]
    pub disputes: Vec<DisputeRecord>,
}

/// Another organization owned by the same admin user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorOrganizationRecord {
    pub id: Uuid,
    pub slug: String,
    pub status: OrganizationStatus,
    #[serde(default)]
    pub review_verdict: Option<String>,
    #[serde(default)]
    pub appeal_decision: Option<String>,
    #[serde(default)]
    pub blocked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutLinkRecord {
    pub id: Uuid,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookEndpointRecord {
    pub id: Uuid,
    pub url: String,
    #[serde(default)]
    pub enabled: bool,
}

/// Integration records used for setup signals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupRecords {
    #[serde(default)]
    pub checkout_links: Vec<CheckoutLinkRecord>,
    #[serde(default)]
    pub webhook_endpoints: Vec<WebhookEndpointRecord>,
    #[serde(default)]
    pub api_token_count: u32,
}
