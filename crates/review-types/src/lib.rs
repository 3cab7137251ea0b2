//! # review-types
//!
//! Data model shared by the organization review engine:
//!
//! - **Records**: raw domain rows handed in by the repository layer
//! - **Snapshot**: typed fragments produced by collectors, bundled into a
//!   [`DataSnapshot`] per review run
//! - **Report**: the analyzer's [`ReviewAgentReport`] and the orchestrator's
//!   [`AgentReviewResult`]

#![deny(unsafe_code)]

pub mod context;
pub mod records;
pub mod report;
pub mod snapshot;

pub use context::{ParseContextError, ReviewContext};
pub use records::{
    AccountRecord, BenefitKind, BenefitRecord, CheckoutLinkRecord, DisputeRecord, DisputeStatus,
    IdentityVerificationStatus, OrganizationDetails, OrganizationRecord, OrganizationStatus,
    PaymentActivity, PaymentRecord, PaymentStatus, PriceRecord, PriorOrganizationRecord,
    ProductRecord, RecurringInterval, RefundRecord, SetupRecords, SocialLink, UserRecord,
    WebhookEndpointRecord,
};
pub use report::{
    clamp_confidence, clamp_score, AgentReviewResult, DimensionAssessment, ReviewAgentReport,
    ReviewDimension, ReviewVerdict, RiskLevel, UsageInfo,
};
pub use snapshot::{
    AccountData, CheckoutLinkSummary, DataSnapshot, HistoryData, IdentityData, MetricFlag,
    OrganizationData, PaymentMetrics, PriorOrganization, ProductSummary, ProductsData,
    RequirementError, SetupData, ThresholdStatus, WebsiteData, WebsitePage,
};
