//! Organization review agent
//!
//! This crate provides the review pipeline for merchant organizations:
//! - Collectors turning domain records into snapshot fragments
//! - A website browsing sub-agent with a bounded page budget
//! - The risk analyzer with timeout and failure fallbacks
//! - The orchestrator entry point
//! - A versioned report envelope and an append-only history store

#![deny(unsafe_code)]

pub mod analyzer;
pub mod collectors;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod policy;
pub mod providers;
pub mod report;
pub mod repository;
pub mod store;
pub mod text;
pub mod thresholds;
pub mod website;

#[cfg(test)]
mod test_support;

pub use analyzer::{Analysis, RiskAnalyzer};
pub use config::ReviewAgentConfig;
pub use error::{
    BrowserError, PolicyError, ProviderError, ReportError, RepositoryError, ReviewError,
    ReviewResult,
};
pub use orchestrator::ReviewAgent;
pub use policy::{PolicyDocumentFetcher, FALLBACK_POLICY};
pub use providers::{PaymentsProvider, StaticProvider, StripeProvider};
pub use report::{
    build_agent_report, parse_agent_report, AgentReportV1, AgentReportV2, StoredAgentReport,
    LATEST_REPORT_VERSION,
};
pub use repository::{InMemoryRepository, ReviewFixture, ReviewRepository};
pub use store::{InMemoryReportStore, ReportStore};
pub use thresholds::{render_thresholds, Threshold, THRESHOLDS};
pub use website::{BrowserDriver, HttpBrowser};
