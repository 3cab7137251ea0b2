//! Analyzer output and the orchestrator's result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::DataSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewVerdict {
    Approve,
    Deny,
    /// Modeled for stored data; current instructions never ask for it.
    NeedsHumanReview,
}

impl ReviewVerdict {
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewVerdict::Approve => "APPROVE",
            ReviewVerdict::Deny => "DENY",
            ReviewVerdict::NeedsHumanReview => "NEEDS_HUMAN_REVIEW",
        }
    }
}

impl std::fmt::Display for ReviewVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five fixed assessment axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewDimension {
    PolicyCompliance,
    ProductLegitimacy,
    IdentityTrust,
    FinancialRisk,
    PriorHistory,
}

impl ReviewDimension {
    pub const ALL: [ReviewDimension; 5] = [
        ReviewDimension::PolicyCompliance,
        ReviewDimension::ProductLegitimacy,
        ReviewDimension::IdentityTrust,
        ReviewDimension::FinancialRisk,
        ReviewDimension::PriorHistory,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewDimension::PolicyCompliance => "POLICY_COMPLIANCE",
            ReviewDimension::ProductLegitimacy => "PRODUCT_LEGITIMACY",
            ReviewDimension::IdentityTrust => "IDENTITY_TRUST",
            ReviewDimension::FinancialRisk => "FINANCIAL_RISK",
            ReviewDimension::PriorHistory => "PRIOR_HISTORY",
        }
    }
}

impl std::fmt::Display for ReviewDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier derived from a 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Total mapping: [0,25) LOW, [25,50) MEDIUM, [50,75) HIGH, [75,100] CRITICAL.
    /// Out-of-range and NaN scores are clamped first.
    pub fn from_score(score: f64) -> Self {
        let score = clamp_score(score);
        if score >= 75.0 {
            RiskLevel::Critical
        } else if score >= 50.0 {
            RiskLevel::High
        } else if score >= 25.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 100.0)
    }
}

pub fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAssessment {
    pub dimension: ReviewDimension,
    /// Risk score in [0, 100].
    pub score: f64,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Stamped from `score` by [`ReviewAgentReport::normalize`].
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}

impl DimensionAssessment {
    pub fn new(dimension: ReviewDimension, score: f64, confidence: f64) -> Self {
        let score = clamp_score(score);
        Self {
            dimension,
            score,
            confidence: clamp_confidence(confidence),
            risk_level: RiskLevel::from_score(score),
            findings: Vec::new(),
            recommendation: String::new(),
        }
    }

    /// Placeholder for a dimension the model did not return.
    pub fn not_assessed(dimension: ReviewDimension) -> Self {
        let mut assessment = Self::new(dimension, 0.0, 0.0);
        assessment.recommendation = "Not assessed in this review.".to_string();
        assessment
    }

    pub fn with_finding(mut self, finding: impl Into<String>) -> Self {
        self.findings.push(finding.into());
        self
    }

    pub fn with_recommendation(mut self, recommendation: impl Into<String>) -> Self {
        self.recommendation = recommendation.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAgentReport {
    pub verdict: ReviewVerdict,
    pub overall_risk_score: f64,
    /// Internal reasoning for reviewers. May reference any signal.
    pub summary: String,
    /// Shown to the merchant. Must not leak internal signals.
    pub merchant_summary: String,
    #[serde(default)]
    pub violated_sections: Vec<String>,
    pub dimensions: Vec<DimensionAssessment>,
    #[serde(default)]
    pub recommended_action: String,
}

impl ReviewAgentReport {
    pub fn dimension(&self, dimension: ReviewDimension) -> Option<&DimensionAssessment> {
        self.dimensions.iter().find(|d| d.dimension == dimension)
    }

    /// Enforce one assessment per dimension in canonical order, clamp ranges
    /// and stamp every risk level from its score.
    pub fn normalize(&mut self) {
        self.overall_risk_score = clamp_score(self.overall_risk_score);

        let mut normalized = Vec::with_capacity(ReviewDimension::ALL.len());
        for dimension in ReviewDimension::ALL {
            let mut assessment = self
                .dimensions
                .iter()
                .find(|d| d.dimension == dimension)
                .cloned()
                .unwrap_or_else(|| DimensionAssessment::not_assessed(dimension));
            assessment.score = clamp_score(assessment.score);
            assessment.confidence = clamp_confidence(assessment.confidence);
            assessment.risk_level = RiskLevel::from_score(assessment.score);
            normalized.push(assessment);
        }
        self.dimensions = normalized;
    }
}

/// Token usage and estimated cost of model calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageInfo {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub estimated_cost_usd: Option<f64>,
}

impl UsageInfo {
    pub fn is_zero(&self) -> bool {
        self.input_tokens == 0
            && self.output_tokens == 0
            && self.total_tokens == 0
            && self.estimated_cost_usd.is_none()
    }

    pub fn merge(&self, other: &UsageInfo) -> UsageInfo {
        let estimated_cost_usd = match (self.estimated_cost_usd, other.estimated_cost_usd) {
            (Some(a), Some(b)) => Some(a + b),
            (Some(cost), None) | (None, Some(cost)) => Some(cost),
            (None, None) => None,
        };
        UsageInfo {
            input_tokens: self.input_tokens + other.input_tokens,
            output_tokens: self.output_tokens + other.output_tokens,
            total_tokens: self.total_tokens + other.total_tokens,
            estimated_cost_usd,
        }
    }
}

/// Output of one full review run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReviewResult {
    pub report: ReviewAgentReport,
    pub data_snapshot: DataSnapshot,
    pub model_used: String,
    pub duration_seconds: f64,
    pub usage: UsageInfo,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub error: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}
