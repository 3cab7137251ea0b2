//! Versioned persistence envelope for review results.
//!
//! Writes always produce the latest version. Reads accept every known
//! version and upgrade in memory; stored rows are never rewritten. Unknown
//! versions fail closed.

use chrono::{DateTime, Utc};
use review_types::{
    AgentReviewResult, DataSnapshot, DimensionAssessment, ReviewAgentReport, ReviewDimension,
    ReviewVerdict, RiskLevel, UsageInfo,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ReportError;

pub const LATEST_REPORT_VERSION: u64 = 2;

fn version_one() -> u64 {
    1
}

/// Dimension assessment as stored before risk levels were persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAssessmentV1 {
    pub dimension: ReviewDimension,
    pub score: f64,
    pub confidence: f64,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewAgentReportV1 {
    pub verdict: ReviewVerdict,
    pub overall_risk_score: f64,
    pub summary: String,
    pub merchant_summary: String,
    #[serde(default)]
    pub violated_sections: Vec<String>,
    pub dimensions: Vec<DimensionAssessmentV1>,
    #[serde(default)]
    pub recommended_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReportV1 {
    #[serde(default = "version_one")]
    pub version: u64,
    pub review_type: String,
    pub report: ReviewAgentReportV1,
    pub data_snapshot: DataSnapshot,
    pub model_used: String,
    pub duration_seconds: f64,
    #[serde(default)]
    pub usage: UsageInfo,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Current envelope. Every dimension carries its risk level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReportV2 {
    pub version: u64,
    pub review_type: String,
    pub report: ReviewAgentReport,
    pub data_snapshot: DataSnapshot,
    pub model_used: String,
    pub duration_seconds: f64,
    #[serde(default)]
    pub usage: UsageInfo,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
}

impl AgentReportV1 {
    /// Field-for-field copy; risk levels are derived from the stored scores.
    pub fn migrate(self) -> AgentReportV2 {
        let report = self.report;
        AgentReportV2 {
            version: LATEST_REPORT_VERSION,
            review_type: self.review_type,
            report: ReviewAgentReport {
                verdict: report.verdict,
                overall_risk_score: report.overall_risk_score,
                summary: report.summary,
                merchant_summary: report.merchant_summary,
                violated_sections: report.violated_sections,
                dimensions: report
                    .dimensions
                    .into_iter()
                    .map(|dimension| DimensionAssessment {
                        dimension: dimension.dimension,
                        score: dimension.score,
                        confidence: dimension.confidence,
                        risk_level: RiskLevel::from_score(dimension.score),
                        findings: dimension.findings,
                        recommendation: dimension.recommendation,
                    })
                    .collect(),
                recommended_action: report.recommended_action,
            },
            data_snapshot: self.data_snapshot,
            model_used: self.model_used,
            duration_seconds: self.duration_seconds,
            usage: self.usage,
            timed_out: self.timed_out,
            error: self.error,
            reviewed_at: self.reviewed_at,
        }
    }
}

impl AgentReportV2 {
    pub fn to_value(&self) -> Result<Value, ReportError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Every envelope version that can be read back.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredAgentReport {
    V1(AgentReportV1),
    V2(AgentReportV2),
}

impl StoredAgentReport {
    pub fn version(&self) -> u64 {
        match self {
            StoredAgentReport::V1(_) => 1,
            StoredAgentReport::V2(_) => 2,
        }
    }

    /// Upgrade to the latest version.
    ///
    /// Stored V2 rows are normalized on the way out, so every tier matches
    /// its score even when a row was written without one.
    pub fn upgrade(self) -> AgentReportV2 {
        match self {
            StoredAgentReport::V1(v1) => v1.migrate(),
            StoredAgentReport::V2(mut v2) => {
                v2.report.normalize();
                v2
            }
        }
    }
}

/// Build the envelope to persist for a finished review.
pub fn build_agent_report(result: &AgentReviewResult, review_type: &str) -> AgentReportV2 {
    AgentReportV2 {
        version: LATEST_REPORT_VERSION,
        review_type: review_type.to_string(),
        report: result.report.clone(),
        data_snapshot: result.data_snapshot.clone(),
        model_used: result.model_used.clone(),
        duration_seconds: result.duration_seconds,
        usage: result.usage.clone(),
        timed_out: result.timed_out,
        error: result.error.clone(),
        reviewed_at: Some(result.reviewed_at),
    }
}

/// Decode a stored envelope without upgrading it.
pub fn decode_stored_report(raw: &Value) -> Result<StoredAgentReport, ReportError> {
    let version = match raw.get("version") {
        None | Some(Value::Null) => 1,
        Some(value) => value
            .as_u64()
            .ok_or_else(|| ReportError::InvalidVersion(value.to_string()))?,
    };

    match version {
        1 => Ok(StoredAgentReport::V1(serde_json::from_value(raw.clone())?)),
        2 => Ok(StoredAgentReport::V2(serde_json::from_value(raw.clone())?)),
        other => Err(ReportError::UnsupportedVersion(other)),
    }
}

/// Read a stored envelope, upgrading legacy versions in memory.
///
/// A missing `version` key means version 1.
pub fn parse_agent_report(raw: &Value) -> Result<AgentReportV2, ReportError> {
    decode_stored_report(raw).map(StoredAgentReport::upgrade)
}
