//! Synthetic reports used when the model call does not produce one.
//!
//! Both variants deny, which routes the organization to a human reviewer.
//! Error detail goes only into the internal summary and findings.

use std::time::Duration;

use review_types::{DimensionAssessment, ReviewAgentReport, ReviewDimension, ReviewVerdict};

use crate::text::truncate;

pub const FALLBACK_RISK_SCORE: f64 = 50.0;

pub const GENERIC_MERCHANT_SUMMARY: &str = "Your organization needs additional review by our \
team before it can continue. We will contact you by email if we need more information.";

const MAX_ERROR_CHARS: usize = 500;

fn synthetic_report(finding: String, summary: String) -> ReviewAgentReport {
    let mut report = ReviewAgentReport {
        verdict: ReviewVerdict::Deny,
        overall_risk_score: FALLBACK_RISK_SCORE,
        summary,
        merchant_summary: GENERIC_MERCHANT_SUMMARY.to_string(),
        violated_sections: Vec::new(),
        dimensions: vec![DimensionAssessment::new(
            ReviewDimension::PolicyCompliance,
            FALLBACK_RISK_SCORE,
            0.0,
        )
        .with_finding(finding)
        .with_recommendation("Review this organization manually.")],
        recommended_action: "Route to a human reviewer.".to_string(),
    };
    report.normalize();
    report
}

pub fn timeout_report(timeout: Duration) -> ReviewAgentReport {
    synthetic_report(
        format!("Automated analysis timed out after {}s.", timeout.as_secs()),
        format!(
            "Automated analysis timed out after {}s; no model assessment is available.",
            timeout.as_secs()
        ),
    )
}

pub fn failure_report(error: &str) -> ReviewAgentReport {
    let error = truncate(error, MAX_ERROR_CHARS);
    synthetic_report(
        format!("Automated analysis failed: {}", error),
        format!("Automated analysis failed; no model assessment is available. Error: {}", error),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_report_shape() {
        let report = timeout_report(Duration::from_secs(60));
        assert_eq!(report.verdict, ReviewVerdict::Deny);
        assert_eq!(report.overall_risk_score, 50.0);
        assert_eq!(report.dimensions.len(), 5);
        let policy = report.dimension(ReviewDimension::PolicyCompliance).unwrap();
        assert!(policy.findings[0].contains("timed out"));
        assert_eq!(report.merchant_summary, GENERIC_MERCHANT_SUMMARY);
    }

    #[test]
    fn test_failure_report_keeps_error_internal() {
        let secret = "upstream 500: api key sk-live-abc rejected";
        let report = failure_report(secret);
        assert!(report.summary.contains(secret));
        assert!(!report.merchant_summary.contains("sk-live"));
        assert_eq!(
            report.dimension(ReviewDimension::FinancialRisk).unwrap().score,
            0.0
        );
    }

    #[test]
    fn test_long_errors_are_truncated() {
        let report = failure_report(&"x".repeat(5_000));
        assert!(report.summary.len() < 1_000);
    }
}
