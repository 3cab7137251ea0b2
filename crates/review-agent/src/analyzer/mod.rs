//! Risk analyzer.
//!
//! One structured model call per review. The policy document is resolved
//! first; the model call alone is bounded by the analyzer timeout. Timeouts
//! and failures never escape: they produce a fallback DENY report so the
//! organization lands in front of a human reviewer.

pub mod calibration;
pub mod fallback;
pub mod instructions;
pub mod prompt;
pub mod schema;

use std::sync::Arc;
use std::time::Duration;

use review_model::{generate_structured, pricing, LanguageModel};
use review_types::{DataSnapshot, ReviewAgentReport, ReviewContext, UsageInfo};

use crate::policy::PolicyDocumentFetcher;

pub use fallback::{failure_report, timeout_report, FALLBACK_RISK_SCORE, GENERIC_MERCHANT_SUMMARY};
pub use instructions::{instructions_for, skipped_dimensions, CONTEXT_TABLE};
pub use prompt::build_prompt;
pub use schema::{review_output_schema, SUBMIT_REVIEW_TOOL};

/// Outcome of one analyzer run.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub report: ReviewAgentReport,
    pub usage: UsageInfo,
    pub timed_out: bool,
    /// Model error message when the fallback report was used.
    pub error: Option<String>,
}

pub struct RiskAnalyzer {
    model: Arc<dyn LanguageModel>,
    policy: Arc<PolicyDocumentFetcher>,
}

impl RiskAnalyzer {
    pub fn new(model: Arc<dyn LanguageModel>, policy: Arc<PolicyDocumentFetcher>) -> Self {
        Self { model, policy }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    pub async fn analyze(
        &self,
        snapshot: &DataSnapshot,
        context: ReviewContext,
        timeout: Duration,
    ) -> Analysis {
        let policy = self.policy.get().await;
        let instructions = instructions_for(context);
        let prompt = build_prompt(snapshot, context, &policy);
        let schema = review_output_schema();

        let call = generate_structured::<ReviewAgentReport>(
            self.model.as_ref(),
            &instructions,
            prompt,
            &schema,
        );

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(structured)) => {
                let mut report = structured.value;
                report.normalize();
                let usage = pricing::usage_info(self.model.model_name(), &structured.usage);
                tracing::debug!(
                    context = %context,
                    verdict = %report.verdict,
                    risk_score = report.overall_risk_score,
                    tokens = usage.total_tokens,
                    "Analysis completed"
                );
                Analysis {
                    report,
                    usage,
                    timed_out: false,
                    error: None,
                }
            }
            Ok(Err(e)) => {
                tracing::error!(context = %context, error = %e, "Analysis failed, using fallback report");
                Analysis {
                    report: failure_report(&e.to_string()),
                    usage: UsageInfo::default(),
                    timed_out: false,
                    error: Some(e.to_string()),
                }
            }
            Err(_) => {
                tracing::warn!(
                    context = %context,
                    timeout_secs = timeout.as_secs(),
                    "Analysis timed out, using fallback report"
                );
                Analysis {
                    report: timeout_report(timeout),
                    usage: UsageInfo::default(),
                    timed_out: true,
                    error: None,
                }
            }
        }
    }
}

impl std::fmt::Debug for RiskAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiskAnalyzer")
            .field("model", &self.model.model_name())
            .finish()
    }
}
