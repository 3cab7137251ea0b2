//! Instruction text per review context.
//!
//! Each context maps to one immutable entry of [`CONTEXT_TABLE`]. Contexts
//! differ in which dimensions are left unscored and which check groups apply;
//! the shared preamble and verdict rules are identical for all of them.

use review_types::{ReviewContext, ReviewDimension};

const PREAMBLE: &str = "You are a risk analyst for a payments platform acting as merchant of \
record for software and digital products. You review organizations that want to sell through \
the platform and decide whether they may keep selling. You receive everything known about one \
organization and the platform's acceptable use policy. Assess the organization on five \
dimensions: POLICY_COMPLIANCE, PRODUCT_LEGITIMACY, IDENTITY_TRUST, FINANCIAL_RISK and \
PRIOR_HISTORY. Each dimension gets a risk score from 0 (no risk) to 100 (certain violation), a \
confidence from 0 to 1, concrete findings that cite the data, and a one-sentence \
recommendation.";

const VERDICT_RULES: &str = "Verdict rules:
- The verdict is exactly APPROVE or DENY. Never answer NEEDS_HUMAN_REVIEW.
- DENY sends the organization to a human reviewer; it is not a final rejection. Deny whenever \
you are not confident the organization is compliant.
- overall_risk_score reflects the worst credible risk across the assessed dimensions, not an \
average.
- violated_sections lists the policy section headings that are violated, empty when none are.
- summary is for internal reviewers and may cite any signal.
- merchant_summary is shown to the merchant. Keep it short and neutral. Never mention risk \
scores, fraud signals, identity or verification details, payment metrics, prior organizations, \
thresholds or any internal tooling.";

const SUBMISSION_CHECKS: &[&str] = &[
    "This review runs when the organization first submits its details. It has not verified \
     identity and has not processed payments.",
    "Treat a website that fails to load, times out or is still under construction leniently: \
     temporary unavailability alone is not a reason to deny.",
    "Treat a missing or incomplete payout account as expected at this stage.",
    "Focus on what the organization says it sells, whether that is allowed by the policy, and \
     whether its products and website agree with its description.",
];

const IDENTITY_ACCOUNT_CHECKS: &[&str] = &[
    "Identity verification errors, failed or abandoned verification sessions are strong \
     negative signals for IDENTITY_TRUST.",
    "Compare the countries of the payout account, the business support address and the \
     verified identity document. Unexplained mismatches raise IDENTITY_TRUST risk.",
    "Provider-reported requirement errors, past-due requirements, a disabled reason or \
     inactive capabilities on the payout account are strong negative signals.",
    "Cross-reference the verified name with the billing name, the organization name and the \
     business profile. Note when they describe different people or businesses.",
];

const FINANCIAL_CHECKS: &[&str] = &[
    "Assess FINANCIAL_RISK from payment metrics against the threshold table: critical \
     thresholds are strong negative signals, warnings need corroboration.",
    "A high share of failed payments, refunds or lost disputes suggests card testing, \
     unfulfilled products or misleading sales.",
];

const SETUP_CHECKS: &[&str] = &[
    "Compare checkout success URL domains with the organization's website domain. Sales that \
     return buyers to an unrelated domain suggest the platform is used for another business.",
    "Checkout links selling products that carry no fulfillable benefit are suspicious unless \
     webhooks or API tokens show the merchant fulfils orders through its own integration.",
    "Webhook endpoint domains should belong to the merchant's own infrastructure.",
];

const MANUAL_CHECKS: &[&str] = &[
    "This review was requested by a human reviewer. Be thorough: state which signals are \
     missing and what a reviewer should verify by hand.",
];

/// Static instruction entry for one review context.
#[derive(Debug)]
pub struct ContextInstructions {
    pub context: ReviewContext,
    /// Dimensions the model reports with score 0 and confidence 0.
    pub skipped: &'static [ReviewDimension],
    pub checks: &'static [&'static [&'static str]],
}

pub static CONTEXT_TABLE: [ContextInstructions; 4] = [
    ContextInstructions {
        context: ReviewContext::Submission,
        skipped: &[ReviewDimension::IdentityTrust, ReviewDimension::FinancialRisk],
        checks: &[SUBMISSION_CHECKS],
    },
    ContextInstructions {
        context: ReviewContext::SetupComplete,
        skipped: &[ReviewDimension::FinancialRisk],
        checks: &[IDENTITY_ACCOUNT_CHECKS],
    },
    ContextInstructions {
        context: ReviewContext::Threshold,
        skipped: &[],
        checks: &[IDENTITY_ACCOUNT_CHECKS, FINANCIAL_CHECKS, SETUP_CHECKS],
    },
    ContextInstructions {
        context: ReviewContext::Manual,
        skipped: &[],
        checks: &[
            IDENTITY_ACCOUNT_CHECKS,
            FINANCIAL_CHECKS,
            SETUP_CHECKS,
            MANUAL_CHECKS,
        ],
    },
];

pub fn context_entry(context: ReviewContext) -> &'static ContextInstructions {
    CONTEXT_TABLE
        .iter()
        .find(|entry| entry.context == context)
        .unwrap_or(&CONTEXT_TABLE[3])
}

/// Dimensions fixed at zero for a context.
pub fn skipped_dimensions(context: ReviewContext) -> &'static [ReviewDimension] {
    context_entry(context).skipped
}

fn skip_directive(skipped: &[ReviewDimension]) -> Option<String> {
    if skipped.is_empty() {
        return None;
    }
    let names: Vec<&str> = skipped.iter().map(|dimension| dimension.as_str()).collect();
    Some(format!(
        "Do not assess {}. They are not meaningful yet: report each with score 0 and \
         confidence 0, no findings, and the recommendation \"Not assessed at this stage.\"",
        names.join(" and ")
    ))
}

/// Full system instructions for a review context.
pub fn instructions_for(context: ReviewContext) -> String {
    let entry = context_entry(context);

    let mut text = String::from(PREAMBLE);
    text.push_str(&format!("\n\nReview context: {}.\n", context.as_str()));
    if let Some(directive) = skip_directive(entry.skipped) {
        text.push_str(&directive);
        text.push('\n');
    } else {
        text.push_str("Assess all five dimensions.\n");
    }

    text.push_str("\nChecks for this review:\n");
    for line in entry.checks.iter().flat_map(|group| group.iter()) {
        text.push_str("- ");
        text.push_str(line);
        text.push('\n');
    }

    text.push('\n');
    text.push_str(VERDICT_RULES);
    text.push('\n');
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_context_has_an_entry() {
        for context in ReviewContext::ALL {
            assert_eq!(context_entry(context).context, context);
        }
    }

    #[test]
    fn test_submission_skips_identity_and_financial() {
        let text = instructions_for(ReviewContext::Submission);
        assert!(text.contains(
            "Do not assess IDENTITY_TRUST and FINANCIAL_RISK. They are not meaningful yet: report each with score 0 and confidence 0"
        ));
        assert!(text.contains("temporary unavailability alone is not a reason to deny"));
    }

    #[test]
    fn test_setup_complete_skips_financial_only() {
        let text = instructions_for(ReviewContext::SetupComplete);
        assert!(text.contains("Do not assess FINANCIAL_RISK."));
        assert!(!text.contains("Do not assess IDENTITY_TRUST"));
        assert!(text.contains("Compare the countries of the payout account"));
    }

    #[test]
    fn test_threshold_and_manual_assess_everything() {
        for context in [ReviewContext::Threshold, ReviewContext::Manual] {
            let text = instructions_for(context);
            assert!(!text.contains("Do not assess"));
            assert!(text.contains("Assess all five dimensions."));
            assert!(text.contains("checkout success URL domains"));
        }
    }

    #[test]
    fn test_manual_is_superset_of_threshold() {
        let manual = instructions_for(ReviewContext::Manual);
        for group in context_entry(ReviewContext::Threshold).checks {
            for line in group.iter() {
                assert!(manual.contains(line));
            }
        }
        assert!(manual.contains("requested by a human reviewer"));
    }

    #[test]
    fn test_verdict_space_is_binary() {
        for context in ReviewContext::ALL {
            let text = instructions_for(context);
            assert!(text.contains("The verdict is exactly APPROVE or DENY."));
        }
    }
}
