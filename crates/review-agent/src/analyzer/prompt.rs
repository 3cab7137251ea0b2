//! Prompt assembly.
//!
//! Sections appear in a fixed order: organization, products, setup (payment
//! threshold and manual reviews only), website, identity, payout account,
//! payment metrics, prior history, the policy document and finally the
//! calibration examples.

use std::fmt::Write as _;

use review_types::{
    AccountData, DataSnapshot, HistoryData, IdentityData, OrganizationData, PaymentMetrics,
    ProductsData, ReviewContext, SetupData, WebsiteData,
};

use crate::analyzer::calibration::CALIBRATION_EXAMPLES;
use crate::thresholds::render_thresholds;

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("not provided")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

fn money(cents: i64) -> String {
    format!("{:.2}", cents as f64 / 100.0)
}

fn percent(value: Option<f64>) -> String {
    value
        .map(|value| format!("{:.2}%", value))
        .unwrap_or_else(|| "n/a".to_string())
}

fn score(value: Option<f64>) -> String {
    value
        .map(|value| format!("{:.1}", value))
        .unwrap_or_else(|| "n/a".to_string())
}

fn organization_section(out: &mut String, org: &OrganizationData) {
    let _ = writeln!(out, "## Organization");
    let _ = writeln!(out, "Name: {}", org.name);
    let _ = writeln!(out, "Slug: {}", org.slug);
    let _ = writeln!(out, "Status: {}", org.status);
    let _ = writeln!(out, "Created: {}", org.created_at.format("%Y-%m-%d"));
    let _ = writeln!(out, "Website: {}", opt(&org.website));
    let _ = writeln!(out, "Support email: {}", opt(&org.email));
    let _ = writeln!(out, "About: {}", opt(&org.about));
    let _ = writeln!(out, "Product description: {}", opt(&org.product_description));
    let _ = writeln!(out, "Intended use: {}", opt(&org.intended_use));
    if !org.customer_acquisition.is_empty() {
        let _ = writeln!(
            out,
            "Customer acquisition: {}",
            org.customer_acquisition.join(", ")
        );
    }
    if let Some(revenue) = org.future_annual_revenue {
        let _ = writeln!(out, "Expected annual revenue: {}", revenue);
    }
    if org.switching {
        let _ = writeln!(
            out,
            "Switching from: {} (previous annual revenue: {})",
            opt(&org.switching_from),
            org.previous_annual_revenue
                .map(|revenue| revenue.to_string())
                .unwrap_or_else(|| "not provided".to_string())
        );
    }
    for social in &org.socials {
        let _ = writeln!(out, "Social: {} {}", social.platform, social.url);
    }
    out.push('\n');
}

fn products_section(out: &mut String, products: &ProductsData) {
    let _ = writeln!(out, "## Products");
    let _ = writeln!(
        out,
        "{} products, {} active",
        products.total_count, products.active_count
    );
    for product in &products.products {
        let _ = writeln!(
            out,
            "- {}{} [{}]: {}",
            product.name,
            if product.archived { " (archived)" } else { "" },
            product.billing,
            if product.prices.is_empty() {
                "no prices".to_string()
            } else {
                product.prices.join(", ")
            }
        );
        if let Some(description) = &product.description {
            let _ = writeln!(out, "  Description: {}", description);
        }
        if product.benefits.is_empty() {
            let _ = writeln!(out, "  Benefits: none");
        } else {
            let _ = writeln!(out, "  Benefits: {}", product.benefits.join("; "));
        }
    }
    out.push('\n');
}

fn setup_section(out: &mut String, setup: &SetupData) {
    let _ = writeln!(out, "## Setup and Integration");
    let _ = writeln!(out, "Checkout links: {}", setup.checkout_links.len());
    for link in &setup.checkout_links {
        let _ = writeln!(
            out,
            "- {}: products [{}], benefits {}, success URL domain {}",
            link.label.as_deref().unwrap_or("(unlabeled)"),
            link.product_names.join(", "),
            link.benefit_count,
            link.success_url_domain.as_deref().unwrap_or("none")
        );
    }
    let _ = writeln!(
        out,
        "Checkout links selling products without benefits: {}",
        setup.checkout_links_without_benefits
    );
    let _ = writeln!(
        out,
        "Checkout success domains: {}",
        if setup.checkout_success_domains.is_empty() {
            "none".to_string()
        } else {
            setup.checkout_success_domains.join(", ")
        }
    );
    let _ = writeln!(
        out,
        "Webhook endpoints: {} ({})",
        setup.webhook_endpoint_count,
        setup.webhook_domains.join(", ")
    );
    let _ = writeln!(out, "API tokens: {}", setup.api_token_count);
    let _ = writeln!(out, "Has integration: {}", yes_no(setup.has_integration));
    out.push('\n');
}

fn website_section(out: &mut String, website: &WebsiteData) {
    let _ = writeln!(out, "## Website");
    let _ = writeln!(out, "URL: {}", website.base_url);
    if let Some(error) = &website.scrape_error {
        let _ = writeln!(out, "Collection problem: {}", error);
    }
    if !website.pages.is_empty() {
        let _ = writeln!(out, "Pages visited:");
        for page in &website.pages {
            let _ = writeln!(
                out,
                "- {} ({})",
                page.url,
                page.title.as_deref().unwrap_or("untitled")
            );
        }
    }
    match &website.summary {
        Some(summary) => {
            let _ = writeln!(out, "Summary:\n{}", summary);
        }
        None => {
            let _ = writeln!(out, "Summary: not available");
        }
    }
    out.push('\n');
}

fn identity_section(out: &mut String, identity: Option<&IdentityData>) {
    let _ = writeln!(out, "## Identity Verification");
    let Some(identity) = identity else {
        let _ = writeln!(out, "Not collected for this review context.\n");
        return;
    };
    let _ = writeln!(out, "Status: {}", identity.verification_status.as_str());
    if identity.lookup_failed {
        let _ = writeln!(out, "Verification details could not be retrieved from the provider.");
    }
    if let Some(status) = &identity.session_status {
        let _ = writeln!(out, "Session status: {}", status);
    }
    if identity.error_code.is_some() || identity.error_reason.is_some() {
        let _ = writeln!(
            out,
            "Verification error: {} ({})",
            opt(&identity.error_code),
            opt(&identity.error_reason)
        );
    }
    if identity.verified_first_name.is_some() || identity.verified_last_name.is_some() {
        let _ = writeln!(
            out,
            "Verified name: {} {}",
            identity.verified_first_name.as_deref().unwrap_or(""),
            identity.verified_last_name.as_deref().unwrap_or("")
        );
    }
    if let Some(country) = &identity.verified_address_country {
        let _ = writeln!(out, "Verified address country: {}", country);
    }
    if identity.document_type.is_some() {
        let _ = writeln!(
            out,
            "Document: {} issued in {}",
            opt(&identity.document_type),
            opt(&identity.document_issuing_country)
        );
    }
    out.push('\n');
}

fn account_section(out: &mut String, account: &AccountData) {
    let _ = writeln!(out, "## Payout Account");
    if !account.has_account {
        let _ = writeln!(out, "No payout account linked.\n");
        return;
    }
    if account.provider_lookup_failed {
        let _ = writeln!(out, "Provider account details could not be retrieved; local state only.");
    }
    let _ = writeln!(out, "Status: {}", opt(&account.status));
    let _ = writeln!(out, "Country: {}", opt(&account.country));
    let _ = writeln!(out, "Currency: {}", opt(&account.currency));
    let _ = writeln!(out, "Business type: {}", opt(&account.business_type));
    let _ = writeln!(out, "Billing name: {}", opt(&account.billing_name));
    let _ = writeln!(
        out,
        "Details submitted: {}, charges enabled: {}, payouts enabled: {}",
        yes_no(account.details_submitted),
        yes_no(account.charges_enabled),
        yes_no(account.payouts_enabled)
    );
    if let Some(reason) = &account.disabled_reason {
        let _ = writeln!(out, "DISABLED by provider: {}", reason);
    }
    if !account.requirements_past_due.is_empty() {
        let _ = writeln!(
            out,
            "Requirements past due: {}",
            account.requirements_past_due.join(", ")
        );
    }
    if !account.requirements_currently_due.is_empty() {
        let _ = writeln!(
            out,
            "Requirements currently due: {}",
            account.requirements_currently_due.join(", ")
        );
    }
    if !account.requirement_errors.is_empty() {
        let _ = writeln!(out, "Provider verification errors:");
        for error in &account.requirement_errors {
            let _ = writeln!(
                out,
                "- {}: {} ({})",
                error.requirement, error.code, error.reason
            );
        }
    }
    let inactive: Vec<String> = account
        .capabilities
        .iter()
        .filter(|(_, status)| status.as_str() != "active")
        .map(|(name, status)| format!("{} ({})", name, status))
        .collect();
    if !inactive.is_empty() {
        let _ = writeln!(out, "Inactive capabilities: {}", inactive.join(", "));
    }
    if account.business_url.is_some() || account.business_name.is_some() {
        let _ = writeln!(
            out,
            "Business profile: {} {}",
            opt(&account.business_name),
            opt(&account.business_url)
        );
    }
    if let Some(country) = &account.support_country {
        let _ = writeln!(out, "Support address country: {}", country);
    }
    if let Some(email) = &account.support_email {
        let _ = writeln!(out, "Support email: {}", email);
    }
    if let Some(mcc) = &account.merchant_category_code {
        let _ = writeln!(out, "Merchant category code: {}", mcc);
    }
    out.push('\n');
}

fn metrics_section(out: &mut String, metrics: &PaymentMetrics) {
    let _ = writeln!(out, "## Payment Metrics");
    if metrics.total_payments == 0 {
        let _ = writeln!(out, "No payments processed yet.");
    } else {
        let _ = writeln!(
            out,
            "Payments: {} total, {} succeeded, {} failed; volume {}",
            metrics.total_payments,
            metrics.succeeded_payments,
            metrics.failed_payments,
            money(metrics.total_amount_cents)
        );
        let _ = writeln!(
            out,
            "Refunds: {} ({}); disputes: {} ({}), lost: {}",
            metrics.refund_count,
            money(metrics.refund_amount_cents),
            metrics.dispute_count,
            money(metrics.dispute_amount_cents),
            metrics.chargeback_count
        );
        let _ = writeln!(
            out,
            "Authorization rate: {}; refund rate: {}; dispute rate: {}; chargeback rate: {}",
            percent(metrics.authorization_rate),
            percent(metrics.refund_rate),
            percent(metrics.dispute_rate),
            percent(metrics.chargeback_rate)
        );
        let _ = writeln!(
            out,
            "Risk scores ({} payments): P50 {}, P90 {}",
            metrics.risk_scored_payments,
            score(metrics.p50_risk_score),
            score(metrics.p90_risk_score)
        );
    }
    if metrics.flags.is_empty() {
        let _ = writeln!(out, "Threshold flags: none");
    } else {
        let _ = writeln!(out, "Threshold flags:");
        for flag in &metrics.flags {
            let _ = writeln!(
                out,
                "- {} = {:.2} ({})",
                flag.threshold,
                flag.value,
                flag.status.as_str()
            );
        }
    }
    out.push('\n');
    out.push_str(&render_thresholds());
    out.push('\n');
}

fn history_section(out: &mut String, history: &HistoryData) {
    let _ = writeln!(out, "## Prior History");
    let Some(user_id) = history.user_id else {
        let _ = writeln!(out, "No admin user found.\n");
        return;
    };
    let _ = writeln!(out, "Admin user: {} ({})", opt(&history.user_email), user_id);
    if let Some(created_at) = history.user_created_at {
        let _ = writeln!(out, "User created: {}", created_at.format("%Y-%m-%d"));
    }
    let _ = writeln!(out, "Email verified: {}", yes_no(history.email_verified));
    if history.prior_organizations.is_empty() {
        let _ = writeln!(out, "Other organizations: none");
    } else {
        let _ = writeln!(out, "Other organizations:");
        for prior in &history.prior_organizations {
            let _ = writeln!(
                out,
                "- {}: status {}, review verdict {}, appeal {}{}",
                prior.slug,
                prior.status,
                opt(&prior.review_verdict),
                opt(&prior.appeal_decision),
                prior
                    .blocked_at
                    .map(|at| format!(", blocked {}", at.format("%Y-%m-%d")))
                    .unwrap_or_default()
            );
        }
    }
    let _ = writeln!(out, "Prior denials: {}", yes_no(history.has_prior_denials));
    let _ = writeln!(
        out,
        "Blocked organizations: {}",
        yes_no(history.has_blocked_organizations)
    );
    out.push('\n');
}

/// Build the analyzer prompt for a snapshot.
pub fn build_prompt(snapshot: &DataSnapshot, context: ReviewContext, policy: &str) -> String {
    let mut out = String::with_capacity(16 * 1024);
    let _ = writeln!(
        out,
        "Review the following organization. Review context: {}.\n",
        context.as_str()
    );

    organization_section(&mut out, &snapshot.organization);
    products_section(&mut out, &snapshot.products);
    if context.includes_setup() {
        if let Some(setup) = &snapshot.setup {
            setup_section(&mut out, setup);
        }
    }
    if let Some(website) = &snapshot.website {
        website_section(&mut out, website);
    }
    identity_section(&mut out, snapshot.identity.as_ref());
    account_section(&mut out, &snapshot.account);
    metrics_section(&mut out, &snapshot.metrics);
    history_section(&mut out, &snapshot.history);

    let _ = writeln!(out, "## Acceptable Use Policy\n\n{}\n", policy.trim());
    out.push_str(CALIBRATION_EXAMPLES);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::snapshot;
    use review_types::{SetupData, WebsiteData};

    fn position(haystack: &str, needle: &str) -> usize {
        haystack
            .find(needle)
            .unwrap_or_else(|| panic!("missing section {needle}"))
    }

    #[test]
    fn test_sections_are_ordered() {
        let mut snapshot = snapshot(ReviewContext::Manual);
        snapshot.setup = Some(SetupData::default());
        snapshot.website = Some(WebsiteData {
            base_url: "https://acme.dev/".to_string(),
            summary: Some("Sells licenses.".to_string()),
            ..Default::default()
        });

        let prompt = build_prompt(&snapshot, ReviewContext::Manual, "# Policy text");
        let order = [
            "## Organization",
            "## Products",
            "## Setup and Integration",
            "## Website",
            "## Identity Verification",
            "## Payout Account",
            "## Payment Metrics",
            "## Prior History",
            "## Acceptable Use Policy",
            "## Calibration Examples",
        ];
        let positions: Vec<usize> = order.iter().map(|section| position(&prompt, section)).collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(prompt.contains("# Policy text"));
        assert!(prompt.contains("AUTH_RATE"));
    }

    #[test]
    fn test_setup_only_for_threshold_and_manual() {
        let mut snapshot = snapshot(ReviewContext::Submission);
        snapshot.setup = Some(SetupData::default());
        let prompt = build_prompt(&snapshot, ReviewContext::Submission, "policy");
        assert!(!prompt.contains("## Setup and Integration"));
        assert!(!prompt.contains("## Website"));
        assert!(prompt.contains("Not collected for this review context."));
    }

    #[test]
    fn test_account_problems_are_called_out() {
        let mut snapshot = snapshot(ReviewContext::SetupComplete);
        snapshot.account.has_account = true;
        snapshot.account.disabled_reason = Some("rejected.fraud".to_string());
        snapshot.account.requirement_errors.push(review_types::RequirementError {
            requirement: "individual.id_number".to_string(),
            code: "invalid_value_other".to_string(),
            reason: "ID number invalid".to_string(),
        });
        let prompt = build_prompt(&snapshot, ReviewContext::SetupComplete, "policy");
        assert!(prompt.contains("DISABLED by provider: rejected.fraud"));
        assert!(prompt.contains("Provider verification errors:"));
    }
}
