//! Few-shot calibration examples appended to every analyzer prompt.

pub const CALIBRATION_EXAMPLES: &str = r#"## Calibration Examples

These past decisions show how signals translate into scores. They are
illustrations, not data about the organization under review.

### Example 1: APPROVE
A two-person studio sells a desktop Markdown editor with license keys at 29 USD.
The website has pricing, documentation and a changelog. No prior organizations.
- POLICY_COMPLIANCE 5 (0.9): software with license keys is a supported product.
- PRODUCT_LEGITIMACY 10 (0.8): website, products and description agree.
- PRIOR_HISTORY 0 (0.9): no other organizations.
Verdict APPROVE, overall risk 10.

### Example 2: DENY, disguised prohibited business
The description says "educational content about markets". Products are
"VIP signals" subscriptions with a Discord benefit; the website promises
guaranteed monthly returns.
- POLICY_COMPLIANCE 90 (0.9): trading signals and investment advice are prohibited.
- PRODUCT_LEGITIMACY 70 (0.7): the description hides what is actually sold.
Verdict DENY, overall risk 90, violated section "Prohibited businesses".

### Example 3: DENY, identity and account mismatch
Verified identity document issued in one country, payout account in another,
support address in a third. The provider reports a verification document name
mismatch and payouts are disabled.
- IDENTITY_TRUST 80 (0.8): inconsistent countries plus a provider-reported name mismatch.
Verdict DENY, overall risk 80.

### Example 4: APPROVE despite an unreachable website at submission
A newly created organization selling a GitHub repository sponsorship; the
website timed out during review. Description and products are consistent and
allowed.
- POLICY_COMPLIANCE 10 (0.6), PRODUCT_LEGITIMACY 25 (0.5): allowed product, limited evidence.
Verdict APPROVE, overall risk 25. Temporary website unavailability is not penalized at submission.

### Example 5: DENY, payment metrics past critical thresholds
An organization selling templates has a 12% refund rate and a 1.1% dispute
rate with several lost disputes.
- FINANCIAL_RISK 85 (0.9): refund and dispute rates above critical thresholds.
Verdict DENY, overall risk 85.
"#;
