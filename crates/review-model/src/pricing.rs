//! Per-model token pricing used for cost estimates.

use review_types::UsageInfo;

use crate::types::TokenUsage;

/// USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrice {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

/// Matched by longest model-name prefix.
const PRICES: &[(&str, ModelPrice)] = &[
    ("claude-opus-4", price(15.0, 75.0)),
    ("claude-sonnet-4", price(3.0, 15.0)),
    ("claude-3-7-sonnet", price(3.0, 15.0)),
    ("claude-3-5-sonnet", price(3.0, 15.0)),
    ("claude-haiku-4", price(1.0, 5.0)),
    ("claude-3-5-haiku", price(0.8, 4.0)),
    ("gpt-4.1-nano", price(0.1, 0.4)),
    ("gpt-4.1-mini", price(0.4, 1.6)),
    ("gpt-4.1", price(2.0, 8.0)),
    ("gpt-4o-mini", price(0.15, 0.6)),
    ("gpt-4o", price(2.5, 10.0)),
];

const fn price(input_per_million: f64, output_per_million: f64) -> ModelPrice {
    ModelPrice {
        input_per_million,
        output_per_million,
    }
}

pub fn price_for(model: &str) -> Option<ModelPrice> {
    PRICES
        .iter()
        .filter(|(prefix, _)| model.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, price)| *price)
}

pub fn estimate_cost(model: &str, usage: &TokenUsage) -> Option<f64> {
    price_for(model).map(|price| {
        (usage.input_tokens as f64 * price.input_per_million
            + usage.output_tokens as f64 * price.output_per_million)
            / 1_000_000.0
    })
}

/// Convert raw token counts into the persisted usage record.
pub fn usage_info(model: &str, usage: &TokenUsage) -> UsageInfo {
    UsageInfo {
        input_tokens: usage.input_tokens,
        output_tokens: usage.output_tokens,
        total_tokens: usage.total(),
        estimated_cost_usd: estimate_cost(model, usage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins() {
        let mini = price_for("gpt-4o-mini-2024-07-18").unwrap();
        assert_eq!(mini.input_per_million, 0.15);
        let full = price_for("gpt-4o-2024-08-06").unwrap();
        assert_eq!(full.input_per_million, 2.5);
        assert!(price_for("mystery-model").is_none());
    }

    #[test]
    fn cost_is_linear_in_tokens() {
        let usage = TokenUsage {
            input_tokens: 1_000_000,
            output_tokens: 100_000,
        };
        let cost = estimate_cost("claude-sonnet-4-5", &usage).unwrap();
        assert!((cost - 4.5).abs() < 1e-9);

        let info = usage_info("claude-sonnet-4-5", &usage);
        assert_eq!(info.total_tokens, 1_100_000);
    }

    #[test]
    fn unknown_model_has_no_cost() {
        let info = usage_info("scripted", &TokenUsage::default());
        assert!(info.is_zero());
    }
}
