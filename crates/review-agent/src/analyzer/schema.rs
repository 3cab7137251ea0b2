//! Structured output contract for the analyzer.

use review_model::OutputSchema;
use review_types::ReviewDimension;
use serde_json::json;

pub const SUBMIT_REVIEW_TOOL: &str = "submit_review";

pub fn review_output_schema() -> OutputSchema {
    let dimensions: Vec<&str> = ReviewDimension::ALL
        .iter()
        .map(|dimension| dimension.as_str())
        .collect();

    OutputSchema::new(
        SUBMIT_REVIEW_TOOL,
        "Submit the completed organization review.",
        json!({
            "type": "object",
            "properties": {
                "verdict": { "type": "string", "enum": ["APPROVE", "DENY"] },
                "overall_risk_score": { "type": "number", "minimum": 0, "maximum": 100 },
                "summary": {
                    "type": "string",
                    "description": "Internal reasoning for reviewers"
                },
                "merchant_summary": {
                    "type": "string",
                    "description": "Short neutral message shown to the merchant"
                },
                "violated_sections": { "type": "array", "items": { "type": "string" } },
                "dimensions": {
                    "type": "array",
                    "minItems": 5,
                    "maxItems": 5,
                    "items": {
                        "type": "object",
                        "properties": {
                            "dimension": { "type": "string", "enum": dimensions },
                            "score": { "type": "number", "minimum": 0, "maximum": 100 },
                            "confidence": { "type": "number", "minimum": 0, "maximum": 1 },
                            "findings": { "type": "array", "items": { "type": "string" } },
                            "recommendation": { "type": "string" }
                        },
                        "required": ["dimension", "score", "confidence", "findings", "recommendation"]
                    }
                },
                "recommended_action": { "type": "string" }
            },
            "required": [
                "verdict",
                "overall_risk_score",
                "summary",
                "merchant_summary",
                "violated_sections",
                "dimensions",
                "recommended_action"
            ]
        }),
    )
}
