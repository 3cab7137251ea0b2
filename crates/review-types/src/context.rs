//! Review trigger context.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a review was triggered. Drives which dimensions the analyzer scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewContext {
    /// Organization submitted its details for the first time.
    Submission,
    /// Payout account and identity setup finished.
    SetupComplete,
    /// Payment volume crossed the next review threshold.
    Threshold,
    /// A human reviewer asked for a deep review.
    Manual,
}

impl ReviewContext {
    pub const ALL: [ReviewContext; 4] = [
        ReviewContext::Submission,
        ReviewContext::SetupComplete,
        ReviewContext::Threshold,
        ReviewContext::Manual,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReviewContext::Submission => "SUBMISSION",
            ReviewContext::SetupComplete => "SETUP_COMPLETE",
            ReviewContext::Threshold => "THRESHOLD",
            ReviewContext::Manual => "MANUAL",
        }
    }

    /// Identity findings only matter once the payout account is being set up.
    pub fn includes_identity(self) -> bool {
        !matches!(self, ReviewContext::Submission)
    }

    /// Integration/setup signals are collected for payment-driven and manual reviews.
    pub fn includes_setup(self) -> bool {
        matches!(self, ReviewContext::Threshold | ReviewContext::Manual)
    }
}

impl std::fmt::Display for ReviewContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown review context: {0}")]
pub struct ParseContextError(pub String);

impl std::str::FromStr for ReviewContext {
    type Err = ParseContextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SUBMISSION" => Ok(ReviewContext::Submission),
            "SETUP_COMPLETE" => Ok(ReviewContext::SetupComplete),
            "THRESHOLD" => Ok(ReviewContext::Threshold),
            "MANUAL" => Ok(ReviewContext::Manual),
            _ => Err(ParseContextError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_spellings() {
        assert_eq!(
            "setup-complete".parse::<ReviewContext>().unwrap(),
            ReviewContext::SetupComplete
        );
        assert_eq!(" manual ".parse::<ReviewContext>().unwrap(), ReviewContext::Manual);
        assert!("later".parse::<ReviewContext>().is_err());
    }

    #[test]
    fn serde_uses_screaming_case() {
        let json = serde_json::to_string(&ReviewContext::SetupComplete).unwrap();
        assert_eq!(json, "\"SETUP_COMPLETE\"");
    }

    #[test]
    fn setup_signals_only_for_threshold_and_manual() {
        let with_setup: Vec<_> = ReviewContext::ALL
            .into_iter()
            .filter(|ctx| ctx.includes_setup())
            .collect();
        assert_eq!(with_setup, vec![ReviewContext::Threshold, ReviewContext::Manual]);
        assert!(!ReviewContext::Submission.includes_identity());
    }
}
