//! Named risk thresholds for payment metrics.
//!
//! The table here is the only place threshold values live. Analyzer prompts
//! embed [`render_thresholds`] verbatim and the metrics collector classifies
//! against the same constants.

use review_types::ThresholdStatus;

/// Which side of a threshold is the risky one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    HigherIsWorse,
    LowerIsWorse,
}

impl Direction {
    fn describe(self) -> &'static str {
        match self {
            Direction::HigherIsWorse => "higher is worse",
            Direction::LowerIsWorse => "lower is worse",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Threshold {
    pub name: &'static str,
    pub label: &'static str,
    pub warn: f64,
    pub crit: f64,
    pub direction: Direction,
    pub unit: &'static str,
}

impl Threshold {
    /// Classify a value. Boundary values fall into the worse bucket.
    pub fn evaluate(&self, value: f64) -> ThresholdStatus {
        let breaches = |level: f64| match self.direction {
            Direction::HigherIsWorse => value >= level,
            Direction::LowerIsWorse => value <= level,
        };

        if breaches(self.crit) {
            ThresholdStatus::Crit
        } else if breaches(self.warn) {
            ThresholdStatus::Warn
        } else {
            ThresholdStatus::Ok
        }
    }

    fn render(&self) -> String {
        let (warn_op, crit_op) = match self.direction {
            Direction::HigherIsWorse => (">=", ">="),
            Direction::LowerIsWorse => ("<=", "<="),
        };
        format!(
            "- {} ({}): warn {} {}{}, critical {} {}{} ({})",
            self.label,
            self.name,
            warn_op,
            format_level(self.warn),
            self.unit,
            crit_op,
            format_level(self.crit),
            self.unit,
            self.direction.describe(),
        )
    }
}

fn format_level(level: f64) -> String {
    if level.fract() == 0.0 {
        format!("{:.0}", level)
    } else {
        format!("{}", level)
    }
}

pub const AUTH_RATE: Threshold = Threshold {
    name: "AUTH_RATE",
    label: "Authorization rate",
    warn: 90.0,
    crit: 75.0,
    direction: Direction::LowerIsWorse,
    unit: "%",
};

pub const REFUND_RATE: Threshold = Threshold {
    name: "REFUND_RATE",
    label: "Refund rate",
    warn: 5.0,
    crit: 10.0,
    direction: Direction::HigherIsWorse,
    unit: "%",
};

pub const DISPUTE_RATE: Threshold = Threshold {
    name: "DISPUTE_RATE",
    label: "Dispute rate",
    warn: 0.5,
    crit: 0.75,
    direction: Direction::HigherIsWorse,
    unit: "%",
};

pub const CHARGEBACK_RATE: Threshold = Threshold {
    name: "CHARGEBACK_RATE",
    label: "Chargeback rate (lost disputes)",
    warn: 0.3,
    crit: 0.6,
    direction: Direction::HigherIsWorse,
    unit: "%",
};

pub const P50_RISK_SCORE: Threshold = Threshold {
    name: "P50_RISK_SCORE",
    label: "Median payment risk score",
    warn: 30.0,
    crit: 50.0,
    direction: Direction::HigherIsWorse,
    unit: "",
};

pub const P90_RISK_SCORE: Threshold = Threshold {
    name: "P90_RISK_SCORE",
    label: "90th percentile payment risk score",
    warn: 65.0,
    crit: 75.0,
    direction: Direction::HigherIsWorse,
    unit: "",
};

pub static THRESHOLDS: [Threshold; 6] = [
    AUTH_RATE,
    REFUND_RATE,
    DISPUTE_RATE,
    CHARGEBACK_RATE,
    P50_RISK_SCORE,
    P90_RISK_SCORE,
];

pub fn find_threshold(name: &str) -> Option<&'static Threshold> {
    THRESHOLDS
        .iter()
        .find(|threshold| threshold.name.eq_ignore_ascii_case(name))
}

/// Text block listing every threshold, one per line.
pub fn render_thresholds() -> String {
    let mut block = String::from("Payment risk thresholds:\n");
    for threshold in &THRESHOLDS {
        block.push_str(&threshold.render());
        block.push('\n');
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_rate_lower_is_worse() {
        assert_eq!(AUTH_RATE.evaluate(76.0), ThresholdStatus::Warn);
        assert_eq!(AUTH_RATE.evaluate(74.0), ThresholdStatus::Crit);
        assert_eq!(AUTH_RATE.evaluate(95.0), ThresholdStatus::Ok);
        assert_eq!(AUTH_RATE.evaluate(90.0), ThresholdStatus::Warn);
        assert_eq!(AUTH_RATE.evaluate(75.0), ThresholdStatus::Crit);
    }

    #[test]
    fn test_higher_is_worse() {
        assert_eq!(REFUND_RATE.evaluate(1.0), ThresholdStatus::Ok);
        assert_eq!(REFUND_RATE.evaluate(5.0), ThresholdStatus::Warn);
        assert_eq!(REFUND_RATE.evaluate(12.5), ThresholdStatus::Crit);
        assert_eq!(P90_RISK_SCORE.evaluate(80.0), ThresholdStatus::Crit);
    }

    #[test]
    fn test_levels_are_ordered_by_direction() {
        for threshold in &THRESHOLDS {
            match threshold.direction {
                Direction::HigherIsWorse => assert!(threshold.warn < threshold.crit),
                Direction::LowerIsWorse => assert!(threshold.warn > threshold.crit),
            }
        }
    }

    #[test]
    fn test_render_lists_every_threshold() {
        let block = render_thresholds();
        for threshold in &THRESHOLDS {
            assert!(block.contains(threshold.name), "missing {}", threshold.name);
        }
        assert!(block.contains("warn <= 90%, critical <= 75% (lower is worse)"));
        assert_eq!(render_thresholds(), block);
    }

    #[test]
    fn test_find_threshold() {
        assert_eq!(find_threshold("auth_rate"), Some(&AUTH_RATE));
        assert!(find_threshold("unknown").is_none());
    }
}
