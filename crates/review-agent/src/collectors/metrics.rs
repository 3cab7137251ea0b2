//! Payment metrics, classified against the threshold table.

use review_types::{
    DisputeStatus, MetricFlag, PaymentActivity, PaymentMetrics, PaymentStatus, ThresholdStatus,
};

use crate::thresholds::{
    Threshold, AUTH_RATE, CHARGEBACK_RATE, DISPUTE_RATE, P50_RISK_SCORE, P90_RISK_SCORE,
    REFUND_RATE,
};

/// Linear-interpolation percentile, `p` in [0, 1].
///
/// The upper interpolation index is clamped to the last element. Empty input
/// has no percentile.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let last = sorted.len() - 1;
    let rank = last as f64 * p.clamp(0.0, 1.0);
    let lower = rank.floor() as usize;
    let upper = (lower + 1).min(last);
    let fraction = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

fn rate(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64 * 100.0)
}

fn flag(threshold: &Threshold, value: Option<f64>, flags: &mut Vec<MetricFlag>) {
    let Some(value) = value else {
        return;
    };
    let status = threshold.evaluate(value);
    if status != ThresholdStatus::Ok {
        flags.push(MetricFlag {
            threshold: threshold.name.to_string(),
            value,
            status,
        });
    }
}

pub fn collect_payment_metrics(activity: &PaymentActivity) -> PaymentMetrics {
    let payments = &activity.payments;
    let succeeded = payments
        .iter()
        .filter(|payment| payment.status == PaymentStatus::Succeeded)
        .count();
    let failed = payments
        .iter()
        .filter(|payment| payment.status == PaymentStatus::Failed)
        .count();
    let chargebacks = activity
        .disputes
        .iter()
        .filter(|dispute| dispute.status == DisputeStatus::Lost)
        .count();

    let risk_scores: Vec<f64> = payments
        .iter()
        .filter_map(|payment| payment.risk_score)
        .map(f64::from)
        .collect();

    let mut metrics = PaymentMetrics {
        total_payments: payments.len(),
        succeeded_payments: succeeded,
        failed_payments: failed,
        total_amount_cents: payments
            .iter()
            .filter(|payment| payment.status == PaymentStatus::Succeeded)
            .map(|payment| payment.amount_cents)
            .sum(),
        refund_count: activity.refunds.len(),
        refund_amount_cents: activity.refunds.iter().map(|refund| refund.amount_cents).sum(),
        dispute_count: activity.disputes.len(),
        chargeback_count: chargebacks,
        dispute_amount_cents: activity.disputes.iter().map(|dispute| dispute.amount_cents).sum(),
        // Pending payments have no outcome yet.
        authorization_rate: rate(succeeded, succeeded + failed),
        refund_rate: rate(activity.refunds.len(), succeeded),
        dispute_rate: rate(activity.disputes.len(), succeeded),
        chargeback_rate: rate(chargebacks, succeeded),
        risk_scored_payments: risk_scores.len(),
        p50_risk_score: percentile(&risk_scores, 0.5),
        p90_risk_score: percentile(&risk_scores, 0.9),
        flags: Vec::new(),
    };

    let mut flags = Vec::new();
    flag(&AUTH_RATE, metrics.authorization_rate, &mut flags);
    flag(&REFUND_RATE, metrics.refund_rate, &mut flags);
    flag(&DISPUTE_RATE, metrics.dispute_rate, &mut flags);
    flag(&CHARGEBACK_RATE, metrics.chargeback_rate, &mut flags);
    flag(&P50_RISK_SCORE, metrics.p50_risk_score, &mut flags);
    flag(&P90_RISK_SCORE, metrics.p90_risk_score, &mut flags);
    metrics.flags = flags;

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;
    use review_types::{DisputeRecord, PaymentRecord, RefundRecord};
    use uuid::Uuid;

    fn payment(status: PaymentStatus, amount_cents: i64, risk_score: Option<u8>) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            status,
            amount_cents,
            currency: Some("usd".to_string()),
            risk_score,
            decline_reason: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentile_interpolates() {
        let values = [10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&values, 0.5), Some(25.0));
        assert_eq!(percentile(&values, 1.0), Some(40.0));
        assert_eq!(percentile(&values, 0.0), Some(10.0));
        let p90 = percentile(&values, 0.9).unwrap();
        assert!((p90 - 37.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_empty_and_single() {
        assert_eq!(percentile(&[], 0.5), None);
        assert_eq!(percentile(&[42.0], 0.5), Some(42.0));
        assert_eq!(percentile(&[42.0], 0.9), Some(42.0));
    }

    #[test]
    fn test_no_payments_yields_defaults() {
        let metrics = collect_payment_metrics(&PaymentActivity::default());
        assert_eq!(metrics, PaymentMetrics::default());
    }

    #[test]
    fn test_rates_and_flags() {
        let mut payments: Vec<PaymentRecord> = (0..8)
            .map(|i| payment(PaymentStatus::Succeeded, 1000, Some(10 + i)))
            .collect();
        payments.push(payment(PaymentStatus::Failed, 1000, Some(90)));
        payments.push(payment(PaymentStatus::Failed, 1000, None));
        payments.push(payment(PaymentStatus::Pending, 1000, None));

        let activity = PaymentActivity {
            payments,
            refunds: vec![RefundRecord {
                id: Uuid::new_v4(),
                amount_cents: 1000,
                reason: None,
                created_at: Utc::now(),
            }],
            disputes: vec![DisputeRecord {
                id: Uuid::new_v4(),
                amount_cents: 1000,
                status: DisputeStatus::Lost,
                reason: Some("fraudulent".to_string()),
                created_at: Utc::now(),
            }],
        };

        let metrics = collect_payment_metrics(&activity);
        assert_eq!(metrics.total_payments, 11);
        assert_eq!(metrics.succeeded_payments, 8);
        assert_eq!(metrics.total_amount_cents, 8000);
        assert_eq!(metrics.authorization_rate, Some(80.0));
        assert_eq!(metrics.refund_rate, Some(12.5));
        assert_eq!(metrics.chargeback_count, 1);
        assert_eq!(metrics.risk_scored_payments, 9);

        let flagged: Vec<(&str, ThresholdStatus)> = metrics
            .flags
            .iter()
            .map(|flag| (flag.threshold.as_str(), flag.status))
            .collect();
        assert!(flagged.contains(&("AUTH_RATE", ThresholdStatus::Warn)));
        assert!(flagged.contains(&("REFUND_RATE", ThresholdStatus::Crit)));
        assert!(flagged.contains(&("DISPUTE_RATE", ThresholdStatus::Crit)));
        assert!(flagged.contains(&("CHARGEBACK_RATE", ThresholdStatus::Crit)));
    }

    proptest! {
        #[test]
        fn prop_percentiles_are_ordered(values in prop::collection::vec(0.0f64..100.0, 1..64)) {
            let p50 = percentile(&values, 0.5).unwrap();
            let p90 = percentile(&values, 0.9).unwrap();
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(p50 <= p90 + 1e-9);
            prop_assert!(min - 1e-9 <= p50 && p90 <= max + 1e-9);
        }

        #[test]
        fn prop_percentile_monotonic_in_inputs(
            values in prop::collection::vec(0.0f64..100.0, 1..64),
            bump in 0.0f64..50.0,
        ) {
            let raised: Vec<f64> = values.iter().map(|value| value + bump).collect();
            prop_assert!(percentile(&values, 0.5).unwrap() <= percentile(&raised, 0.5).unwrap() + 1e-9);
            prop_assert!(percentile(&values, 0.9).unwrap() <= percentile(&raised, 0.9).unwrap() + 1e-9);
        }

        #[test]
        fn prop_single_value_is_every_percentile(value in 0.0f64..100.0, p in 0.0f64..=1.0) {
            prop_assert_eq!(percentile(&[value], p), Some(value));
        }
    }
}
