//! Property-based tests for the tax estimator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::estimator::estimate;
use super::rules::TaxRules;
use crate::statement::{Direction, NewTransaction};

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    // Up to 1 crore with paise.
    (0i64..1_000_000_000).prop_map(|paise| Decimal::new(paise, 2))
}

fn txn_strategy() -> impl Strategy<Value = NewTransaction> {
    (amount_strategy(), any::<bool>()).prop_map(|(amount, credit)| NewTransaction {
        date: "01/04/2025".to_string(),
        description: "generated".to_string(),
        amount,
        direction: if credit {
            Direction::Credit
        } else {
            Direction::Debit
        },
        category: "Other".to_string(),
        payment_mode: "UPI".to_string(),
    })
}

fn batch_strategy() -> impl Strategy<Value = Vec<NewTransaction>> {
    prop::collection::vec(txn_strategy(), 0..40)
}

proptest! {
    /// Same input, same output.
    #[test]
    fn prop_estimate_is_deterministic(batch in batch_strategy()) {
        prop_assert_eq!(estimate(&batch).unwrap(), estimate(&batch).unwrap());
    }

    /// Totals are never negative and turnover equals income.
    #[test]
    fn prop_totals_non_negative(batch in batch_strategy()) {
        let result = estimate(&batch).unwrap();
        prop_assert!(result.total_income >= Decimal::ZERO);
        prop_assert!(result.total_expenses >= Decimal::ZERO);
        prop_assert_eq!(result.estimated_turnover, result.total_income);
    }

    /// GST is zero at or below the threshold, 18% of turnover above it.
    #[test]
    fn prop_gst_threshold(batch in batch_strategy()) {
        let rules = TaxRules::default();
        let result = estimate(&batch).unwrap();
        if result.estimated_turnover > rules.gst_threshold {
            prop_assert!(result.gst_amount > Decimal::ZERO);
            prop_assert_eq!(result.gst_amount, result.estimated_turnover * rules.gst_rate);
        } else {
            prop_assert_eq!(result.gst_amount, Decimal::ZERO);
        }
    }

    /// ITR is clamped at zero.
    #[test]
    fn prop_itr_never_negative(batch in batch_strategy()) {
        prop_assert!(estimate(&batch).unwrap().itr_amount >= Decimal::ZERO);
    }

    /// TDS is zero at or below its threshold, 1% of turnover above it.
    #[test]
    fn prop_tds_threshold(batch in batch_strategy()) {
        let rules = TaxRules::default();
        let result = estimate(&batch).unwrap();
        if result.estimated_turnover > rules.tds_threshold {
            prop_assert_eq!(result.tds_amount, result.estimated_turnover * rules.tds_rate);
        } else {
            prop_assert_eq!(result.tds_amount, Decimal::ZERO);
        }
    }

    /// Order of transactions does not matter.
    #[test]
    fn prop_order_independent(mut batch in batch_strategy()) {
        let forward = estimate(&batch).unwrap();
        batch.reverse();
        prop_assert_eq!(forward, estimate(&batch).unwrap());
    }
}
