//! Cash-flow summaries over stored transactions.

use std::collections::BTreeMap;

use cognitax_shared::types::{AmountOverflow, checked_add};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::statement::{Direction, Transaction};
use crate::tax::TaxSummary;

/// Per-user dashboard figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    /// Sum of credits.
    pub total_income: Decimal,
    /// Sum of debits.
    pub total_expenses: Decimal,
    /// Income minus expenses. May be negative.
    pub net_cash_flow: Decimal,
    /// Number of transactions considered.
    pub transactions_count: usize,
    /// Amount per category, both directions.
    pub category_breakdown: BTreeMap<String, Decimal>,
    /// Amount per payment mode, both directions.
    pub mode_breakdown: BTreeMap<String, Decimal>,
    /// Most recent tax summary, if any.
    pub latest_tax: Option<TaxSummary>,
}

/// Builds the summary for a user's transactions.
///
/// # Errors
///
/// Returns [`AmountOverflow`] if a total leaves the `Decimal` range.
pub fn summarize(
    transactions: &[Transaction],
    latest_tax: Option<TaxSummary>,
) -> Result<AnalyticsSummary, AmountOverflow> {
    let mut total_income = Decimal::ZERO;
    let mut total_expenses = Decimal::ZERO;
    let mut category_breakdown = BTreeMap::new();
    let mut mode_breakdown = BTreeMap::new();

    for txn in transactions {
        match txn.direction {
            Direction::Credit => total_income = checked_add(total_income, txn.amount)?,
            Direction::Debit => total_expenses = checked_add(total_expenses, txn.amount)?,
        }
        accumulate(&mut category_breakdown, &txn.category, txn.amount)?;
        accumulate(&mut mode_breakdown, &txn.payment_mode, txn.amount)?;
    }

    Ok(AnalyticsSummary {
        total_income,
        total_expenses,
        net_cash_flow: total_income
            .checked_sub(total_expenses)
            .ok_or(AmountOverflow)?,
        transactions_count: transactions.len(),
        category_breakdown,
        mode_breakdown,
        latest_tax,
    })
}

fn accumulate(
    breakdown: &mut BTreeMap<String, Decimal>,
    key: &str,
    amount: Decimal,
) -> Result<(), AmountOverflow> {
    let total = breakdown.entry(key.to_string()).or_insert(Decimal::ZERO);
    *total = checked_add(*total, amount)?;
    Ok(())
}
