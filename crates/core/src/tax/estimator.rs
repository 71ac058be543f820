//! Tax estimation over a batch of transactions.

use cognitax_shared::types::{AmountOverflow, checked_add};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rules::TaxRules;
use crate::statement::{Direction, Taxable};

/// Result of a tax estimate. Values are unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxComputation {
    /// Sum of credits.
    pub total_income: Decimal,
    /// Sum of debits.
    pub total_expenses: Decimal,
    /// Modelled as total income.
    pub estimated_turnover: Decimal,
    /// Goods and Services Tax.
    pub gst_amount: Decimal,
    /// Income tax.
    pub itr_amount: Decimal,
    /// Tax deducted at source.
    pub tds_amount: Decimal,
}

impl TaxRules {
    /// Estimates taxes for a batch of transactions.
    ///
    /// # Errors
    ///
    /// Returns [`AmountOverflow`] if a total leaves the `Decimal` range.
    pub fn estimate<'a, T, I>(&self, transactions: I) -> Result<TaxComputation, AmountOverflow>
    where
        T: Taxable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;
        for txn in transactions {
            match txn.direction() {
                Direction::Credit => total_income = checked_add(total_income, txn.amount())?,
                Direction::Debit => total_expenses = checked_add(total_expenses, txn.amount())?,
            }
        }

        let turnover = total_income;

        let gst_amount = if turnover > self.gst_threshold {
            turnover.checked_mul(self.gst_rate).ok_or(AmountOverflow)?
        } else {
            Decimal::ZERO
        };

        let taxable_income = turnover
            .checked_sub(total_expenses)
            .and_then(|net| net.checked_sub(self.itr_basic_exemption))
            .ok_or(AmountOverflow)?;
        let itr_amount = if taxable_income > Decimal::ZERO {
            taxable_income.checked_mul(self.itr_rate).ok_or(AmountOverflow)?
        } else {
            Decimal::ZERO
        };

        let tds_amount = if turnover > self.tds_threshold {
            turnover.checked_mul(self.tds_rate).ok_or(AmountOverflow)?
        } else {
            Decimal::ZERO
        };

        Ok(TaxComputation {
            total_income,
            total_expenses,
            estimated_turnover: turnover,
            gst_amount,
            itr_amount,
            tds_amount,
        })
    }
}

/// Estimates taxes with the current rules.
///
/// # Errors
///
/// Returns [`AmountOverflow`] if a total leaves the `Decimal` range.
pub fn estimate<'a, T, I>(transactions: I) -> Result<TaxComputation, AmountOverflow>
where
    T: Taxable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    TaxRules::default().estimate(transactions)
}
