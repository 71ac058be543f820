//! Stored tax summaries.

use chrono::{DateTime, Utc};
use cognitax_shared::types::{TaxSummaryId, UploadId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::estimator::TaxComputation;

/// Tax summary produced by a successful ingestion. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxSummary {
    /// Summary ID.
    pub id: TaxSummaryId,
    /// Owning user.
    pub owner_id: UserId,
    /// Upload the summary was derived from.
    pub upload_id: UploadId,
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
    /// Exactly five optimization tips, in order.
    pub optimization_tips: Vec<String>,
    /// When the summary was stored.
    pub created_at: DateTime<Utc>,
}

impl TaxSummary {
    /// Returns the numeric part of the summary.
    #[must_use]
    pub const fn computation(&self) -> TaxComputation {
        TaxComputation {
            total_income: self.total_income,
            total_expenses: self.total_expenses,
            estimated_turnover: self.estimated_turnover,
            gst_amount: self.gst_amount,
            itr_amount: self.itr_amount,
            tds_amount: self.tds_amount,
        }
    }
}

/// A tax summary waiting to be stored alongside its transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTaxSummary {
    /// Estimated amounts.
    pub computation: TaxComputation,
    /// Advisory tips.
    pub optimization_tips: Vec<String>,
}
