//! Tax thresholds and rates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Thresholds and rates used by the estimator.
///
/// Revising a rate or threshold only touches this table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRules {
    /// GST applies when turnover is strictly above this.
    pub gst_threshold: Decimal,
    /// GST rate on turnover.
    pub gst_rate: Decimal,
    /// Income below this is not taxed for ITR purposes.
    pub itr_basic_exemption: Decimal,
    /// ITR rate on taxable income.
    pub itr_rate: Decimal,
    /// TDS applies when turnover is strictly above this.
    pub tds_threshold: Decimal,
    /// TDS rate on turnover.
    pub tds_rate: Decimal,
}

impl TaxRules {
    /// Rules for FY 2025 as modelled by Cognitax.
    pub const FY2025: Self = Self {
        gst_threshold: Decimal::from_parts(2_000_000, 0, 0, false, 0),
        gst_rate: Decimal::from_parts(18, 0, 0, false, 2),
        itr_basic_exemption: Decimal::from_parts(250_000, 0, 0, false, 0),
        itr_rate: Decimal::from_parts(30, 0, 0, false, 2),
        tds_threshold: Decimal::from_parts(5_000_000, 0, 0, false, 0),
        tds_rate: Decimal::from_parts(1, 0, 0, false, 2),
    };
}

impl Default for TaxRules {
    fn default() -> Self {
        Self::FY2025
    }
}
