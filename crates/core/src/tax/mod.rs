//! Simplified Indian tax estimation.
//!
//! Turnover is modelled as total credited inflow. GST and TDS apply above
//! fixed turnover thresholds; ITR is charged on turnover less expenses and the
//! basic exemption, clamped at zero. All thresholds and rates live in
//! [`TaxRules`].

mod estimator;
mod rules;
mod types;

#[cfg(test)]
mod estimator_props;

pub use estimator::{TaxComputation, estimate};
pub use rules::TaxRules;
pub use types::{NewTaxSummary, TaxSummary};
